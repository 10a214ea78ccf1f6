use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::fs;
use tokio::sync::Mutex;

use crate::core::roster::{Document, DocumentStore, StoreError};

/// One pretty-printed JSON file per document under `dir`, named `<NAME>.json`.
pub struct JsonDocumentStore {
    dir: PathBuf,
    locks: DashMap<&'static str, Arc<Mutex<()>>>,
}

impl JsonDocumentStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            locks: DashMap::new(),
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    fn lock_for(&self, name: &'static str) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(name).or_default().value())
    }

    async fn read<D: Document>(&self) -> Result<D, StoreError> {
        let path = self.path_for(D::NAME);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(D::default()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(D::default());
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn write<D: Document>(&self, doc: &D) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        doc.serialize(&mut ser)?;

        // Write next to the target and rename so a crash never leaves half a file.
        let path = self.path_for(D::NAME);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &buf).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn load<D: Document>(&self) -> Result<D, StoreError> {
        self.read().await
    }

    async fn save<D: Document>(&self, doc: &D) -> Result<(), StoreError> {
        let lock = self.lock_for(D::NAME);
        let _guard = lock.lock().await;
        self.write(doc).await
    }

    async fn update<D, R, E, F>(&self, edit: F) -> Result<R, E>
    where
        D: Document,
        R: Send,
        E: From<StoreError> + Send,
        F: FnOnce(&mut D) -> Result<R, E> + Send,
    {
        let lock = self.lock_for(D::NAME);
        let _guard = lock.lock().await;

        let mut doc: D = self.read().await?;
        let out = edit(&mut doc)?;
        self.write(&doc).await?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::roster::roster_models::{Player, Players, Team, Teams};
    use crate::core::roster::RosterError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty_document() {
        let dir = TempDir::new().unwrap();
        let store = JsonDocumentStore::new(dir.path());
        let players: Players = store.load().await.unwrap();
        assert!(players.0.is_empty());
    }

    #[tokio::test]
    async fn test_update_persists_with_four_space_indent() {
        let dir = TempDir::new().unwrap();
        let store = JsonDocumentStore::new(dir.path());
        store
            .update(|players: &mut Players| -> Result<(), StoreError> {
                players.0.insert(7, Player::blank(7, "wanda"));
                Ok(())
            })
            .await
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("players.json")).unwrap();
        assert!(text.contains("\n    \"7\": {\n        \"id\": 7"));

        // A fresh store reads what the first one wrote
        let reopened = JsonDocumentStore::new(dir.path());
        let players: Players = reopened.load().await.unwrap();
        assert_eq!(players.0[&7].username, "wanda");
    }

    #[tokio::test]
    async fn test_failed_update_leaves_document_untouched() {
        let dir = TempDir::new().unwrap();
        let store = JsonDocumentStore::new(dir.path());
        let mut teams = Teams::default();
        teams.0.insert(
            "Alpha".to_string(),
            Team {
                name: "Alpha".to_string(),
                captain_id: 1,
                captain_name: "cap".to_string(),
                members: vec![1],
                plan: None,
            },
        );
        store.save(&teams).await.unwrap();

        let result = store
            .update(|teams: &mut Teams| -> Result<(), RosterError> {
                teams.0.clear();
                Err(RosterError::TeamNotFound)
            })
            .await;
        assert!(matches!(result, Err(RosterError::TeamNotFound)));

        let teams: Teams = store.load().await.unwrap();
        assert!(teams.0.contains_key("Alpha"));
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JsonDocumentStore::new(dir.path()));

        let mut handles = Vec::new();
        for id in 0..20u64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .update(move |players: &mut Players| -> Result<(), StoreError> {
                        players.0.insert(id, Player::blank(id, format!("p{id}")));
                        Ok(())
                    })
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let players: Players = store.load().await.unwrap();
        assert_eq!(players.0.len(), 20);
    }

    #[tokio::test]
    async fn test_blank_file_is_empty_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("teams.json"), "  \n").unwrap();
        let store = JsonDocumentStore::new(dir.path());
        let teams: Teams = store.load().await.unwrap();
        assert!(teams.0.is_empty());
    }

    #[tokio::test]
    async fn test_players_file_with_string_ids_loads_and_rewrites() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("players.json"),
            r#"{"77": {"discord_id": "77", "username": "old", "class": "Necromancer",
                "build": "", "seriousness": "", "timezone": "", "first_reset": true,
                "experience": false, "availability": ""}}"#,
        )
        .unwrap();
        let store = JsonDocumentStore::new(dir.path());

        store
            .update(|players: &mut Players| -> Result<(), RosterError> {
                players.0.insert(8, Player::blank(8, "new"));
                Ok(())
            })
            .await
            .unwrap();

        let players: Players = store.load().await.unwrap();
        assert_eq!(players.0[&77].class, "Necromancer");
        assert!(players.0[&77].first_reset);
        let text = std::fs::read_to_string(dir.path().join("players.json")).unwrap();
        assert!(text.contains("\"id\": 77"));
    }
}
