// Startup configuration from the environment (after `.env` is loaded).

use std::path::PathBuf;

use anyhow::{bail, Context as _};
use serde::Deserialize;

pub const DEFAULT_DATA_DIR: &str = "data/ladderReset";
pub const DEFAULT_SECRET_FILE: &str = "secret.json";
const DEFAULT_WIZARD_TIMEOUT_SECS: u64 = 900;
const DEFAULT_PLAN_TIMEOUT_SECS: u64 = 600;
/// Upper bound for either timeout: one week.
const MAX_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub data_dir: PathBuf,
    pub captain_role: String,
    pub council_role: String,
    pub captain_is_member: bool,
    pub wizard_timeout_secs: u64,
    pub plan_timeout_secs: u64,
    pub guild_id: Option<u64>,
}

#[derive(Deserialize)]
struct SecretFile {
    token: String,
}

impl BotConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let token = match lookup("DISCORD_TOKEN").filter(|t| !t.trim().is_empty()) {
            Some(token) => token,
            None => {
                let path = lookup("LADDER_SECRET_FILE")
                    .unwrap_or_else(|| DEFAULT_SECRET_FILE.to_string());
                read_secret(&path)?
            }
        };

        let flag = |key: &str| -> anyhow::Result<bool> {
            match lookup(key) {
                None => Ok(false),
                Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                    "1" | "true" | "yes" | "on" => Ok(true),
                    "0" | "false" | "no" | "off" | "" => Ok(false),
                    other => bail!("{key} must be true or false, got '{other}'"),
                },
            }
        };
        let secs = |key: &str, default: u64| -> anyhow::Result<u64> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => {
                    let secs = raw
                        .trim()
                        .parse::<u64>()
                        .with_context(|| format!("{key} must be a number of seconds"))?;
                    if !(1..=MAX_TIMEOUT_SECS).contains(&secs) {
                        bail!("{key} must be between 1 and {MAX_TIMEOUT_SECS} seconds, got {secs}");
                    }
                    Ok(secs)
                }
            }
        };

        let guild_id = match lookup("LADDER_GUILD_ID") {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<u64>()
                    .context("LADDER_GUILD_ID must be a numeric guild id")?,
            ),
            _ => None,
        };

        Ok(Self {
            token,
            data_dir: lookup("LADDER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            captain_role: lookup("LADDER_CAPTAIN_ROLE").unwrap_or_else(|| "Captain".to_string()),
            council_role: lookup("LADDER_COUNCIL_ROLE").unwrap_or_else(|| "Council".to_string()),
            captain_is_member: flag("LADDER_CAPTAIN_IS_MEMBER")?,
            wizard_timeout_secs: secs("LADDER_WIZARD_TIMEOUT_SECS", DEFAULT_WIZARD_TIMEOUT_SECS)?,
            plan_timeout_secs: secs("LADDER_PLAN_TIMEOUT_SECS", DEFAULT_PLAN_TIMEOUT_SECS)?,
            guild_id,
        })
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join("builds.json")
    }
}

fn read_secret(path: &str) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path).with_context(|| {
        format!("DISCORD_TOKEN is not set and the secret file '{path}' could not be read")
    })?;
    let secret: SecretFile = serde_json::from_str(&text)
        .with_context(|| format!("'{path}' must be a JSON object with a \"token\" field"))?;
    if secret.token.trim().is_empty() {
        bail!("'{path}' contains an empty token");
    }
    Ok(secret.token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup(&[("DISCORD_TOKEN", "abc")])).unwrap();
        assert_eq!(config.token, "abc");
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(config.captain_role, "Captain");
        assert_eq!(config.council_role, "Council");
        assert!(!config.captain_is_member);
        assert_eq!(config.wizard_timeout_secs, 900);
        assert_eq!(config.plan_timeout_secs, 600);
        assert_eq!(config.guild_id, None);
        assert_eq!(config.catalog_path(), PathBuf::from("data/ladderReset/builds.json"));
    }

    #[test]
    fn test_overrides() {
        let config = BotConfig::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("LADDER_CAPTAIN_ROLE", "Raid Lead"),
            ("LADDER_CAPTAIN_IS_MEMBER", "Yes"),
            ("LADDER_WIZARD_TIMEOUT_SECS", "60"),
            ("LADDER_GUILD_ID", "123"),
        ]))
        .unwrap();
        assert_eq!(config.captain_role, "Raid Lead");
        assert!(config.captain_is_member);
        assert_eq!(config.wizard_timeout_secs, 60);
        assert_eq!(config.guild_id, Some(123));
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_flag = lookup(&[("DISCORD_TOKEN", "abc"), ("LADDER_CAPTAIN_IS_MEMBER", "maybe")]);
        assert!(BotConfig::from_lookup(bad_flag).is_err());
        let bad_secs = lookup(&[("DISCORD_TOKEN", "abc"), ("LADDER_PLAN_TIMEOUT_SECS", "soon")]);
        assert!(BotConfig::from_lookup(bad_secs).is_err());
    }

    #[test]
    fn test_timeouts_must_be_in_range() {
        for raw in ["0", "604801", "18446744073709551615"] {
            let vars = lookup(&[("DISCORD_TOKEN", "abc"), ("LADDER_WIZARD_TIMEOUT_SECS", raw)]);
            let err = BotConfig::from_lookup(vars).unwrap_err();
            assert!(err.to_string().contains("between 1 and"), "{raw}: {err}");
        }
        let zero_plan = lookup(&[("DISCORD_TOKEN", "abc"), ("LADDER_PLAN_TIMEOUT_SECS", "0")]);
        assert!(BotConfig::from_lookup(zero_plan).is_err());

        let week = lookup(&[("DISCORD_TOKEN", "abc"), ("LADDER_WIZARD_TIMEOUT_SECS", "604800")]);
        assert_eq!(BotConfig::from_lookup(week).unwrap().wizard_timeout_secs, 604800);
    }

    #[test]
    fn test_token_from_secret_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"token": "from-file"}}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config =
            BotConfig::from_lookup(lookup(&[("LADDER_SECRET_FILE", path.as_str())])).unwrap();
        assert_eq!(config.token, "from-file");

        let missing = lookup(&[("LADDER_SECRET_FILE", "/nonexistent/secret.json")]);
        assert!(BotConfig::from_lookup(missing).is_err());
    }
}
