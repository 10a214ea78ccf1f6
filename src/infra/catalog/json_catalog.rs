use std::path::Path;

use tokio::fs;

use crate::core::catalog::BuildCatalog;

/// Load `builds.json`. A missing, unreadable or empty catalog falls back to
/// the built-in class list so the wizards always have options to offer.
pub async fn load_catalog(path: impl AsRef<Path>) -> BuildCatalog {
    let path = path.as_ref();
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Build catalog not readable, using built-in classes");
            return BuildCatalog::fallback();
        }
    };

    match serde_json::from_str::<BuildCatalog>(&text) {
        Ok(catalog) if !catalog.is_empty() => {
            tracing::info!(path = %path.display(), classes = catalog.classes.len(), "Build catalog loaded");
            catalog
        }
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Build catalog has no classes, using built-in classes");
            BuildCatalog::fallback()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Build catalog is malformed, using built-in classes");
            BuildCatalog::fallback()
        }
    }
}
