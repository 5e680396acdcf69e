//! Service configuration loader for Souvenir.
//!
//! Reads `config.toml` from the data directory (`~/.souvenir/` in production)
//! and deserializes it into [`ServiceConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed.

use std::path::{Path, PathBuf};

use souvenir_types::config::ServiceConfig;

/// Load service configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ServiceConfig::default()`] (local
///   Qdrant, local embeddings, port 5001).
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_service_config(data_dir: &Path) -> ServiceConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ServiceConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ServiceConfig::default();
        }
    };

    match toml::from_str::<ServiceConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ServiceConfig::default()
        }
    }
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `SOUVENIR_DATA_DIR` environment variable
/// 2. Platform-specific data directory (e.g., `~/.souvenir` on macOS/Linux)
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SOUVENIR_DATA_DIR") {
        return PathBuf::from(dir);
    }

    // Use home directory fallback: ~/.souvenir
    if let Some(home) = dirs::home_dir() {
        return home.join(".souvenir");
    }

    // Last resort: current directory
    PathBuf::from(".souvenir")
}
