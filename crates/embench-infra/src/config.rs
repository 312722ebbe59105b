//! Harness configuration loader.
//!
//! Reads `embench.toml` from a directory and deserializes it into
//! [`HarnessConfig`]. Falls back to defaults when the file is missing or
//! malformed.

use std::path::Path;

use embench_types::config::HarnessConfig;

/// Config file name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "embench.toml";

/// Load harness configuration from `{dir}/embench.toml`.
///
/// - If the file does not exist, returns [`HarnessConfig::default()`].
/// - If the file exists but cannot be read or parsed, logs a warning and
///   returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_config(dir: &Path) -> HarnessConfig {
    let config_path = dir.join(CONFIG_FILE_NAME);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No {CONFIG_FILE_NAME} found at {}, using defaults", config_path.display());
            return HarnessConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return HarnessConfig::default();
        }
    };

    match toml::from_str::<HarnessConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            HarnessConfig::default()
        }
    }
}
