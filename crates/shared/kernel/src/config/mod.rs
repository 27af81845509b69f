use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides: `DEPOT__STORAGE__ROOT=/srv/public`.
pub const ENV_PREFIX: &str = "DEPOT";

/// Custom error type for config loading.
#[depot_derive::depot_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration file and overlays `DEPOT__`-prefixed environment variables.
///
/// 1. **Base File**: `path` (default `server`); the extension is optional, so `server` finds
///    `server.toml`.
/// 2. **Environment Overrides**: nested keys are separated by double underscores, e.g.
///    `DEPOT__POLICIES__PAYMENT_QR__MAX_SIZE_BYTES=1048576`.
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file cannot be found or parsed, or if the merged
/// values do not match `T`.
///
/// # Example
/// ```rust
/// use depot_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
