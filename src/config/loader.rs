//! Layered configuration loader

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const CONFIG_DIR_ENV: &str = "USERHUB_CONFIG_DIR";

const CONFIG_FILE_ENV: &str = "USERHUB_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

const ENV_PREFIX: &str = "USERHUB";

/// Separator for nested keys: `USERHUB_SERVER__PORT` -> `server.port`
const ENV_SEPARATOR: &str = "__";

/// Loads [`Settings`] from files and environment variables.
///
/// Sources, lowest priority first:
/// 1. `default.toml` (required)
/// 2. `{environment}.toml` (optional)
/// 3. `local.toml` (optional)
/// 4. `USERHUB_*` environment variables
///
/// When a single file is configured it replaces steps 1 to 3.
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `USERHUB_CONFIG_DIR`, `USERHUB_CONFIG_FILE` and
    /// `USERHUB_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns `MutualExclusivityError` if both the directory and the file
    /// variables are set.
    pub fn new() -> Result<Self, ConfigError> {
        let dir_from_env = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && dir_from_env.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "USERHUB_CONFIG_DIR and USERHUB_CONFIG_FILE cannot both be set. \
                 Use USERHUB_CONFIG_DIR for layered configuration or \
                 USERHUB_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir: dir_from_env
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Use a single configuration file instead of the layered directory.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Select which `{environment}.toml` layer is read.
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Load and deserialize configuration from all sources.
    ///
    /// Values are not validated here: command line overrides are merged
    /// afterwards, and each command validates the sections it needs.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let builder = match &self.config_file {
            Some(file) => Self::add_file_source(Config::builder(), file, true)?,
            None => self.layered(Config::builder())?,
        };

        Self::add_env_source(builder)
            .build()?
            .try_deserialize()
            .map_err(|e| {
                ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
            })
    }

    fn layered(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder =
            Self::add_file_source(builder, &self.config_dir.join("default.toml"), true)?;
        let builder = Self::add_file_source(
            builder,
            &self
                .config_dir
                .join(format!("{}.toml", self.environment.as_str())),
            false,
        )?;
        Self::add_file_source(builder, &self.config_dir.join("local.toml"), false)
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        Ok(builder.add_source(
            File::new(path.to_str().unwrap_or_default(), FileFormat::Toml).required(required),
        ))
    }

    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}
