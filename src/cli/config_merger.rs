//! Merging command line overrides with file-based configuration

use super::parser::{Cli, Commands};
use crate::config::{ConfigError, ConfigLoader, Settings};

/// Load settings from files and environment, then apply `cli` on top.
///
/// Precedence, highest first: command line, `USERHUB_*` variables,
/// `local.toml`, `{environment}.toml`, `default.toml`.
pub fn load_and_merge_config(cli: &Cli) -> Result<Settings, ConfigError> {
    let mut loader = ConfigLoader::new()?;
    if let Some(path) = &cli.config {
        loader = loader.with_config_file(path);
    }
    if let Some(env) = cli.env {
        loader = loader.with_environment(env.into());
    }

    let mut settings = loader.load()?;
    merge_cli_overrides(&mut settings, cli);
    Ok(settings)
}

/// Apply global flags and `serve` arguments to `settings`.
pub fn merge_cli_overrides(settings: &mut Settings, cli: &Cli) {
    if cli.verbose {
        settings.logger.level = "debug".to_string();
    } else if cli.quiet {
        settings.logger.level = "error".to_string();
    }

    if let Some(Commands::Serve { host, port, .. }) = &cli.command {
        if let Some(host) = host {
            settings.server.host = host.clone();
        }
        if let Some(port) = port {
            settings.server.port = *port;
        }
    }
}
