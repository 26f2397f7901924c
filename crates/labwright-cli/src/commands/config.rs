//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
///
/// `path` is the file in effect (from `--config` or the default location).
pub fn execute_config(args: ConfigArgs, config: &Config, path: &Path, formatter: &Formatter) -> Result<String> {
    match args.action {
        ConfigAction::Show => match formatter.format() {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
            OutputFormat::Table | OutputFormat::Tree => Ok(format!(
                "# {}\n{}",
                path.display(),
                config.to_toml()?.trim_end()
            )),
        },
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::InvalidInput(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            Config::default().save_to(path)?;
            Ok(formatter.success(&format!("Wrote default configuration to {}", path.display())))
        }
    }
}
