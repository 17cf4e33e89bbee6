//! Config command implementation.

use colored::Colorize;
use serde_json::json;

use super::Context;
use crate::cli::args::{ConfigCommands, OutputFormat};
use crate::config::Config;
use crate::error::BoardsyncError;
use crate::output::to_json;

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the config file cannot be written or serialized.
pub fn config(ctx: &Context, cmd: ConfigCommands) -> Result<String, BoardsyncError> {
    match cmd {
        ConfigCommands::Show => match ctx.format {
            OutputFormat::Json => to_json(&ctx.config),
            OutputFormat::Pretty => ctx.config.to_yaml(),
        },
        ConfigCommands::Path => {
            let path = ctx.paths.config_file.display().to_string();
            match ctx.format {
                OutputFormat::Json => to_json(&json!({
                    "config_file": path,
                    "exists": ctx.paths.config_file.exists(),
                    "database": ctx.paths.database.display().to_string(),
                })),
                OutputFormat::Pretty => Ok(path),
            }
        }
        ConfigCommands::Init { force } => {
            let path = &ctx.paths.config_file;
            if path.exists() && !force {
                return Err(BoardsyncError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }

            ctx.paths.ensure_dirs()?;
            Config::default().save_to_path(path)?;

            match ctx.format {
                OutputFormat::Json => to_json(&json!({"written": path.display().to_string()})),
                OutputFormat::Pretty => Ok(format!("{} Wrote {}", "✓".green(), path.display())),
            }
        }
    }
}
