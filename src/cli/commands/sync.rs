//! Sync queue command implementation.
//!
//! Handles queue inspection, delivery and dead-letter management.

use std::thread;
use std::time::{Duration, Instant};

use colored::Colorize;
use serde_json::json;

use super::Context;
use crate::cli::args::{DeadCommands, OutputFormat, SyncCommands};
use crate::core::EntryId;
use crate::error::BoardsyncError;
use crate::features::sync::{ConnectivitySignal, Mutation, StaticSignal, SyncQueue};
use crate::output::{format_dead_letters, format_drain, format_entries, format_status, to_json};

/// Execute sync subcommands.
///
/// # Errors
///
/// Returns an error if local storage fails or the arguments are invalid.
pub fn sync(ctx: &Context, cmd: SyncCommands) -> Result<String, BoardsyncError> {
    match cmd {
        SyncCommands::Status => {
            let queue = ctx.open_queue()?;
            format_status(&queue.stats()?, ctx.format)
        }
        SyncCommands::Run => {
            // A manual run always attempts delivery.
            let client = ctx.open_client(&StaticSignal(true))?;
            format_drain(&client.force_sync()?, ctx.format)
        }
        SyncCommands::List { limit } => {
            let queue = ctx.open_queue()?;
            let entries: Vec<_> = queue.list_all()?.into_iter().take(limit).collect();
            format_entries(&entries, ctx.format)
        }
        SyncCommands::Watch {
            once,
            assume_online,
        } => {
            if assume_online {
                watch(ctx, &StaticSignal(true), once)
            } else {
                watch(ctx, &ctx.probe()?, once)
            }
        }
        SyncCommands::Dead { command } => {
            let queue = ctx.open_queue()?;
            dead(&queue, command.unwrap_or(DeadCommands::List), ctx.format)
        }
        SyncCommands::Clear { force } => {
            if !force {
                return Err(BoardsyncError::InvalidInput(
                    "Use --force to drop every queued mutation and dead letter".to_string(),
                ));
            }
            let queue = ctx.open_queue()?;
            let dropped = queue.pending_count()?;
            queue.clear()?;

            match ctx.format {
                OutputFormat::Json => to_json(&json!({"cleared": dropped})),
                OutputFormat::Pretty => Ok(format!("Cleared {dropped} queued mutations and all dead letters")),
            }
        }
    }
}

/// Drain on connectivity transitions and on the background interval.
///
/// With `once`, reads the signal a single time and drains if online.
fn watch(
    ctx: &Context,
    signal: &dyn ConnectivitySignal,
    once: bool,
) -> Result<String, BoardsyncError> {
    let mut client = ctx.open_client(&StaticSignal(false))?;

    if once {
        return match client.on_connectivity(signal.is_online())? {
            Some(outcome) => format_drain(&outcome, ctx.format),
            None => match ctx.format {
                OutputFormat::Json => to_json(&json!({"online": false, "pending": client.pending_count()?})),
                OutputFormat::Pretty => Ok(format!(
                    "Server unreachable, {} mutations waiting",
                    client.pending_count()?
                )),
            },
        };
    }

    let probe_interval = ctx.config.sync.probe_interval();
    let background_interval = ctx.config.sync.background_interval();
    let mut last_tick = Instant::now();

    tracing::info!(
        url = %ctx.config.remote.health_url(),
        ?probe_interval,
        ?background_interval,
        "watching connectivity"
    );
    if ctx.format == OutputFormat::Pretty {
        println!(
            "{}",
            format!(
                "Watching {} (Ctrl-C to stop)",
                ctx.config.remote.base_url
            )
            .dimmed()
        );
    }

    loop {
        let mut outcome = client.on_connectivity(signal.is_online())?;

        if outcome.is_none() && last_tick.elapsed() >= background_interval {
            last_tick = Instant::now();
            outcome = client.tick()?;
        }

        if let Some(outcome) = outcome {
            last_tick = Instant::now();
            let worth_printing = outcome
                .report()
                .map_or(true, |report| report.attempted() > 0);
            if worth_printing {
                println!("{}", format_drain(&outcome, ctx.format)?);
            }
        }

        thread::sleep(probe_interval.max(Duration::from_secs(1)));
    }
}

fn dead(queue: &SyncQueue, cmd: DeadCommands, format: OutputFormat) -> Result<String, BoardsyncError> {
    match cmd {
        DeadCommands::List => format_dead_letters(&queue.list_dead_letters()?, format),
        DeadCommands::Discard { id } => {
            let id = EntryId::parse(&id)?;
            if !queue.discard_dead_letter(&id)? {
                return Err(BoardsyncError::NotFound(format!("dead letter {id}")));
            }

            match format {
                OutputFormat::Json => to_json(&json!({"discarded": id})),
                OutputFormat::Pretty => Ok(format!("Discarded {id}")),
            }
        }
        DeadCommands::Requeue { id, payload } => {
            let id = EntryId::parse(&id)?;
            let replacement = payload
                .as_deref()
                .map(Mutation::from_json)
                .transpose()
                .map_err(|e| BoardsyncError::InvalidInput(format!("Invalid payload: {e}")))?;

            let new_id = queue.requeue_dead_letter(&id, replacement)?;

            match format {
                OutputFormat::Json => to_json(&json!({"requeued": id, "id": new_id})),
                OutputFormat::Pretty => Ok(format!(
                    "{} Requeued {id} as {new_id}",
                    "✓".green()
                )),
            }
        }
    }
}
