//! Command implementations for boardsync.
//!
//! Each command returns the text to print; `main` prints it.

mod board;
mod config;
mod project;
mod sync;
mod task;

pub use board::board;
pub use config::config;
pub use project::project;
pub use sync::sync;
pub use task::task;

use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::Shell;
use serde_json::json;

use crate::cli::args::{Cli, OutputFormat, SyncNowArg};
use crate::config::{Config, Paths};
use crate::core::EntryId;
use crate::error::BoardsyncError;
use crate::features::sync::{ConnectivitySignal, Mutation, StaticSignal, SyncClient, SyncQueue};
use crate::output::{format_drain, format_queued, to_json};
use crate::remote::{HttpEndpoint, HttpProbe};
use crate::storage::Database;

/// Resolved paths, configuration and output format for one invocation.
pub struct Context {
    pub paths: Paths,
    pub config: Config,
    pub format: OutputFormat,
}

impl Context {
    /// Resolve paths and load the configuration file.
    ///
    /// `output` overrides `general.default_output`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be found or the config file is invalid.
    pub fn load(home: Option<PathBuf>, output: Option<OutputFormat>) -> Result<Self, BoardsyncError> {
        let paths = Paths::resolve(home)?;
        let config = Config::load_from_path(&paths.config_file)?;
        let format = output.unwrap_or(config.general.default_output);

        Ok(Self {
            paths,
            config,
            format,
        })
    }

    /// Open the queue database, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open_queue(&self) -> Result<SyncQueue, BoardsyncError> {
        let db = Database::open(&self.paths)?;
        Ok(SyncQueue::with_database(db).with_max_attempts(self.config.sync.max_attempts))
    }

    /// HTTP endpoint built from the `remote` section.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn endpoint(&self) -> Result<HttpEndpoint, BoardsyncError> {
        HttpEndpoint::from_config(&self.config.remote)
    }

    /// Health probe built from the `remote` section.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn probe(&self) -> Result<HttpProbe, BoardsyncError> {
        HttpProbe::from_config(&self.config.remote)
    }

    /// Open a sync client whose initial connectivity comes from `signal`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database or HTTP client cannot be set up.
    pub fn open_client(
        &self,
        signal: &dyn ConnectivitySignal,
    ) -> Result<SyncClient<HttpEndpoint>, BoardsyncError> {
        SyncClient::new(self.open_queue()?, self.endpoint()?, signal)
    }

    /// Open a sync client, probing the server only when a drain may follow.
    ///
    /// # Errors
    ///
    /// Returns an error if the database or HTTP client cannot be set up.
    pub fn open_client_for(
        &self,
        sync_now: SyncNowArg,
    ) -> Result<SyncClient<HttpEndpoint>, BoardsyncError> {
        if sync_now.sync {
            self.open_client(&self.probe()?)
        } else {
            self.open_client(&StaticSignal(false))
        }
    }
}

/// Queue a mutation and, when asked and reachable, deliver the queue.
///
/// # Errors
///
/// Returns an error if the mutation cannot be stored or the drain hits a storage error.
pub fn queue_mutation(
    client: &SyncClient<HttpEndpoint>,
    mutation: &Mutation,
    sync_now: SyncNowArg,
    format: OutputFormat,
) -> Result<String, BoardsyncError> {
    let id = client.submit(mutation)?;
    report_queued(client, &id, mutation, sync_now, format)
}

/// Confirm an entry that is already committed, delivering first when asked.
///
/// # Errors
///
/// Returns an error if the drain hits a storage error.
pub fn report_queued(
    client: &SyncClient<HttpEndpoint>,
    id: &EntryId,
    mutation: &Mutation,
    sync_now: SyncNowArg,
    format: OutputFormat,
) -> Result<String, BoardsyncError> {
    let drain = if sync_now.sync && client.is_online() {
        Some(client.force_sync()?)
    } else {
        None
    };
    let pending = client.pending_count()?;

    match format {
        OutputFormat::Json => to_json(&json!({
            "id": id,
            "payload": mutation,
            "pending": pending,
            "drain": drain,
        })),
        OutputFormat::Pretty => {
            let mut output = format_queued(id, mutation, pending, format)?;
            if let Some(outcome) = &drain {
                output.push_str("\n\n");
                output.push_str(&format_drain(outcome, format)?);
            } else if sync_now.sync {
                output.push_str("\n  server unreachable, will sync later");
            }
            Ok(output)
        }
    }
}

/// Generate shell completions for the specified shell.
#[must_use]
pub fn completions(shell: Shell) -> String {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, "boardsync", &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
