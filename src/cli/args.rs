use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "boardsync")]
#[command(about = "Offline-first task queue and sync client for kanban project boards")]
#[command(long_about = "boardsync - offline-first sync for kanban boards

Every change is written to a local queue first and delivered to the server
later, in order, when it is reachable. Nothing is lost while offline.

QUICK START:
  boardsync task add \"Buy milk\" --project 7     Queue a new task
  boardsync sync status                          Show what is waiting
  boardsync sync run                             Deliver queued changes now
  boardsync sync watch                           Deliver whenever the server is reachable

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  boardsync <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output (default),
    /// or 'json' for machine-readable output suitable for scripting.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Data directory holding config.yaml and the queue database
    ///
    /// Defaults to ~/.boardsync.
    #[arg(long, env = "BOARDSYNC_HOME", global = true)]
    pub home: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    ///
    /// Logs go to stderr. RUST_LOG takes precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Queue task changes
    ///
    /// # Examples
    ///
    ///   boardsync task add "Buy milk" --project 7
    ///   boardsync task add "Ship it" --project 7 --column todo --priority high --due 2024-12-31
    Task(TaskArgs),

    /// Queue project changes
    ///
    /// # Examples
    ///
    ///   boardsync project add "Launch" --workspace 1
    ///   boardsync project update 4 --name "Launch v2"
    ///   boardsync project delete 4
    Project(ProjectArgs),

    /// Show and rearrange kanban boards
    ///
    /// Moves are applied to the local board immediately and queued for the
    /// server as a single move command.
    ///
    /// # Examples
    ///
    ///   boardsync board show 7
    ///   boardsync board column add 7 todo "To Do"
    ///   boardsync board item add 7 todo t1
    ///   boardsync board move 7 t1 --from todo --to done --index 0
    Board(BoardArgs),

    /// Inspect and deliver the sync queue
    ///
    /// # Subcommands
    ///
    ///   status   Show queue counts
    ///   run      Deliver pending mutations now
    ///   list     Show queued mutations
    ///   watch    Deliver whenever the server becomes reachable
    ///   dead     Review mutations that will not be retried
    ///   clear    Drop everything (requires --force)
    ///
    /// # Examples
    ///
    ///   boardsync sync status
    ///   boardsync sync run -o json
    ///   boardsync sync watch --once
    ///   boardsync sync dead requeue <id> --payload '{"kind":"delete_project","project_id":4}'
    Sync(SyncArgs),

    /// Show or create the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    ///
    /// # Examples
    ///
    ///   boardsync completions bash > /usr/local/etc/bash_completion.d/boardsync
    ///   boardsync completions zsh > ~/.zsh/completions/_boardsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// Whether the command writes a mutation to the queue.
    #[must_use]
    pub const fn queues_mutation(&self) -> bool {
        matches!(
            self,
            Self::Task(_)
                | Self::Project(_)
                | Self::Board(BoardArgs {
                    command: BoardCommands::Move { .. }
                })
        )
    }
}

/// Deliver right after queuing, when the server is reachable.
#[derive(Args, Clone, Copy, Debug, Default)]
pub struct SyncNowArg {
    /// Try to deliver the queue right away
    #[arg(long)]
    pub sync: bool,
}

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommands,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Queue a new task
    Add(AddTaskArgs),
}

#[derive(Args)]
pub struct AddTaskArgs {
    /// Task title
    pub title: String,

    /// Project the task belongs to
    #[arg(short, long)]
    pub project: i64,

    /// Board column to place the task in
    #[arg(short, long)]
    pub column: Option<String>,

    /// Longer description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,

    /// Priority: low, medium or high
    #[arg(long, default_value = "medium")]
    pub priority: String,

    /// Assignee user id
    #[arg(short, long)]
    pub assignee: Option<i64>,

    #[command(flatten)]
    pub sync_now: SyncNowArg,
}

#[derive(Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommands,
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Queue a new project
    Add {
        /// Project name
        name: String,

        /// Workspace the project belongs to
        #[arg(short, long)]
        workspace: i64,

        /// Project description
        #[arg(short, long)]
        description: Option<String>,

        /// Visible only to you
        #[arg(long)]
        personal: bool,

        #[command(flatten)]
        sync_now: SyncNowArg,
    },

    /// Queue a rename or new description
    Update {
        /// Project id
        id: i64,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        #[command(flatten)]
        sync_now: SyncNowArg,
    },

    /// Queue a project deletion
    Delete {
        /// Project id
        id: i64,

        #[command(flatten)]
        sync_now: SyncNowArg,
    },
}

#[derive(Args)]
pub struct BoardArgs {
    #[command(subcommand)]
    pub command: BoardCommands,
}

#[derive(Subcommand)]
pub enum BoardCommands {
    /// Show a project's board
    Show {
        /// Project id
        project: i64,
    },

    /// Manage board columns
    Column {
        #[command(subcommand)]
        command: ColumnCommands,
    },

    /// Manage cards on the local board
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },

    /// Move a card and queue the move
    ///
    /// The index counts positions in the destination column after the card
    /// has been taken out of its source column.
    Move {
        /// Project id
        project: i64,

        /// Card id
        item: String,

        /// Column the card is in now
        #[arg(long)]
        from: String,

        /// Column to move it to
        #[arg(long)]
        to: String,

        /// Position in the destination column
        #[arg(long, default_value = "0")]
        index: usize,

        #[command(flatten)]
        sync_now: SyncNowArg,
    },
}

#[derive(Subcommand)]
pub enum ColumnCommands {
    /// Append a column to the board
    Add {
        /// Project id
        project: i64,

        /// Column id (letters, digits, - and _)
        id: String,

        /// Column title
        title: String,
    },
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Place a card in a column
    Add {
        /// Project id
        project: i64,

        /// Column id
        column: String,

        /// Card id
        item: String,

        /// Position in the column (default: end)
        #[arg(long)]
        index: Option<usize>,
    },
}

/// Arguments for the sync queue.
#[derive(Args)]
pub struct SyncArgs {
    #[command(subcommand)]
    pub command: SyncCommands,
}

/// Sync queue subcommands.
#[derive(Subcommand)]
pub enum SyncCommands {
    /// Show sync queue status
    ///
    /// Displays pending, failed and dead-lettered counts.
    Status,

    /// Deliver pending mutations now
    ///
    /// Submits queued mutations in order. Stops at the first transient
    /// failure so later changes never overtake earlier ones.
    Run,

    /// List queued mutations
    List {
        /// Maximum entries to show
        #[arg(long, short = 'n', default_value = "50")]
        limit: usize,
    },

    /// Deliver whenever the server becomes reachable
    ///
    /// Probes the health URL and drains the queue on every offline to online
    /// transition, plus on the background interval while online.
    Watch {
        /// Probe once, drain if reachable, and exit
        #[arg(long)]
        once: bool,

        /// Skip probing and treat the server as reachable
        #[arg(long)]
        assume_online: bool,
    },

    /// Review mutations that will not be retried
    Dead {
        #[command(subcommand)]
        command: Option<DeadCommands>,
    },

    /// Drop all queued mutations and dead letters
    Clear {
        /// Confirm
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum DeadCommands {
    /// List dead letters
    List,

    /// Drop a dead letter
    Discard {
        /// Entry id
        id: String,
    },

    /// Queue a dead letter again under a new id
    Requeue {
        /// Entry id
        id: String,

        /// Replacement mutation as JSON
        #[arg(long, short = 'p')]
        payload: Option<String>,
    },
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, short = 'f')]
        force: bool,
    },
}
