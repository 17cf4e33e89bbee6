use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use boardsync::cli::args::{Cli, Commands};
use boardsync::cli::commands::{self, Context};
use boardsync::config::ColorSetting;
use boardsync::error::BoardsyncError;

fn main() {
    let cli = Cli::parse();
    let queues_mutation = cli.command.queues_mutation();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        if queues_mutation && e.is_storage() {
            eprintln!("{}", "The change was not queued.".yellow());
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), BoardsyncError> {
    init_logging(cli.verbose);

    if let Commands::Completions { shell } = cli.command {
        print!("{}", commands::completions(shell));
        return Ok(());
    }

    let ctx = Context::load(cli.home, cli.output)?;
    match ctx.config.general.color {
        ColorSetting::Always => colored::control::set_override(true),
        ColorSetting::Never => colored::control::set_override(false),
        ColorSetting::Auto => {}
    }

    let output = match cli.command {
        Commands::Task(args) => commands::task(&ctx, args.command)?,
        Commands::Project(args) => commands::project(&ctx, args.command)?,
        Commands::Board(args) => commands::board(&ctx, args.command)?,
        Commands::Sync(args) => commands::sync(&ctx, args.command)?,
        Commands::Config(args) => commands::config(&ctx, args.command)?,
        Commands::Completions { .. } => String::new(),
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
