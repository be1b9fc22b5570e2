mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{demo, dump, merge, DemoArgs, DumpArgs, MergeArgs};
use std::path::PathBuf;
use tracing::Level;

/// WriteKit CLI - build, inspect and merge MS Write documents
#[derive(Parser, Debug)]
#[command(name = "writekit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log library activity at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ./writekit.config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a sample document
    Demo(DemoArgs),

    /// Print the structure of a .wri file
    Dump(DumpArgs),

    /// Concatenate .wri files
    Merge(MergeArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();

    match cli.command {
        Command::Demo(args) => demo(args, &cwd, cli.config.as_deref()),
        Command::Dump(args) => dump(args),
        Command::Merge(args) => merge(args),
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
