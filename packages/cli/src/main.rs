mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    init, research, review, submit, InitArgs, ResearchCommand, ReviewCommand, SubmitArgs,
};
use tracing_subscriber::EnvFilter;

/// Journal CLI - author, publish and review research articles
#[derive(Parser, Debug)]
#[command(name = "journal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor and service activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a journal.config.json and a sample manifest
    Init(InitArgs),

    /// Upload attachments and save a research manifest
    Submit(SubmitArgs),

    /// Browse and manage published research
    Research {
        #[command(subcommand)]
        command: ResearchCommand,
    },

    /// Triage the submission queue
    Review {
        #[command(subcommand)]
        command: ReviewCommand,
    },
}

/// Default filter when `RUST_LOG` is unset
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "journal_editor=debug,journal_cli=debug"
    } else {
        "warn"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match std::env::current_dir() {
        Ok(cwd) => match cli.command {
            Command::Init(args) => init(args, &cwd),
            Command::Submit(args) => submit(args, &cwd).await,
            Command::Research { command } => research(command, &cwd).await,
            Command::Review { command } => review(command, &cwd).await,
        },
        Err(err) => Err(anyhow::anyhow!("Cannot get current directory: {}", err)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_verbose_filter_enables_cli_events() {
        let filter = EnvFilter::new(default_directives(true));
        let subscriber = tracing_subscriber::registry().with(filter);

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "journal_cli::config", Level::DEBUG));
            assert!(tracing::enabled!(target: "journal_editor::pipeline", Level::DEBUG));
        });
    }

    #[test]
    fn test_quiet_filter_drops_debug() {
        let subscriber = tracing_subscriber::registry().with(EnvFilter::new(default_directives(false)));

        tracing::subscriber::with_default(subscriber, || {
            assert!(!tracing::enabled!(target: "journal_cli::config", Level::DEBUG));
            assert!(tracing::enabled!(target: "journal_cli::config", Level::WARN));
        });
    }
}
