use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lanlearner", version, about = "Lanlearner flashcards with fixed-interval review")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, edit and browse cards
    Card {
        #[command(subcommand)]
        action: commands::card::CardAction,
    },
    /// Review queue and review events
    Review {
        #[command(subcommand)]
        action: commands::review::ReviewAction,
    },
    /// Tag registry
    Tag {
        #[command(subcommand)]
        action: commands::tag::TagAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Backup import/export
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lanlearner=warn,lanlearner_core=warn")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Card { action } => commands::card::run(action),
        Commands::Review { action } => commands::review::run(action),
        Commands::Tag { action } => commands::tag::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Data { action } => commands::data::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
