use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "planboard-cli", version, about = "Planboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Activity management
    Activity {
        #[command(subcommand)]
        action: commands::activity::ActivityAction,
    },
    /// Bulk import activities from CSV
    Import(commands::import::ImportArgs),
    /// Monthly activity report
    Report(commands::report::ReportArgs),
    /// List boards with their display colours
    Boards,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Activity { action } => commands::activity::run(action),
        Commands::Import(args) => commands::import::run(args),
        Commands::Report(args) => commands::report::run(args),
        Commands::Boards => commands::boards::run(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
