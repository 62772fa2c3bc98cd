//! rapport CLI: serve, seed and inspect friend evaluations.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rapport", version, about = "Friend evaluation service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and example fixture
    Init,

    /// Validate fixture TOML files
    Validate {
        /// Path to fixture file or directory
        #[arg(long)]
        fixture: PathBuf,
    },

    /// Load criteria, users and friendships into the store
    Seed {
        /// Path to fixture file or directory (default: the built-in criteria)
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run the HTTP API
    Serve {
        /// Listen address (overrides config)
        #[arg(long)]
        bind: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the evaluation summary of a user
    Summary {
        /// Subject user id
        #[arg(long)]
        subject: u64,

        /// Apply the gate of this user instead of the subject's own
        #[arg(long)]
        viewer: Option<u64>,

        /// Ungated, unweighted averages
        #[arg(long)]
        legacy: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List pending evaluation tasks of a rater
    Tasks {
        /// Rater user id
        #[arg(long)]
        rater: u64,

        /// Page offset
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show rater reliability statistics
    RaterStats {
        /// Only this user
        #[arg(long)]
        user: Option<u64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rapport=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { fixture } => commands::validate::execute(fixture),
        Commands::Seed { fixture, config } => commands::seed::execute(fixture, config).await,
        Commands::Serve { bind, config } => commands::serve::execute(bind, config).await,
        Commands::Summary {
            subject,
            viewer,
            legacy,
            json,
            config,
        } => commands::summary::execute(subject, viewer, legacy, json, config).await,
        Commands::Tasks {
            rater,
            offset,
            json,
            config,
        } => commands::tasks::execute(rater, offset, json, config).await,
        Commands::RaterStats { user, json, config } => {
            commands::rater_stats::execute(user, json, config).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
