use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "focushub", version, about = "Focus Hub CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Session statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Background ambience
    Ambience {
        #[command(subcommand)]
        action: commands::ambience::AmbienceAction,
    },
    /// Sign in and out
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Outbound email
    Email {
        #[command(subcommand)]
        action: commands::email::EmailAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Stderr logging. `RUST_LOG` wins over the configured filter.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let level = focushub_core::Config::load_or_default().log.filter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action).await,
        Commands::Task { action } => commands::task::run(action).await,
        Commands::Stats { json } => commands::stats::run(json).await,
        Commands::Ambience { action } => commands::ambience::run(action).await,
        Commands::Auth { action } => commands::auth::run(action).await,
        Commands::Email { action } => commands::email::run(action).await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
