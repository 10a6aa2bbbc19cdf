use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "themetimer-cli", version, about = "Themetimer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a live countdown
    Countdown(commands::timer::CountdownArgs),
    /// Run a stopwatch, recording laps, then print the lap export
    Stopwatch(commands::timer::StopwatchArgs),
    /// Render milliseconds as a display string
    Format(commands::format::FormatArgs),
    /// Parse a time string into milliseconds
    Parse {
        /// e.g. "05:00", "1:30:00", "1h 30m 5s" or "90"
        input: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("THEMETIMER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Countdown(args) => commands::timer::run_countdown(args),
        Commands::Stopwatch(args) => commands::timer::run_stopwatch(args),
        Commands::Format(args) => commands::format::run_format(args),
        Commands::Parse { input } => commands::format::run_parse(&input),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
