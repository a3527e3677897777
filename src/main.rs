use clap::{Parser, Subcommand};
use mechorder::mechanism::Mechanism;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Mechanism snapshot (JSON species and reaction records).
    #[arg(global = true, short, long, default_value = "mechanism.json")]
    mechanism: String,

    /// Build directory holding the optimization checkpoint.
    #[arg(global = true, short, long, default_value = "out")]
    build_dir: PathBuf,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Optimize(cmd::optimize::OptimizeArgs),
    Score(cmd::score::ScoreArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("📂 Loading Mechanism: {}", cli.mechanism);
    let mechanism = Mechanism::load_from_file(&cli.mechanism).unwrap_or_else(|e| {
        error!("❌ Could not load mechanism '{}': {}", cli.mechanism, e);
        process::exit(1);
    });

    let result = match cli.command {
        Commands::Optimize(args) => cmd::optimize::run(args, &mechanism, &cli.build_dir),
        Commands::Score(args) => cmd::score::run(args, &mechanism),
    };

    if let Err(e) = result {
        error!("❌ {}", e);
        process::exit(1);
    }
}
