// ── cotab replay front end ────────────────────────────────────────────────────
//
// Plays a JSON event script against tab labels and prints every re-render
// request they make.  Logging goes to stderr and is controlled by `RUST_LOG`
// (default `cotab=info`).

use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cotab::{app::App, config::Config, script::Script};

/// Replay collaborative tab events and print what each tab label renders.
#[derive(Debug, Parser)]
#[command(name = "cotab", version)]
struct Cli {
    /// Event script (JSON).
    script: PathBuf,

    /// Optional configuration file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Force the dark palette regardless of the config file.
    #[arg(long)]
    dark: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cotab=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> cotab::Result<()> {
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if cli.dark {
        config.dark_mode = true;
    }
    let script = Script::load(&cli.script)?;
    for line in App::run(&script, config)? {
        println!("{line}");
    }
    Ok(())
}
