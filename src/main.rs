use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use gt::cli::Cli;
use gt::commands;
use gt::config::Config;

/// Log filter variable, e.g. `GT_LOG=debug`.
const LOG_ENV: &str = "GT_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let config = match Config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    debug!(?config, "config loaded");

    let command = cli.command.unwrap_or_default();
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = commands::run(command, &config, &mut stdout) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
