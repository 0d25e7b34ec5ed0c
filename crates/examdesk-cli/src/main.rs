use std::io;
use std::process::ExitCode;

use clap::Parser;
use examdesk_cli::{init_logging, run, Cli, CliConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.log);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(cli, &config, &mut out).await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
