mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use lannerpsp::logger;
use lannerpsp::utils::is_root;

fn main() -> ExitCode {
    let cli_args = cli::Cli::parse();
    logger::init_tracing();

    if !is_root() {
        eprintln!("Error: lannerpsp needs root to reach the board I/O ports.");
        eprintln!(
            "Please run with: sudo {}",
            std::env::args().next().unwrap_or_else(|| "lannerpsp".to_string())
        );
        return ExitCode::FAILURE;
    }

    match cli::run_cli(&cli_args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
