use std::process::ExitCode;

use clap::Parser;

use claude_session_manager::cli::{self, Cli};
use claude_session_manager::utils::setup_tracing;

fn main() -> ExitCode {
    setup_tracing();
    let args = Cli::parse();

    match cli::run(args) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("claude-session-manager error: {err:#}");
            ExitCode::from(1)
        }
    }
}
