use std::process::ExitCode;

use clap::Parser;

use relayd::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match relayd::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(target: "relayd", error = %error, "daemon terminated");
            ExitCode::FAILURE
        }
    }
}
