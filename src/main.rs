use std::process::ExitCode;

use clap::Parser;

use backbone::config::CliArgs;
use backbone::lifecycle::App;
use backbone::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    // --help never reaches here: clap prints usage and exits 0.
    let args = CliArgs::parse();

    logging::init(args.verbose, args.silent);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "backbone starting");

    let running = match App::new(args).start().await {
        Ok(running) => running,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            return ExitCode::from(1);
        }
    };

    let code = running.run_until_signal().await;
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
