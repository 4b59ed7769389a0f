//! lease-mutex CLI
//!
//! Binary name: `lease-mutex`

use std::process;

use lease_mutex::cli::{
    build_cli,
    handlers::{dispatch, exit_code, format_error},
    verbosity,
};
use lease_mutex_core::Cancellation;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("warn,lease_mutex_core=debug,lease_mutex=debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();
    init_tracing(verbosity(&matches));

    // Ctrl-C abandons the in-flight store call; the handle lives in the task.
    let (handle, interrupt) = Cancellation::pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received SIGINT, cancelling");
            handle.cancel();
        }
    });

    if let Err(err) = dispatch(&matches, interrupt).await {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {}", format_error(&err));
        }

        #[allow(clippy::exit)]
        process::exit(exit_code(&err));
    }
}
