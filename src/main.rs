//! CIDR Speedtest - Main CLI Application
//!
//! Samples addresses from a CIDR list and ranks them by TCP connect latency.

use cidr_speedtest::{
    app::App,
    cli::Cli,
    error::{AppError, ErrorReporter},
};
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue together with the command line that triggered it");
        process::exit(1);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    match App::new(cli).run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            reporter.report_error(&e);
            print_error_suggestions(&e);
            process::exit(e.exit_code());
        }
    }
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format (cst --init-env .env.example)");
            eprintln!("  - MAX_WORKERS must be 1-1000, IP_COUNT 1-100000, TIMEOUT_MS 1-60000");
            eprintln!("  - TEST_PORT must be a non-zero port number");
        }
        AppError::Validation(_) => {
            eprintln!();
            eprintln!("Run 'cst --help' for the list of options");
        }
        AppError::Io(_) => {
            eprintln!();
            eprintln!("I/O troubleshooting:");
            eprintln!("  - Check that the output location is writable");
            eprintln!("  - Check file permissions of the CIDR list");
        }
        _ => {}
    }
}
