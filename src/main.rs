use clap::Parser;
use tidyfolder::cli::{Args, run_cli};
use tidyfolder::logging::setup_logging;
use tidyfolder::output::OutputFormatter;
use tidyfolder::platform::HostInfo;

fn main() {
    let args = Args::parse();

    if let Err(e) = setup_logging(args.verbose) {
        eprintln!("Warning: could not initialize logging: {}", e);
    }

    let host = HostInfo::detect();
    if args.json {
        // stdout carries only the summary document
        tracing::info!(%host, "starting");
    } else {
        OutputFormatter::header("tidyfolder - sort a folder's files by type");
        OutputFormatter::plain(&format!("Running on {}", host));
    }

    if let Err(e) = run_cli(args) {
        OutputFormatter::error(&format!("Error: {:#}", e));
    }
}
