//! `niri-mcp` binary entry point.
use anyhow::Result;
use clap::Parser;

use niri_mcp::{cli, commands, logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose, args.command.log_name());

    let result = match &args.command {
        cli::Command::Serve => commands::serve::run(&args.global),
        cli::Command::Tools => commands::tools::run(),
        cli::Command::Call(opts) => commands::call::run(&args.global, opts),
        cli::Command::Version => commands::version::run(),
    };
    if let Err(e) = &result {
        tracing::error!("{e:#}");
    }
    result
}
