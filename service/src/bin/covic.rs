//! `covic` command-line interface
//!
//! This binary provides the `covic` tool for working with CoVIC-DB
//! submission templates and submissions.

use clap::Parser;
use std::process::ExitCode;
use submission_service::cli::{self, Cli};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    cli::init_tracing(cli.verbose);
    cli::run(&cli)
}
