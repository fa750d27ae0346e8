//! apkschema - IL2CPP and FlatBuffers schema dump pipeline

use anyhow::Result;
use apkschema_cli::Cli;
use apkschema_core::logging;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbose, cli.quiet))?;
    apkschema_cli::cli::run(cli)
}
