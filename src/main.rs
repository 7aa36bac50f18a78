mod cli;
mod execute;

use std::path::Path;
use clap::Parser;
use pmx::config::Config;
use pmx::{executor, shims};
use crate::cli::CLI;
use anyhow::Result;

fn main() -> Result<()> {
    let conf = Config::load();
    let args: Vec<String> = std::env::args().collect();

    // Invoked through a shim (argv[0] is npm, pnpx, bun, ...): dispatch to the
    // pinned toolchain instead of parsing our own CLI.
    let exe_name = args
        .first()
        .map(|arg0| {
            Path::new(arg0)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        })
        .unwrap_or_default();
    if let Some(toolchain) = shims::shim_target(&exe_name) {
        if let Err(e) = executor::run(&conf, toolchain, &exe_name, &args[1..]) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return Ok(());
    }

    let cli = CLI::parse();
    execute::execute(&conf, cli)
}
