// src/main.rs

use anyhow::Result;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    fsgraph::commands::run_cli()
}
