//! Tanker: flatten subfolders into one directory.
//!
//! Thin binary entry point. All copy logic lives in `tanker_io_fs`.

mod cli;
mod logger;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tanker_io_fs::start_flatten_copy;
use tracing::info;

use crate::cli::CliArgs;
use crate::logger::initialize_logger;

const N_EXIT_FILESYSTEM: u8 = 1;
const N_EXIT_VALIDATION: u8 = 2;

fn main() -> anyhow::Result<ExitCode> {
    let cli_args = CliArgs::parse();
    initialize_logger(cli_args.verbose)?;

    let spec_options = cli_args.to_options();
    info!(?spec_options, "Tanker starting");

    let handle = start_flatten_copy(spec_options).context("Failed to start flatten worker")?;
    let res_flatten = handle.wait(|notice| println!("{notice}"));

    match res_flatten {
        Ok(report) => {
            println!("Folders copied successfully!");
            println!("{report}");
            for warning in &report.warnings {
                eprintln!("warning: {warning}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("An error occurred: {e}");
            let n_exit = if e.is_validation() {
                N_EXIT_VALIDATION
            } else {
                N_EXIT_FILESYSTEM
            };
            Ok(ExitCode::from(n_exit))
        }
    }
}
