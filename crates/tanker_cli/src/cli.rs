use clap::Parser;
use tanker_io_fs::{SpecFlattenOptions, parse_exclusion_list};

/// Copy the contents of every immediate subfolder of SOURCE into DESTINATION.
#[derive(Parser, Debug, Clone)]
#[command(name = "tanker", version)]
pub struct CliArgs {
    /// Source directory whose subfolders are flattened.
    #[arg(env = "TANKER_SOURCE")]
    pub source: String,
    /// Destination directory receiving the flattened contents.
    #[arg(env = "TANKER_DESTINATION")]
    pub destination: String,
    /// Files to exclude (comma-separated base names).
    #[arg(short = 'e', long, env = "TANKER_EXCLUDE", default_value = "")]
    pub exclude: String,
    /// Omit the files named by --exclude.
    #[arg(short = 'o', long)]
    pub omit_files: bool,
    /// Report what would be copied without writing anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl CliArgs {
    pub fn to_options(&self) -> SpecFlattenOptions {
        SpecFlattenOptions {
            dir_source: self.source.clone().into(),
            dir_destination: self.destination.clone().into(),
            names_exclude: parse_exclusion_list(&self.exclude),
            if_omit_files: self.omit_files,
            if_dry_run: self.dry_run,
        }
    }
}
