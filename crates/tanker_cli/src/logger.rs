use tracing_subscriber::{EnvFilter, fmt};

const C_FILTER_DEFAULT: &str = "warn";
const C_FILTER_VERBOSE: &str = "warn,tanker_io_fs=debug,tanker_cli=debug";

/// Install the global `tracing` subscriber. `RUST_LOG` wins over `verbose`.
pub fn initialize_logger(verbose: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            C_FILTER_VERBOSE
        } else {
            C_FILTER_DEFAULT
        })
    });

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global logger: {e}"))
}
