//! Log setup for the CLI.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variable holding a tracing filter, e.g. `calgrid_core=debug`.
const LOG_ENV: &str = "CALGRID_LOG";

/// Install a stderr subscriber so stdout stays reserved for command output.
///
/// `CALGRID_LOG` wins over the default level; `verbose` raises the default
/// from `warn` to `debug`.
pub fn init(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set up logging: {e}"))?;

    Ok(())
}
