//! Tracing initialisation.
//!
//! Console output through the `fmt` layer, filtered by `RUST_LOG` (default `info`):
//!
//! ```bash
//! RUST_LOG=fleetctl=debug,tower_http=debug,sqlx=warn fleetctl -f config.yaml
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber. Fails if one is already installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");
    Ok(())
}
