//! Log subscriber setup for the driver.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,schelling_driver=debug,schelling_world=info";

/// Install the global subscriber. Logs go to stderr so rendered frames
/// keep stdout to themselves. `SCHELLING_LOG_JSON=1` switches to JSON lines.
pub fn init_telemetry() -> Result<()> {
    let json = std::env::var("SCHELLING_LOG_JSON")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    info!(json, "Telemetry initialized");
    Ok(())
}
