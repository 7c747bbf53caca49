//! Terminal driver: ticks a Schelling simulation at a fixed cadence and
//! prints each frame.

mod render;
mod telemetry;

use anyhow::{Context, Result};
use schelling_core::DriverConfig;
use schelling_world::Simulation;
use tokio::signal;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config = load_config()?;

    info!("Starting Schelling driver");
    info!(
        "Grid: {} cells, threshold {}, seed {}",
        config.simulation.cell_count, config.simulation.threshold, config.simulation.seed
    );

    let mut simulation = Simulation::new(&config.simulation)?;

    if config.render {
        print!(
            "{}",
            render::render_frame(simulation.grid(), &config.glyphs, 0, None)
        );
    }

    tokio::select! {
        result = run_loop(&mut simulation, &config) => result?,
        result = shutdown_signal() => result?,
    }

    info!(
        ticks = simulation.current_tick(),
        final_ratio = ?simulation.last_ratio(),
        "Shutting down driver"
    );

    Ok(())
}

/// Load configuration from the JSON file named by the first argument, or
/// fall back to defaults. `SCHELLING_SEED` overrides the seed.
fn load_config() -> Result<DriverConfig> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            DriverConfig::from_json_file(&path)
                .with_context(|| format!("failed to load configuration from {}", path))?
        }
        None => DriverConfig::default(),
    };

    if let Ok(seed) = std::env::var("SCHELLING_SEED") {
        config.simulation.seed = seed
            .parse()
            .with_context(|| format!("SCHELLING_SEED is not a valid seed: {}", seed))?;
    }

    Ok(config)
}

async fn run_loop(simulation: &mut Simulation<String>, config: &DriverConfig) -> Result<()> {
    let mut ticker = interval(Duration::from_millis(config.tick_interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        if let Some(max_ticks) = config.max_ticks {
            if simulation.current_tick() >= max_ticks {
                info!("Reached tick limit of {}", max_ticks);
                return Ok(());
            }
        }

        ticker.tick().await;

        let report = simulation.tick()?;
        debug!(
            tick = simulation.current_tick(),
            satisfaction_ratio = report.satisfaction_ratio,
            unsatisfied = report.seeking,
            relocated = report.relocations.len(),
            "Ratio: {:.4}",
            report.satisfaction_ratio
        );

        if config.render {
            print!(
                "{}",
                render::render_frame(
                    simulation.grid(),
                    &config.glyphs,
                    simulation.current_tick(),
                    Some(report.satisfaction_ratio),
                )
            );
        }

        if config.stop_when_converged && report.is_converged() {
            info!(
                "Converged after {} ticks: every agent is satisfied",
                simulation.current_tick()
            );
            return Ok(());
        }
    }
}

/// Resolve once Ctrl+C, or SIGTERM on unix, arrives
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("failed to install SIGTERM handler")?;
        tokio::select! {
            result = signal::ctrl_c() => result.context("failed to listen for Ctrl+C")?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    info!("Shutdown signal received");
    Ok(())
}
