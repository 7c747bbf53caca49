//! Simulation wrapper owning a grid, its threshold and a seeded RNG.

use crate::engine::{self, StepReport};
use crate::grid::Grid;
use crate::population::initialize_grid;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use schelling_core::{Result, SimulationConfig, Threshold};
use serde::{Deserialize, Serialize};
use tracing::{event, info, instrument, trace, Level};

/// Ticks between progress log lines in [`Simulation::run`]
const PROGRESS_INTERVAL: u64 = 100;

pub struct Simulation<K> {
    grid: Grid<K>,
    threshold: Threshold,
    rng: ChaCha8Rng,
    tick: u64,
    last_ratio: Option<f64>,
}

impl<K: Clone + PartialEq> Simulation<K> {
    /// Populate a fresh grid from `config`
    pub fn new(config: &SimulationConfig<K>) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let grid = initialize_grid(config.cell_count, &config.mix, &mut rng)?;

        info!(
            size = grid.size(),
            threshold = %config.threshold,
            seed = config.seed,
            "Simulation initialized"
        );

        Ok(Self {
            grid,
            threshold: config.threshold,
            rng,
            tick: 0,
            last_ratio: None,
        })
    }

    /// Drive an existing grid
    pub fn from_grid(grid: Grid<K>, threshold: Threshold, seed: u64) -> Self {
        Self {
            grid,
            threshold,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
            last_ratio: None,
        }
    }

    /// Execute one simulation step
    pub fn tick(&mut self) -> Result<StepReport> {
        let report = engine::step(&mut self.grid, self.threshold, &mut self.rng)?;
        self.tick += 1;
        self.last_ratio = Some(report.satisfaction_ratio);

        trace!(
            tick = self.tick,
            satisfaction_ratio = report.satisfaction_ratio,
            relocated = report.relocations.len(),
            "Tick"
        );

        Ok(report)
    }

    /// Run up to `max_ticks` steps, stopping early once a step finds
    /// every agent satisfied
    #[instrument(skip(self))]
    pub fn run(&mut self, max_ticks: u64) -> Result<RunSummary> {
        info!("Starting simulation for up to {} ticks", max_ticks);

        let mut summary = RunSummary::default();

        for _ in 0..max_ticks {
            let report = self.tick()?;
            summary.ticks_run += 1;
            summary.relocations += report.relocations.len() as u64;
            summary.final_ratio = Some(report.satisfaction_ratio);

            if report.is_converged() {
                summary.converged = true;
                break;
            }

            if self.tick % PROGRESS_INTERVAL == 0 {
                info!(
                    "Tick {}: satisfaction ratio {:.4}, {} unsatisfied",
                    self.tick, report.satisfaction_ratio, report.seeking
                );
            }
        }

        event!(
            Level::INFO,
            event = "run_summary",
            ticks_run = summary.ticks_run,
            converged = summary.converged,
            relocations = summary.relocations,
            final_ratio = ?summary.final_ratio,
            "Simulation run finished"
        );

        Ok(summary)
    }
}

impl<K> Simulation<K> {
    pub fn grid(&self) -> &Grid<K> {
        &self.grid
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Number of steps taken so far
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Satisfaction ratio reported by the most recent step
    pub fn last_ratio(&self) -> Option<f64> {
        self.last_ratio
    }
}

/// Outcome of [`Simulation::run`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks_run: u64,
    pub converged: bool,
    pub relocations: u64,
    /// Ratio reported by the last step run; `None` when no step ran
    pub final_ratio: Option<f64>,
}
