//! Schelling segregation engine.
//!
//! This crate holds the grid agents live on, the random initial layout, and
//! the step that classifies every agent and relocates the unsatisfied ones.
//! Rendering and timing belong to whoever drives it.

pub mod grid;
pub mod population;
pub mod engine;
pub mod simulation;

pub use grid::{Census, Grid};
pub use population::initialize_grid;
pub use engine::{classify, step, Relocation, StepReport};
pub use simulation::{RunSummary, Simulation};
