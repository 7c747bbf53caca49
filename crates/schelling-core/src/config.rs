//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::Threshold;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::path::Path;

/// Slack allowed when summing shares, to absorb float representation error
pub const SHARE_EPSILON: f64 = 1e-9;

/// Fraction of the grid assigned to one agent kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindShare<K> {
    pub kind: K,
    pub share: f64,
}

/// Target population mix: an ordered list of kind shares.
///
/// Whatever the shares leave over is empty space. Order matters only for
/// reproducibility under a fixed seed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    try_from = "Vec<KindShare<K>>",
    bound(deserialize = "K: Deserialize<'de> + PartialEq")
)]
pub struct PopulationMix<K> {
    shares: Vec<KindShare<K>>,
}

impl<K: PartialEq> TryFrom<Vec<KindShare<K>>> for PopulationMix<K> {
    type Error = Error;

    fn try_from(shares: Vec<KindShare<K>>) -> Result<Self> {
        let mix = Self { shares };
        mix.validate()?;
        Ok(mix)
    }
}

impl<K: Serialize> Serialize for PopulationMix<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.shares.serialize(serializer)
    }
}

impl<K: PartialEq> PopulationMix<K> {
    pub fn new(shares: Vec<(K, f64)>) -> Result<Self> {
        shares
            .into_iter()
            .map(|(kind, share)| KindShare { kind, share })
            .collect::<Vec<_>>()
            .try_into()
    }

    /// Check that each share lies in [0, 1], kinds are distinct, and the
    /// shares sum to at most 1
    pub fn validate(&self) -> Result<()> {
        for (idx, entry) in self.shares.iter().enumerate() {
            if !(0.0..=1.0).contains(&entry.share) {
                return Err(Error::InvalidDimension(format!(
                    "share {} at index {} is not within [0, 1]",
                    entry.share, idx
                )));
            }
            if self.shares[..idx].iter().any(|prev| prev.kind == entry.kind) {
                return Err(Error::InvalidDimension(format!(
                    "kind at index {} appears more than once",
                    idx
                )));
            }
        }

        let total = self.total_share();
        if total > 1.0 + SHARE_EPSILON {
            return Err(Error::InvalidDimension(format!(
                "shares sum to {}, which exceeds 1.0",
                total
            )));
        }

        Ok(())
    }
}

impl<K> PopulationMix<K> {
    pub fn shares(&self) -> &[KindShare<K>] {
        &self.shares
    }

    pub fn kinds(&self) -> impl Iterator<Item = &K> + '_ {
        self.shares.iter().map(|entry| &entry.kind)
    }

    pub fn total_share(&self) -> f64 {
        self.shares.iter().map(|entry| entry.share).sum()
    }

    /// Share left for empty cells
    pub fn empty_share(&self) -> f64 {
        (1.0 - self.total_share()).max(0.0)
    }
}

/// Parameters of one simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de> + PartialEq"))]
pub struct SimulationConfig<K> {
    /// Requested number of cells; the grid side is floor(sqrt(cell_count))
    pub cell_count: usize,
    /// Population mix by kind
    pub mix: PopulationMix<K>,
    /// Tolerance for dissimilar neighbors
    pub threshold: Threshold,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for SimulationConfig<String> {
    fn default() -> Self {
        Self {
            cell_count: 900,
            mix: PopulationMix {
                shares: vec![
                    KindShare {
                        kind: "red".to_string(),
                        share: 0.25,
                    },
                    KindShare {
                        kind: "blue".to_string(),
                        share: 0.25,
                    },
                ],
            },
            threshold: Threshold(0.25),
            seed: 0,
        }
    }
}

/// Configuration of the interactive driver that ticks and renders a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// The simulation to drive
    pub simulation: SimulationConfig<String>,
    /// Delay between ticks (milliseconds)
    pub tick_interval_ms: u64,
    /// Stop after this many ticks; run until interrupted when unset
    pub max_ticks: Option<u64>,
    /// Stop once a step finds every agent satisfied
    pub stop_when_converged: bool,
    /// Print a text frame after every tick
    pub render: bool,
    /// Glyph per kind used by the text renderer
    pub glyphs: HashMap<String, char>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        let glyphs = [("red".to_string(), 'R'), ("blue".to_string(), 'B')]
            .into_iter()
            .collect();

        Self {
            simulation: SimulationConfig::default(),
            tick_interval_ms: 450,
            max_ticks: None,
            stop_when_converged: true,
            render: true,
            glyphs,
        }
    }
}

impl DriverConfig {
    /// Load a driver configuration from a JSON file; missing fields take
    /// their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
