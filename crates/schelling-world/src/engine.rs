//! Satisfaction classification and the relocation step.

use crate::grid::Grid;
use rand::Rng;
use schelling_core::{Occupant, Position, Result, Satisfaction, Threshold};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Same-kind and other-kind neighbor counts around one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighborCounts {
    pub good: usize,
    pub bad: usize,
}

impl NeighborCounts {
    /// Fraction of non-empty neighbors sharing the cell's kind, or `None`
    /// when the cell has no non-empty neighbors
    pub fn similarity(&self) -> Option<f64> {
        let total = self.good + self.bad;
        if total == 0 {
            None
        } else {
            Some(self.good as f64 / total as f64)
        }
    }
}

/// Count the in-bounds neighbors of `pos` relative to `kind`.
/// Off-grid neighbors are skipped and empty ones count toward neither side.
pub fn neighbor_counts<K: PartialEq>(grid: &Grid<K>, pos: Position, kind: &K) -> NeighborCounts {
    pos.surrounding()
        .filter_map(|neighbor| grid.get(neighbor).ok())
        .fold(NeighborCounts::default(), |mut counts, occupant| {
            match occupant {
                Occupant::Agent(other) if other == kind => counts.good += 1,
                Occupant::Agent(_) => counts.bad += 1,
                Occupant::Empty => {}
            }
            counts
        })
}

/// Classify the cell at `pos`
pub fn classify<K: PartialEq>(
    grid: &Grid<K>,
    pos: Position,
    threshold: Threshold,
) -> Result<Satisfaction> {
    Ok(match grid.get(pos)? {
        Occupant::Empty => Satisfaction::NotApplicable,
        Occupant::Agent(kind) => judge(neighbor_counts(grid, pos, kind), threshold),
    })
}

fn judge(counts: NeighborCounts, threshold: Threshold) -> Satisfaction {
    match counts.similarity() {
        // Isolated agents have no evidence of a bad neighborhood
        None => Satisfaction::Satisfied,
        Some(ratio) if ratio < threshold.required_similarity() => Satisfaction::Unsatisfied,
        Some(_) => Satisfaction::Satisfied,
    }
}

/// Cells that take part in relocation, in row-major collection order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub vacant: Vec<Position>,
    pub seeking: Vec<Position>,
}

/// Split the grid into empty cells and unsatisfied agents. Satisfied
/// agents appear in neither list.
pub fn partition<K: PartialEq>(grid: &Grid<K>, threshold: Threshold) -> Partition {
    let mut partition = Partition::default();

    for (pos, occupant) in grid.iter() {
        match occupant {
            Occupant::Empty => partition.vacant.push(pos),
            Occupant::Agent(kind) => {
                if judge(neighbor_counts(grid, pos, kind), threshold) == Satisfaction::Unsatisfied {
                    partition.seeking.push(pos);
                }
            }
        }
    }

    partition
}

/// `1 - seeking / (cells / 2)`: 1.0 when every agent is satisfied
pub fn satisfaction_ratio(seeking: usize, size: usize) -> f64 {
    let half_area = (size * size) as f64 / 2.0;
    1.0 - seeking as f64 / half_area
}

/// One agent moved during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    pub from: Position,
    pub to: Position,
}

/// What a single step observed and did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub satisfaction_ratio: f64,
    /// Unsatisfied agents found by the scan
    pub seeking: usize,
    /// Empty cells found by the scan
    pub vacant: usize,
    pub relocations: Vec<Relocation>,
}

impl StepReport {
    /// No agent wanted to move
    pub fn is_converged(&self) -> bool {
        self.seeking == 0
    }

    /// Unsatisfied agents left in place because vacancies ran out
    pub fn stranded(&self) -> usize {
        self.seeking - self.relocations.len()
    }
}

/// Advance the grid by one step.
///
/// Every cell is classified against the grid as it stood before the step.
/// Unsatisfied agents then move, in scan order, each into a vacant cell
/// drawn uniformly from those not yet taken this step. Agents left over
/// when vacancies run out stay put until the next step.
#[instrument(skip_all, fields(size = grid.size(), threshold = %threshold))]
pub fn step<K, R>(grid: &mut Grid<K>, threshold: Threshold, rng: &mut R) -> Result<StepReport>
where
    K: Clone + PartialEq,
    R: Rng + ?Sized,
{
    let Partition {
        mut vacant,
        seeking,
    } = partition(grid, threshold);

    let satisfaction_ratio = satisfaction_ratio(seeking.len(), grid.size());
    let seeking_count = seeking.len();
    let vacant_count = vacant.len();

    let mut relocations = Vec::with_capacity(seeking_count.min(vacant_count));
    for from in seeking {
        if vacant.is_empty() {
            break;
        }
        let to = vacant.swap_remove(rng.gen_range(0..vacant.len()));

        let occupant = grid.get(from)?.clone();
        grid.set(to, occupant)?;
        grid.set(from, Occupant::Empty)?;

        relocations.push(Relocation { from, to });
    }

    debug!(
        seeking = seeking_count,
        vacant = vacant_count,
        relocated = relocations.len(),
        satisfaction_ratio,
        "Step complete"
    );

    Ok(StepReport {
        satisfaction_ratio,
        seeking: seeking_count,
        vacant: vacant_count,
        relocations,
    })
}
