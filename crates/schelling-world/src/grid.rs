//! Square grid of occupants.

use schelling_core::{Error, Occupant, Position, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// A bounded square grid, stored row-major.
///
/// Every write goes through [`Grid::set`], so every access is bounds
/// checked the same way. There is no wraparound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid<K>")]
pub struct Grid<K> {
    size: usize,
    cells: Vec<Occupant<K>>,
}

/// Unchecked wire shape of a [`Grid`]; deserialization goes through
/// [`Grid::new`]
#[derive(Deserialize)]
struct RawGrid<K> {
    size: usize,
    cells: Vec<Occupant<K>>,
}

impl<K> TryFrom<RawGrid<K>> for Grid<K> {
    type Error = Error;

    fn try_from(raw: RawGrid<K>) -> Result<Self> {
        Grid::new(raw.size, raw.cells)
    }
}

/// Count of occupants per kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Census<K: Eq + Hash> {
    pub agents: HashMap<K, usize>,
    pub empty: usize,
}

impl<K: Eq + Hash> Census<K> {
    pub fn count(&self, kind: &K) -> usize {
        self.agents.get(kind).copied().unwrap_or(0)
    }

    pub fn total_agents(&self) -> usize {
        self.agents.values().sum()
    }
}

impl<K> Grid<K> {
    /// Lay `occupants` out row-major into a `size` x `size` grid
    pub fn new(size: usize, occupants: Vec<Occupant<K>>) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidDimension(
                "grid size must be at least 1".to_string(),
            ));
        }
        if size > i32::MAX as usize {
            return Err(Error::InvalidDimension(format!(
                "grid size {} is too large",
                size
            )));
        }

        let area = size.checked_mul(size).ok_or_else(|| {
            Error::InvalidDimension(format!("grid size {} overflows", size))
        })?;
        if occupants.len() != area {
            return Err(Error::InvalidDimension(format!(
                "expected {} occupants for a {}x{} grid, got {}",
                area,
                size,
                size,
                occupants.len()
            )));
        }

        Ok(Self {
            size,
            cells: occupants,
        })
    }

    /// Build a grid from explicit rows, which must form a square
    pub fn from_rows(rows: Vec<Vec<Occupant<K>>>) -> Result<Self> {
        let size = rows.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != size) {
            return Err(Error::InvalidDimension(format!(
                "row {} has {} cells, expected {}",
                idx,
                row.len(),
                size
            )));
        }

        Self::new(size, rows.into_iter().flatten().collect())
    }

    /// Side length
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether `pos` lies inside the grid
    pub fn contains(&self, pos: Position) -> bool {
        self.index_of(pos).is_some()
    }

    pub fn get(&self, pos: Position) -> Result<&Occupant<K>> {
        let index = self.checked_index(pos)?;
        Ok(&self.cells[index])
    }

    /// Overwrite the occupant at `pos`
    pub fn set(&mut self, pos: Position, occupant: Occupant<K>) -> Result<()> {
        let index = self.checked_index(pos)?;
        self.cells[index] = occupant;
        Ok(())
    }

    fn checked_index(&self, pos: Position) -> Result<usize> {
        self.index_of(pos).ok_or(Error::OutOfBounds {
            row: pos.row,
            col: pos.col,
            size: self.size,
        })
    }

    fn index_of(&self, pos: Position) -> Option<usize> {
        let row = usize::try_from(pos.row).ok()?;
        let col = usize::try_from(pos.col).ok()?;
        if row < self.size && col < self.size {
            Some(row * self.size + col)
        } else {
            None
        }
    }

    /// Get position from index
    fn index_to_pos(&self, index: usize) -> Position {
        let row = (index / self.size) as i32;
        let col = (index % self.size) as i32;
        Position::new(row, col)
    }

    /// Iterator over all positions, row-major
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_pos(i))
    }

    /// Iterator over all cells with positions, row-major
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Occupant<K>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, occupant)| (self.index_to_pos(i), occupant))
    }

    /// Iterator over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Occupant<K>]> + '_ {
        self.cells.chunks(self.size)
    }
}

impl<K: Clone + Eq + Hash> Grid<K> {
    pub fn census(&self) -> Census<K> {
        let mut agents = HashMap::new();
        let mut empty = 0;

        for occupant in &self.cells {
            match occupant {
                Occupant::Empty => empty += 1,
                Occupant::Agent(kind) => *agents.entry(kind.clone()).or_insert(0) += 1,
            }
        }

        Census { agents, empty }
    }
}
