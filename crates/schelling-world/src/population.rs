//! Initial population layout.

use crate::grid::Grid;
use schelling_core::{Error, Occupant, PopulationMix, Result, SHARE_EPSILON};
use rand::Rng;
use tracing::debug;

/// Side length of the largest square that fits in `cell_count` cells
pub fn side_length(cell_count: usize) -> usize {
    let mut side = (cell_count as f64).sqrt() as usize;
    // Correct for float rounding on large counts; `a <= n / a` is `a * a <= n`
    // without the overflow
    while side > 0 && side > cell_count / side {
        side -= 1;
    }
    while side < cell_count / (side + 1) {
        side += 1;
    }
    side
}

/// Exact number of agents of each kind for `cell_count` cells:
/// floor(cell_count * share), in mix order
pub fn agent_counts<K: Clone>(cell_count: usize, mix: &PopulationMix<K>) -> Vec<(K, usize)> {
    mix.shares()
        .iter()
        .map(|entry| {
            let count = (cell_count as f64 * entry.share + SHARE_EPSILON).floor() as usize;
            (entry.kind.clone(), count)
        })
        .collect()
}

/// Build a grid holding exactly floor(cell_count * share) agents of each
/// kind, the rest empty, in a uniformly random layout.
///
/// The side length is floor(sqrt(cell_count)). Each cell, in row-major
/// order, draws one not-yet-placed occupant uniformly without replacement,
/// so every arrangement is equally likely.
pub fn initialize_grid<K, R>(
    cell_count: usize,
    mix: &PopulationMix<K>,
    rng: &mut R,
) -> Result<Grid<K>>
where
    K: Clone + PartialEq,
    R: Rng + ?Sized,
{
    mix.validate()?;

    let side = side_length(cell_count);
    if side == 0 {
        return Err(Error::InvalidDimension(format!(
            "{} cells cannot hold a grid",
            cell_count
        )));
    }
    let area = side * side;

    let counts = agent_counts(cell_count, mix);
    let total_agents: usize = counts.iter().map(|(_, count)| count).sum();
    if total_agents > area {
        return Err(Error::InvalidDimension(format!(
            "{} agents do not fit in a {}x{} grid",
            total_agents, side, side
        )));
    }

    let mut pool: Vec<Occupant<K>> = Vec::with_capacity(area);
    for (kind, count) in counts {
        pool.extend(std::iter::repeat(Occupant::Agent(kind)).take(count));
    }
    pool.resize(area, Occupant::Empty);

    let mut occupants = Vec::with_capacity(area);
    while !pool.is_empty() {
        let pick = rng.gen_range(0..pool.len());
        occupants.push(pool.swap_remove(pick));
    }

    debug!(
        side,
        agents = total_agents,
        empty = area - total_agents,
        "Initialized population"
    );

    Grid::new(side, occupants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Color {
        Red,
        Blue,
        Green,
    }

    #[test]
    fn test_side_length() {
        assert_eq!(side_length(0), 0);
        assert_eq!(side_length(1), 1);
        assert_eq!(side_length(8), 2);
        assert_eq!(side_length(9), 3);
        assert_eq!(side_length(90_000), 300);
        assert_eq!(side_length(90_000 - 1), 299);
    }

    #[test]
    fn test_side_length_near_usize_max() {
        let max_side = (1usize << (usize::BITS / 2)) - 1;
        assert_eq!(side_length(usize::MAX), max_side);
        assert_eq!(side_length(max_side * max_side), max_side);
        assert_eq!(side_length(max_side * max_side - 1), max_side - 1);
    }

    #[test]
    fn test_exact_counts() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mix = PopulationMix::new(vec![(Color::Red, 0.3), (Color::Blue, 0.3)]).unwrap();

        let grid = initialize_grid(100, &mix, &mut rng).unwrap();
        assert_eq!(grid.size(), 10);

        let census = grid.census();
        assert_eq!(census.count(&Color::Red), 30);
        assert_eq!(census.count(&Color::Blue), 30);
        assert_eq!(census.empty, 40);
    }

    #[test]
    fn test_counts_tolerate_float_error() {
        let mix = PopulationMix::new(vec![(Color::Red, 0.29), (Color::Blue, 0.7)]).unwrap();
        let counts = agent_counts(100, &mix);
        assert_eq!(counts, vec![(Color::Red, 29), (Color::Blue, 70)]);
    }

    #[test]
    fn test_three_kinds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mix = PopulationMix::new(vec![
            (Color::Red, 0.2),
            (Color::Blue, 0.2),
            (Color::Green, 0.1),
        ])
        .unwrap();

        let grid = initialize_grid(900, &mix, &mut rng).unwrap();
        let census = grid.census();
        assert_eq!(census.count(&Color::Red), 180);
        assert_eq!(census.count(&Color::Blue), 180);
        assert_eq!(census.count(&Color::Green), 90);
        assert_eq!(census.empty, 450);
    }

    #[test]
    fn test_non_square_cell_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mix = PopulationMix::new(vec![(Color::Red, 0.5)]).unwrap();

        // side 3, 5 agents, 4 empty
        let grid = initialize_grid(10, &mix, &mut rng).unwrap();
        assert_eq!(grid.size(), 3);
        let census = grid.census();
        assert_eq!(census.count(&Color::Red), 5);
        assert_eq!(census.empty, 4);
    }

    #[test]
    fn test_agents_exceeding_area() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mix = PopulationMix::new(vec![(Color::Red, 0.5), (Color::Blue, 0.5)]).unwrap();

        // side 3 holds 9 cells but 10 agents are requested
        let result = initialize_grid(10, &mix, &mut rng);
        assert!(matches!(result, Err(Error::InvalidDimension(_))));
    }

    #[test]
    fn test_empty_grid_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mix = PopulationMix::new(vec![(Color::Red, 0.5)]).unwrap();
        assert!(initialize_grid(0, &mix, &mut rng).is_err());
    }

    #[test]
    fn test_single_agent_lands_anywhere_equally() {
        const TRIALS: u64 = 4000;
        let mix = PopulationMix::new(vec![(Color::Red, 0.25)]).unwrap();

        let mut hits = [0u32; 4];
        for seed in 0..TRIALS {
            let grid = initialize_grid(4, &mix, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
            let cell = grid
                .iter()
                .position(|(_, occupant)| !occupant.is_empty())
                .unwrap();
            hits[cell] += 1;
        }

        // 1000 expected per cell, standard deviation about 27
        for count in hits {
            assert!((850..=1150).contains(&count), "skewed placement: {:?}", hits);
        }
    }

    #[test]
    fn test_every_arrangement_equally_likely() {
        const TRIALS: u64 = 6000;
        let mix = PopulationMix::new(vec![(Color::Red, 0.25), (Color::Blue, 0.25)]).unwrap();

        // (red cell, blue cell): 12 ordered arrangements on a 2x2 grid
        let mut hits: HashMap<(usize, usize), u32> = HashMap::new();
        for seed in 0..TRIALS {
            let grid = initialize_grid(4, &mix, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
            let cell_of = |kind: Color| {
                grid.iter()
                    .position(|(_, occupant)| occupant.kind() == Some(&kind))
                    .unwrap()
            };
            *hits.entry((cell_of(Color::Red), cell_of(Color::Blue))).or_insert(0) += 1;
        }

        assert_eq!(hits.len(), 12);
        // 500 expected per arrangement, standard deviation about 21
        for (arrangement, count) in &hits {
            assert!(
                (380..=620).contains(count),
                "arrangement {:?} drawn {} times",
                arrangement,
                count
            );
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mix = PopulationMix::new(vec![(Color::Red, 0.25), (Color::Blue, 0.25)]).unwrap();

        let a = initialize_grid(400, &mix, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        let b = initialize_grid(400, &mix, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        let c = initialize_grid(400, &mix, &mut ChaCha8Rng::seed_from_u64(4)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
