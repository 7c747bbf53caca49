//! Text frames of the grid.

use schelling_core::Occupant;
use schelling_world::Grid;
use std::collections::HashMap;
use std::fmt::Write;

const EMPTY_GLYPH: char = '.';

/// Glyph for a kind: the configured one, else the kind's first letter
/// upper-cased, else `?`
fn glyph_for(kind: &str, glyphs: &HashMap<String, char>) -> char {
    glyphs
        .get(kind)
        .copied()
        .or_else(|| kind.chars().next().map(|c| c.to_ascii_uppercase()))
        .unwrap_or('?')
}

/// One line per grid row, one glyph per cell
pub fn render_grid(grid: &Grid<String>, glyphs: &HashMap<String, char>) -> String {
    let mut frame = String::with_capacity(grid.size() * (grid.size() + 1));

    for row in grid.rows() {
        for occupant in row {
            frame.push(match occupant {
                Occupant::Empty => EMPTY_GLYPH,
                Occupant::Agent(kind) => glyph_for(kind, glyphs),
            });
        }
        frame.push('\n');
    }

    frame
}

/// Grid frame followed by a status line
pub fn render_frame(
    grid: &Grid<String>,
    glyphs: &HashMap<String, char>,
    tick: u64,
    ratio: Option<f64>,
) -> String {
    let mut frame = render_grid(grid, glyphs);
    match ratio {
        Some(ratio) => {
            let _ = writeln!(frame, "tick {} ratio {:.4}", tick, ratio);
        }
        None => {
            let _ = writeln!(frame, "tick {}", tick);
        }
    }
    frame
}
