use log::warn;
use rand::Rng;

use crate::grid::{Grid, Position};
use crate::snake::Snake;

/// Food entity currently on the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Food {
    pub position: Position,
}

impl Food {
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self { position }
    }

    /// Places food on a cell the snake does not occupy.
    ///
    /// Returns `None` only when the snake covers the whole grid.
    #[must_use]
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, grid: Grid, snake: &Snake) -> Option<Self> {
        spawn_position(rng, grid, snake).map(Self::new)
    }
}

/// Picks a free cell: random probes first, bounded by the number of free
/// cells, then a uniform pick from an exhaustive scan.
#[must_use]
pub fn spawn_position<R: Rng + ?Sized>(rng: &mut R, grid: Grid, snake: &Snake) -> Option<Position> {
    let free_cells = grid.total_cells().saturating_sub(snake.len());

    for _ in 0..free_cells {
        let candidate = Position {
            x: rng.gen_range(0..i32::from(grid.width)),
            y: rng.gen_range(0..i32::from(grid.height)),
        };
        if !snake.occupies(candidate) {
            return Some(candidate);
        }
    }

    let mut candidates = Vec::new();
    for y in 0..i32::from(grid.height) {
        for x in 0..i32::from(grid.width) {
            let position = Position { x, y };
            if !snake.occupies(position) {
                candidates.push(position);
            }
        }
    }

    if candidates.is_empty() {
        return None;
    }

    warn!(
        "random food probes exhausted on {}x{} grid, falling back to scan of {} free cells",
        grid.width,
        grid.height,
        candidates.len()
    );
    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index])
}
