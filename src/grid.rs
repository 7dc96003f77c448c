use serde::{Deserialize, Serialize};

use crate::input::Direction;

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true when the position lies inside the grid.
    #[must_use]
    pub fn is_within(self, grid: Grid) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(grid.width)
            && self.y < i32::from(grid.height)
    }
}

/// Fixed-size toroidal play field.
///
/// Movement off one edge re-enters on the opposite edge, so every
/// position produced by [`Grid::step`] is inside the grid.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Grid {
    pub width: u16,
    pub height: u16,
    pub start: Position,
}

impl Grid {
    /// Creates a grid whose start cell is the centre.
    ///
    /// # Panics
    ///
    /// Panics when either dimension is zero.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_start(
            width,
            height,
            Position::new(i32::from(width / 2), i32::from(height / 2)),
        )
    }

    /// Creates a grid with an explicit start cell.
    ///
    /// # Panics
    ///
    /// Panics when either dimension is zero or `start` lies outside.
    #[must_use]
    pub fn with_start(width: u16, height: u16, start: Position) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");
        let grid = Self {
            width,
            height,
            start,
        };
        assert!(start.is_within(grid), "start {start:?} lies outside the grid");
        grid
    }

    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Returns the wrapped neighbour of `position` one cell along `direction`.
    #[must_use]
    pub fn step(self, position: Position, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position {
            x: wrap(position.x + dx, i32::from(self.width)),
            y: wrap(position.y + dy, i32::from(self.height)),
        }
    }
}

/// Folds a coordinate that stepped one cell past either edge back onto the axis.
///
/// Only `-1` and `axis_len` are ever produced by a unit step; anything else
/// is returned unchanged.
#[must_use]
pub fn wrap(coordinate: i32, axis_len: i32) -> i32 {
    debug_assert!(
        (-1..=axis_len).contains(&coordinate),
        "wrap expects a unit step, got {coordinate} on axis of {axis_len}"
    );

    if coordinate == -1 {
        axis_len - 1
    } else if coordinate == axis_len {
        0
    } else {
        coordinate
    }
}

/// Normalises an axis delta to its minimal signed toroidal equivalent.
///
/// A delta of `axis_len - 1` becomes `-1`; ties (exactly half the axis)
/// keep the positive sign.
#[must_use]
pub fn shortest_delta(delta: i32, axis_len: i32) -> i32 {
    let folded = delta.rem_euclid(axis_len);
    if folded * 2 > axis_len {
        folded - axis_len
    } else {
        folded
    }
}
