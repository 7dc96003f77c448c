//! Per-tick feature record consumed by predictors: toroidal distances from
//! the cells around the head to the food, the heading and the score.

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Position};
use crate::input::Direction;

/// Shortest Manhattan distance between two cells on the torus.
///
/// Each axis independently takes the direct or the wrapped way round,
/// whichever is shorter.
#[must_use]
pub fn toroidal_distance(a: Position, b: Position, grid: Grid) -> u32 {
    axis_distance(a.x, b.x, grid.width) + axis_distance(a.y, b.y, grid.height)
}

fn axis_distance(a: i32, b: i32, axis_len: u16) -> u32 {
    let direct = a.abs_diff(b);
    direct.min(u32::from(axis_len) - direct)
}

/// Distance to the food after one step in each direction.
///
/// The entry for the reversal of the heading is always `None`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Distances {
    pub up: Option<u32>,
    pub down: Option<u32>,
    pub left: Option<u32>,
    pub right: Option<u32>,
}

impl Distances {
    /// Measures from the head's neighbour in each allowed direction.
    #[must_use]
    pub fn compute(head: Position, food: Position, heading: Direction, grid: Grid) -> Self {
        let mut distances = Self::default();
        for direction in Direction::ALL {
            if direction == heading.opposite() {
                continue;
            }
            let neighbour = grid.step(head, direction);
            *distances.slot_mut(direction) = Some(toroidal_distance(neighbour, food, grid));
        }
        distances
    }

    #[must_use]
    pub fn get(&self, direction: Direction) -> Option<u32> {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Iterates `(direction, distance)` for the present entries in
    /// Up, Down, Left, Right order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, u32)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| self.get(direction).map(|distance| (direction, distance)))
    }

    fn slot_mut(&mut self, direction: Direction) -> &mut Option<u32> {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }
}

/// Feature record emitted after every committed tick.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub distances: Distances,
    pub heading: Direction,
    pub score: u32,
}

impl Features {
    /// Min-max scales `[up, down, left, right]` into `0.0..=1.0`, missing
    /// entries counting as zero. A flat vector scales to all zeros.
    #[must_use]
    pub fn normalized(&self) -> [f32; 4] {
        let raw = Direction::ALL.map(|direction| self.distances.get(direction).unwrap_or(0) as f32);

        let min = raw.iter().copied().fold(f32::INFINITY, f32::min);
        let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let span = max - min;
        if span <= f32::EPSILON {
            return [0.0; 4];
        }

        raw.map(|value| (value - min) / span)
    }
}
