use log::trace;

use crate::chain::{SegmentChain, SegmentId, SegmentView};
use crate::grid::{Grid, Position};
use crate::input::{Direction, direction_change_is_valid};

/// Length of a freshly reset snake.
pub const INITIAL_LENGTH: usize = 3;

/// Growth scheduling: a staged segment joins the chain on the next move.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Growth {
    Idle,
    /// Waiting for the next move; `at` is the tail cell when staged.
    Staged { at: Position },
    /// Joined the chain during the most recent move.
    Attached { segment: SegmentId },
}

/// Mutable snake state: the segment chain, heading and growth phase.
#[derive(Debug, Clone)]
pub struct Snake {
    chain: SegmentChain,
    heading: Direction,
    growth: Growth,
}

impl Snake {
    /// Builds the initial three-segment snake with its head on `grid.start`.
    ///
    /// The body hangs below the head, heading up. Grids shorter than the
    /// snake lay it out to the right of the head instead, heading left; a
    /// 2x2 grid bends it into an L with the head moving sideways. The
    /// neck never sits on an axis where it is also the cell ahead.
    ///
    /// # Panics
    ///
    /// Panics when the grid has fewer cells than [`INITIAL_LENGTH`].
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        assert!(
            grid.total_cells() >= INITIAL_LENGTH,
            "a {}x{} grid cannot hold the initial snake",
            grid.width,
            grid.height
        );

        let along = |direction| {
            let mut positions = Vec::with_capacity(INITIAL_LENGTH);
            let mut cursor = grid.start;
            for _ in 0..INITIAL_LENGTH {
                positions.push(cursor);
                cursor = grid.step(cursor, direction);
            }
            positions
        };

        if usize::from(grid.height) >= INITIAL_LENGTH {
            Self::from_segments(&along(Direction::Down), Direction::Up)
        } else if usize::from(grid.width) >= INITIAL_LENGTH {
            Self::from_segments(&along(Direction::Right), Direction::Left)
        } else {
            let neck = grid.step(grid.start, Direction::Down);
            let tail = grid.step(neck, Direction::Right);
            Self::from_segments(&[grid.start, neck, tail], Direction::Left)
        }
    }

    /// Creates a snake from explicit body segments (front is head).
    #[must_use]
    pub fn from_segments(segments: &[Position], heading: Direction) -> Self {
        Self {
            chain: SegmentChain::from_positions(segments),
            heading,
            growth: Growth::Idle,
        }
    }

    /// Rebuilds the default snake in place.
    pub fn reset(&mut self, grid: Grid) {
        *self = Self::new(grid);
    }

    /// Requests a new heading for the next move.
    ///
    /// Returns `false` and leaves the heading untouched when `direction`
    /// would send the head straight back into the second segment.
    pub fn set_heading(&mut self, direction: Direction, grid: Grid) -> bool {
        if let Some(travel) = self.travel_direction(grid) {
            if !direction_change_is_valid(travel, direction) {
                trace!("rejected heading {direction:?} while travelling {travel:?}");
                return false;
            }
        }

        self.heading = direction;
        true
    }

    pub fn move_up(&mut self, grid: Grid) -> bool {
        self.set_heading(Direction::Up, grid)
    }

    pub fn move_down(&mut self, grid: Grid) -> bool {
        self.set_heading(Direction::Down, grid)
    }

    pub fn move_left(&mut self, grid: Grid) -> bool {
        self.set_heading(Direction::Left, grid)
    }

    pub fn move_right(&mut self, grid: Grid) -> bool {
        self.set_heading(Direction::Right, grid)
    }

    /// Stages one extra segment at the current tail, attached by the next
    /// [`Snake::move_forward`].
    pub fn prepare_growth(&mut self) {
        self.growth = Growth::Staged {
            at: self.chain.position(self.chain.tail()),
        };
    }

    /// Advances the head one wrapped cell along the heading and attaches any
    /// staged growth at the tail's pre-move cell.
    pub fn move_forward(&mut self, grid: Grid) {
        let tail_before = self.chain.position(self.chain.tail());
        let next_head = self.next_head_position(grid);

        self.chain.set_position(self.chain.head(), next_head);

        self.growth = match self.growth {
            Growth::Staged { at } => {
                debug_assert_eq!(at, tail_before, "tail moved between staging and attach");
                let segment = self.chain.attach_after(self.chain.tail(), tail_before);
                Growth::Attached { segment }
            }
            Growth::Idle | Growth::Attached { .. } => Growth::Idle,
        };
    }

    /// Returns the head position for the next movement tick.
    #[must_use]
    pub fn next_head_position(&self, grid: Grid) -> Position {
        grid.step(self.head(), self.heading)
    }

    /// Direction from the second segment into the head, if there is one.
    #[must_use]
    pub fn travel_direction(&self, grid: Grid) -> Option<Direction> {
        self.chain.directions(self.chain.head(), grid).incoming
    }

    #[must_use]
    pub fn head(&self) -> Position {
        self.chain.position(self.chain.head())
    }

    #[must_use]
    pub fn tail(&self) -> Position {
        self.chain.position(self.chain.tail())
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.chain.positions().any(|segment| segment == position)
    }

    /// Returns true if the head overlaps another segment.
    ///
    /// A segment that joined during the latest move is skipped: it starts
    /// on the cell the old tail just vacated.
    #[must_use]
    pub fn head_overlaps_body(&self) -> bool {
        let head = self.head();
        self.chain
            .ids()
            .skip(1)
            .filter(|&id| !self.chain.is_fresh(id))
            .any(|id| self.chain.position(id) == head)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    #[must_use]
    pub fn heading(&self) -> Direction {
        self.heading
    }

    #[must_use]
    pub fn growth(&self) -> Growth {
        self.growth
    }

    #[must_use]
    pub fn chain(&self) -> &SegmentChain {
        &self.chain
    }

    /// Iterates body positions from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = Position> + '_ {
        self.chain.positions()
    }

    /// Returns renderer views of every segment from head to tail.
    #[must_use]
    pub fn views(&self, grid: Grid) -> Vec<SegmentView> {
        self.chain.views(grid)
    }
}
