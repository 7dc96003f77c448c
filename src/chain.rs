use thiserror::Error;

use crate::grid::{Grid, Position, shortest_delta};
use crate::input::Direction;

/// Stable handle to a segment inside a [`SegmentChain`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SegmentId(usize);

/// Place of a segment within the chain.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Role {
    Head,
    Body,
    Tail,
    /// A length-1 chain: the only segment is both head and tail.
    Single,
}

/// Directions of the two links touching a segment.
///
/// `incoming` points from the successor into this segment (the way the
/// body travels into the cell); `outgoing` points from this segment to its
/// predecessor. The head has no `outgoing`, the tail no `incoming`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct SegmentDirections {
    pub incoming: Option<Direction>,
    pub outgoing: Option<Direction>,
}

/// Read-only view of one segment, as handed to renderers.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SegmentView {
    pub position: Position,
    pub role: Role,
    pub directions: SegmentDirections,
    pub fresh: bool,
}

/// Chain corruption detected by [`SegmentChain::check_invariants`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum ChainError {
    #[error("expected exactly one head, found {0}")]
    HeadCount(usize),
    #[error("expected exactly one tail, found {0}")]
    TailCount(usize),
    #[error("segment {0} is not linked back from its successor")]
    BrokenLink(usize),
    #[error("walk from head visited {visited} of {len} segments")]
    Unreachable { visited: usize, len: usize },
}

#[derive(Debug, Clone)]
struct Segment {
    position: Position,
    prev: Option<SegmentId>,
    next: Option<SegmentId>,
    fresh: bool,
}

/// Doubly-linked head-to-tail sequence of snake segments.
///
/// Segments live in an arena and link to each other by index, so the
/// chain never owns itself cyclically. Roles and link directions are
/// derived on demand from the links and positions.
#[derive(Debug, Clone)]
pub struct SegmentChain {
    segments: Vec<Segment>,
    head: SegmentId,
    tail: SegmentId,
}

impl SegmentChain {
    /// Creates a one-segment chain at `position`.
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self {
            segments: vec![Segment {
                position,
                prev: None,
                next: None,
                fresh: false,
            }],
            head: SegmentId(0),
            tail: SegmentId(0),
        }
    }

    /// Builds a chain from explicit positions, head first.
    ///
    /// # Panics
    ///
    /// Panics when `positions` is empty.
    #[must_use]
    pub fn from_positions(positions: &[Position]) -> Self {
        let (&first, rest) = positions
            .split_first()
            .expect("a segment chain needs at least one position");

        let mut chain = Self::new(first);
        for &position in rest {
            chain.attach_after(chain.tail, position);
        }
        chain.clear_fresh();
        chain
    }

    #[must_use]
    pub fn head(&self) -> SegmentId {
        self.head
    }

    #[must_use]
    pub fn tail(&self) -> SegmentId {
        self.tail
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; a chain holds at least one segment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn position(&self, id: SegmentId) -> Position {
        self.segment(id).position
    }

    #[must_use]
    pub fn prev(&self, id: SegmentId) -> Option<SegmentId> {
        self.segment(id).prev
    }

    #[must_use]
    pub fn next(&self, id: SegmentId) -> Option<SegmentId> {
        self.segment(id).next
    }

    /// True for a segment attached since the last position update.
    #[must_use]
    pub fn is_fresh(&self, id: SegmentId) -> bool {
        self.segment(id).fresh
    }

    /// Moves segment `id` to `position`, each successor adopting the old
    /// position of the segment in front of it.
    pub fn set_position(&mut self, id: SegmentId, position: Position) {
        let mut carried = position;
        let mut cursor = Some(id);

        while let Some(SegmentId(index)) = cursor {
            let segment = &mut self.segments[index];
            carried = std::mem::replace(&mut segment.position, carried);
            segment.fresh = false;
            cursor = segment.next;
        }
    }

    /// Appends a new segment at `position` after the current tail.
    ///
    /// # Panics
    ///
    /// Panics when `tail` is not the chain's tail; splicing into the middle
    /// would break the single-tail invariant.
    pub fn attach_after(&mut self, tail: SegmentId, position: Position) -> SegmentId {
        assert_eq!(
            tail, self.tail,
            "segments can only be attached after the tail"
        );

        let id = SegmentId(self.segments.len());
        self.segments.push(Segment {
            position,
            prev: Some(tail),
            next: None,
            fresh: true,
        });
        self.segments[tail.0].next = Some(id);
        self.tail = id;
        id
    }

    /// Returns the derived role of segment `id`.
    #[must_use]
    pub fn role(&self, id: SegmentId) -> Role {
        let segment = self.segment(id);
        match (segment.prev, segment.next) {
            (None, None) => Role::Single,
            (None, Some(_)) => Role::Head,
            (Some(_), None) => Role::Tail,
            (Some(_), Some(_)) => Role::Body,
        }
    }

    /// Returns the derived link directions of segment `id`.
    #[must_use]
    pub fn directions(&self, id: SegmentId, grid: Grid) -> SegmentDirections {
        let segment = self.segment(id);
        SegmentDirections {
            incoming: segment
                .next
                .and_then(|next| direction_between(self.position(next), segment.position, grid)),
            outgoing: segment
                .prev
                .and_then(|prev| direction_between(segment.position, self.position(prev), grid)),
        }
    }

    /// Iterates segment ids from head to tail.
    pub fn ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        std::iter::successors(Some(self.head), |&id| self.next(id))
    }

    /// Iterates positions from head to tail.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.ids().map(|id| self.position(id))
    }

    /// Returns a view of every segment from head to tail.
    #[must_use]
    pub fn views(&self, grid: Grid) -> Vec<SegmentView> {
        self.ids()
            .map(|id| SegmentView {
                position: self.position(id),
                role: self.role(id),
                directions: self.directions(id, grid),
                fresh: self.is_fresh(id),
            })
            .collect()
    }

    /// Verifies single head, single tail, consistent back links and that
    /// the walk from the head reaches every segment without looping.
    pub fn check_invariants(&self) -> Result<(), ChainError> {
        let heads = self.segments.iter().filter(|s| s.prev.is_none()).count();
        if heads != 1 {
            return Err(ChainError::HeadCount(heads));
        }
        let tails = self.segments.iter().filter(|s| s.next.is_none()).count();
        if tails != 1 {
            return Err(ChainError::TailCount(tails));
        }

        for (index, segment) in self.segments.iter().enumerate() {
            if let Some(next) = segment.next {
                if self.segment(next).prev != Some(SegmentId(index)) {
                    return Err(ChainError::BrokenLink(index));
                }
            }
        }

        let mut visited = 0;
        let mut cursor = Some(self.head);
        while let Some(id) = cursor {
            visited += 1;
            if visited > self.len() {
                break;
            }
            cursor = self.next(id);
        }
        if visited != self.len() {
            return Err(ChainError::Unreachable {
                visited,
                len: self.len(),
            });
        }

        Ok(())
    }

    fn clear_fresh(&mut self) {
        for segment in &mut self.segments {
            segment.fresh = false;
        }
    }

    fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id.0]
    }
}

/// Direction of the unit step from `from` to `to` on the torus.
///
/// Each axis delta is folded to its shortest wrapped equivalent first, so
/// `(10, 3) -> (0, 3)` on an 11-wide grid is `Right`. Returns `None` for
/// coincident or non-adjacent cells.
#[must_use]
pub fn direction_between(from: Position, to: Position, grid: Grid) -> Option<Direction> {
    let dx = shortest_delta(to.x - from.x, i32::from(grid.width));
    let dy = shortest_delta(to.y - from.y, i32::from(grid.height));
    Direction::from_delta(dx, dy)
}

#[cfg(test)]
mod tests {
    use super::{ChainError, Role, SegmentChain, SegmentId, direction_between};
    use crate::grid::{Grid, Position};
    use crate::input::Direction;

    fn column() -> SegmentChain {
        SegmentChain::from_positions(&[
            Position::new(5, 5),
            Position::new(5, 6),
            Position::new(5, 7),
        ])
    }

    #[test]
    fn roles_follow_links() {
        let chain = column();
        let roles: Vec<Role> = chain.ids().map(|id| chain.role(id)).collect();

        assert_eq!(roles, vec![Role::Head, Role::Body, Role::Tail]);
        assert!(chain.check_invariants().is_ok());
    }

    #[test]
    fn single_segment_is_head_and_tail() {
        let chain = SegmentChain::new(Position::new(0, 0));

        assert_eq!(chain.head(), chain.tail());
        assert_eq!(chain.role(chain.head()), Role::Single);
        assert!(chain.check_invariants().is_ok());
    }

    #[test]
    fn set_position_drags_body_behind_head() {
        let mut chain = column();
        chain.set_position(chain.head(), Position::new(5, 4));

        let positions: Vec<Position> = chain.positions().collect();
        assert_eq!(
            positions,
            vec![Position::new(5, 4), Position::new(5, 5), Position::new(5, 6)]
        );
    }

    #[test]
    fn attach_advances_tail_and_marks_fresh() {
        let mut chain = column();
        let old_tail = chain.tail();
        let id = chain.attach_after(old_tail, Position::new(5, 8));

        assert_eq!(chain.tail(), id);
        assert_eq!(chain.len(), 4);
        assert_eq!(chain.role(old_tail), Role::Body);
        assert_eq!(chain.role(id), Role::Tail);
        assert!(chain.is_fresh(id));
        assert!(chain.check_invariants().is_ok());

        chain.set_position(chain.head(), Position::new(5, 4));
        assert!(!chain.is_fresh(id));
    }

    #[test]
    #[should_panic(expected = "after the tail")]
    fn attach_after_non_tail_panics() {
        let mut chain = column();
        chain.attach_after(chain.head(), Position::new(4, 5));
    }

    #[test]
    fn directions_describe_travel_through_each_cell() {
        let grid = Grid::new(11, 11);
        let chain = SegmentChain::from_positions(&[
            Position::new(5, 5),
            Position::new(5, 6),
            Position::new(6, 6),
        ]);
        let views = chain.views(grid);

        assert_eq!(views[0].directions.incoming, Some(Direction::Up));
        assert_eq!(views[0].directions.outgoing, None);
        assert_eq!(views[1].directions.incoming, Some(Direction::Left));
        assert_eq!(views[1].directions.outgoing, Some(Direction::Up));
        assert_eq!(views[2].directions.incoming, None);
        assert_eq!(views[2].directions.outgoing, Some(Direction::Left));
    }

    #[test]
    fn direction_between_is_wrap_aware() {
        let grid = Grid::new(11, 9);

        assert_eq!(
            direction_between(Position::new(10, 3), Position::new(0, 3), grid),
            Some(Direction::Right)
        );
        assert_eq!(
            direction_between(Position::new(0, 3), Position::new(10, 3), grid),
            Some(Direction::Left)
        );
        assert_eq!(
            direction_between(Position::new(4, 0), Position::new(4, 8), grid),
            Some(Direction::Up)
        );
        assert_eq!(
            direction_between(Position::new(4, 4), Position::new(4, 4), grid),
            None
        );
        assert_eq!(
            direction_between(Position::new(4, 4), Position::new(6, 4), grid),
            None
        );
    }

    #[test]
    fn corrupted_links_are_reported() {
        let mut chain = column();
        chain.segments[2].prev = None;

        assert_eq!(chain.check_invariants(), Err(ChainError::HeadCount(2)));

        let mut chain = column();
        chain.segments[2].next = Some(SegmentId(0));
        chain.segments[0].prev = Some(SegmentId(2));

        assert_eq!(chain.check_invariants(), Err(ChainError::HeadCount(0)));
    }
}
