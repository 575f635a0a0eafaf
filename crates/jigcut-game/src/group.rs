//! Free-form assembly: pieces connect to each other instead of to board cells.

use std::collections::BTreeMap;

use jigcut_core::{Connections, Direction, PieceId, Point, Size};
use jigcut_generator::{Layout, Piece};

use crate::{GameError, GameEvent, GroupConfig, PositionStore, union_find::UnionFind};

/// A set of pieces joined by adjacency snaps, moved as a rigid unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedGroup {
    reference: PieceId,
    offsets: BTreeMap<PieceId, Point>,
}

impl ConnectedGroup {
    /// The member with the smallest id; offsets are relative to it.
    #[must_use]
    pub fn reference(&self) -> PieceId {
        self.reference
    }

    /// Number of member pieces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Always `false`: a group holds at least its reference piece.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns `true` if `id` is a member.
    #[must_use]
    pub fn contains(&self, id: PieceId) -> bool {
        self.offsets.contains_key(&id)
    }

    /// Member ids in ascending order.
    pub fn pieces(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.offsets.keys().copied()
    }

    /// Offset of a member's top-left from the reference piece's top-left.
    #[must_use]
    pub fn offset(&self, id: PieceId) -> Option<Point> {
        self.offsets.get(&id).copied()
    }
}

/// A play session where neighbors snap together wherever they are on the board.
///
/// Two pieces connect when they are grid neighbors, their facing edges are closer than
/// [`GroupConfig::connection_threshold`], and they are offset across the edge by less
/// than [`GroupConfig::alignment_threshold`]. Connected pieces form a group: dragging
/// any member moves the whole group, and groups never split. The puzzle is solved when a
/// single group holds every piece.
///
/// # Examples
///
/// ```
/// use image::RgbaImage;
/// use jigcut_core::{CutLines, PieceId, Point, Size};
/// use jigcut_game::GroupBoard;
/// use jigcut_generator::{Layout, decompose};
///
/// let lines = CutLines::from_unvalidated(&[], &[100.0]);
/// let decomposition = decompose(&RgbaImage::new(200, 100), &lines);
/// let layout = Layout::from([
///     (PieceId::new(0), Point::new(10.0, 10.0)),
///     (PieceId::new(1), Point::new(500.0, 300.0)),
/// ]);
/// let mut board = GroupBoard::new(decomposition.pieces(), Size::new(200.0, 100.0), &layout)?;
///
/// // Drop piece 1 just right of piece 0.
/// board.drag(PieceId::new(1), Point::new(115.0, 14.0))?;
/// assert_eq!(board.drop_piece(PieceId::new(1))?, 1);
/// assert_eq!(board.position(PieceId::new(1)), Some(Point::new(110.0, 10.0)));
/// assert!(board.is_solved());
/// # Ok::<(), jigcut_game::GameError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GroupBoard {
    sizes: Vec<Size>,
    connections: Vec<Connections>,
    positions: PositionStore,
    groups: UnionFind,
    config: GroupConfig,
    solved: bool,
    events: Vec<GameEvent>,
}

impl GroupBoard {
    /// Creates a board with every piece in its own group.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoPieces`] for an empty puzzle, [`GameError::PieceOrder`] if
    /// `pieces` are not in id order, and [`GameError::MissingPosition`] if `layout` lacks
    /// a piece.
    pub fn new(pieces: &[Piece], board: Size, layout: &Layout) -> Result<Self, GameError> {
        Self::with_config(pieces, board, layout, GroupConfig::default())
    }

    /// Creates a board with explicit thresholds.
    ///
    /// # Errors
    ///
    /// Same as [`GroupBoard::new`].
    pub fn with_config(
        pieces: &[Piece],
        board: Size,
        layout: &Layout,
        config: GroupConfig,
    ) -> Result<Self, GameError> {
        if pieces.is_empty() {
            return Err(GameError::NoPieces);
        }
        let mut positions = PositionStore::new(board);
        for (index, piece) in pieces.iter().enumerate() {
            let id = piece.id();
            if id.index() != index {
                return Err(GameError::PieceOrder { index, id });
            }
            let pos = layout.get(&id).ok_or(GameError::MissingPosition { id })?;
            positions.set(id, *pos);
        }
        Ok(Self {
            sizes: pieces.iter().map(|p| p.display_size(board)).collect(),
            connections: pieces.iter().map(|p| *p.connections()).collect(),
            positions,
            groups: UnionFind::new(pieces.len()),
            config,
            solved: false,
            events: Vec::new(),
        })
    }

    /// All current positions.
    #[must_use]
    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    /// Current position of one piece.
    #[must_use]
    pub fn position(&self, id: PieceId) -> Option<Point> {
        self.positions.get(id)
    }

    /// Moves `id` to `to`, carrying its whole group along by the same delta.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPiece`] if `id` is not part of this puzzle.
    pub fn drag(&mut self, id: PieceId, to: Point) -> Result<(), GameError> {
        let from = self.position(id).ok_or(GameError::UnknownPiece { id })?;
        self.translate_group(id, to.x - from.x, to.y - from.y);
        Ok(())
    }

    /// Connects the group of a dropped piece to every aligned neighbor.
    ///
    /// The dropped group first snaps onto the neighbor it aligns with. Further aligned
    /// neighbors, including ones that only line up after that snap, are pulled onto the
    /// grown group. Returns the number of joins.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPiece`] if `id` is not part of this puzzle.
    pub fn drop_piece(&mut self, id: PieceId) -> Result<usize, GameError> {
        if id.index() >= self.sizes.len() {
            return Err(GameError::UnknownPiece { id });
        }

        let mut joins = 0;
        while let Some((member, neighbor, dx, dy)) = self.find_aligned_neighbor(id) {
            if joins == 0 {
                self.translate_group(member, -dx, -dy);
            } else {
                self.translate_group(neighbor, dx, dy);
            }
            self.groups.union(member.index(), neighbor.index());
            joins += 1;
        }

        if joins > 0 {
            let size = self.groups.size_of(id.index());
            log::debug!("piece {id} joined {joins} neighbor(s); group has {size} pieces");
            self.events.push(GameEvent::GroupsJoined { id, size });
            if !self.solved && size == self.sizes.len() {
                self.solved = true;
                self.events.push(GameEvent::Solved);
                log::info!("puzzle solved");
            }
        }
        Ok(joins)
    }

    /// The group containing `id`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPiece`] if `id` is not part of this puzzle.
    pub fn group_of(&self, id: PieceId) -> Result<ConnectedGroup, GameError> {
        let reference_pos = self.position(id).ok_or(GameError::UnknownPiece { id })?;
        let members = self.members(id);
        let reference = members.first().copied().unwrap_or(id);
        let origin = self.position(reference).unwrap_or(reference_pos);
        let offsets = members
            .into_iter()
            .filter_map(|m| {
                let p = self.position(m)?;
                Some((m, Point::new(p.x - origin.x, p.y - origin.y)))
            })
            .collect();
        Ok(ConnectedGroup { reference, offsets })
    }

    /// Every group, ordered by reference piece.
    #[must_use]
    pub fn groups(&self) -> Vec<ConnectedGroup> {
        (0..self.sizes.len())
            .filter(|&i| self.members(PieceId::new(i)).first() == Some(&PieceId::new(i)))
            .filter_map(|i| self.group_of(PieceId::new(i)).ok())
            .collect()
    }

    /// Number of groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        (0..self.sizes.len())
            .filter(|&i| self.groups.find(i) == i)
            .count()
    }

    /// Returns `true` once a single group holds every piece.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Drains the queued events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn members(&self, id: PieceId) -> Vec<PieceId> {
        (0..self.sizes.len())
            .filter(|&i| self.groups.same(i, id.index()))
            .map(PieceId::new)
            .collect()
    }

    fn translate_group(&mut self, id: PieceId, dx: f64, dy: f64) {
        for member in self.members(id) {
            if let Some(p) = self.positions.get(member) {
                self.positions.set(member, p.offset(dx, dy));
            }
        }
    }

    /// Finds a member of `id`'s group with a neighbor in another group that lines up.
    ///
    /// Returns the member, the neighbor, and the correction that would move the
    /// neighbor exactly into place.
    fn find_aligned_neighbor(&self, id: PieceId) -> Option<(PieceId, PieceId, f64, f64)> {
        self.members(id).into_iter().find_map(|member| {
            self.connections[member.index()]
                .iter()
                .filter(|(_, neighbor)| !self.groups.same(member.index(), neighbor.index()))
                .find_map(|(dir, neighbor)| {
                    self.alignment(member, neighbor, dir)
                        .map(|(dx, dy)| (member, neighbor, dx, dy))
                })
        })
    }

    fn alignment(&self, member: PieceId, neighbor: PieceId, dir: Direction) -> Option<(f64, f64)> {
        let pm = self.position(member)?;
        let pn = self.position(neighbor)?;
        let sm = self.sizes[member.index()];
        let sn = self.sizes[neighbor.index()];
        let target = match dir {
            Direction::Right => Point::new(pm.x + sm.width, pm.y),
            Direction::Left => Point::new(pm.x - sn.width, pm.y),
            Direction::Bottom => Point::new(pm.x, pm.y + sm.height),
            Direction::Top => Point::new(pm.x, pm.y - sn.height),
        };
        let dx = target.x - pn.x;
        let dy = target.y - pn.y;
        let (along, across) = match dir {
            Direction::Left | Direction::Right => (dx, dy),
            Direction::Top | Direction::Bottom => (dy, dx),
        };
        (along.abs() < self.config.connection_threshold
            && across.abs() < self.config.alignment_threshold)
            .then_some((dx, dy))
    }
}

#[cfg(test)]
mod tests {
    use image::RgbaImage;
    use jigcut_core::CutLines;
    use jigcut_generator::decompose;

    use super::*;

    /// 2x2 pieces of 100x100 on a 200x200 board.
    fn board(layout: &[(f64, f64)]) -> GroupBoard {
        let decomposition = decompose(
            &RgbaImage::new(200, 200),
            &CutLines::from_unvalidated(&[100.0], &[100.0]),
        );
        let layout = layout
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| (PieceId::new(i), Point::new(x, y)))
            .collect::<Layout>();
        GroupBoard::new(decomposition.pieces(), Size::new(200.0, 200.0), &layout).unwrap()
    }

    const SCATTERED: [(f64, f64); 4] = [(0.0, 0.0), (400.0, 0.0), (0.0, 400.0), (400.0, 400.0)];

    #[test]
    fn misaligned_neighbors_do_not_connect() {
        let mut board = board(&SCATTERED);
        // 15 px too low across the edge.
        board.drag(PieceId::new(1), Point::new(100.0, 15.0)).unwrap();
        assert_eq!(board.drop_piece(PieceId::new(1)).unwrap(), 0);
        // 25 px gap along the edge.
        board.drag(PieceId::new(1), Point::new(125.0, 0.0)).unwrap();
        assert_eq!(board.drop_piece(PieceId::new(1)).unwrap(), 0);
        assert_eq!(board.group_count(), 4);
        assert!(board.take_events().is_empty());
    }

    #[test]
    fn non_neighbors_never_connect() {
        let mut board = board(&SCATTERED);
        // Piece 3 placed where piece 1 belongs: edge-adjacent to 0 but not its neighbor.
        board.drag(PieceId::new(3), Point::new(100.0, 0.0)).unwrap();
        assert_eq!(board.drop_piece(PieceId::new(3)).unwrap(), 0);
    }

    #[test]
    fn dragging_moves_the_whole_group() {
        let mut board = board(&SCATTERED);
        board.drag(PieceId::new(2), Point::new(3.0, 105.0)).unwrap();
        assert_eq!(board.drop_piece(PieceId::new(2)).unwrap(), 1);
        assert_eq!(board.position(PieceId::new(2)), Some(Point::new(0.0, 100.0)));

        board.drag(PieceId::new(2), Point::new(50.0, 150.0)).unwrap();
        assert_eq!(board.position(PieceId::new(0)), Some(Point::new(50.0, 50.0)));

        let group = board.group_of(PieceId::new(0)).unwrap();
        assert_eq!(group.reference(), PieceId::new(0));
        assert_eq!(group.offset(PieceId::new(2)), Some(Point::new(0.0, 100.0)));
        assert_eq!(board.groups().len(), 3);
    }

    #[test]
    fn cascade_joins_and_solves_once() {
        let mut board = board(&SCATTERED);
        board.drag(PieceId::new(1), Point::new(102.0, 0.0)).unwrap();
        assert_eq!(board.drop_piece(PieceId::new(1)).unwrap(), 1);
        assert_eq!(board.position(PieceId::new(1)), Some(Point::new(100.0, 0.0)));
        // Lines up under piece 1 but is never dropped.
        board.drag(PieceId::new(3), Point::new(100.0, 100.0)).unwrap();
        assert_eq!(board.group_count(), 3);
        board.take_events();

        // Piece 2 snaps under piece 0, and piece 3 then joins through piece 1.
        board.drag(PieceId::new(2), Point::new(3.0, 105.0)).unwrap();
        assert_eq!(board.drop_piece(PieceId::new(2)).unwrap(), 2);
        assert!(board.is_solved());
        assert_eq!(board.group_count(), 1);
        assert_eq!(board.position(PieceId::new(2)), Some(Point::new(0.0, 100.0)));
        assert_eq!(board.position(PieceId::new(3)), Some(Point::new(100.0, 100.0)));

        let events = board.take_events();
        assert_eq!(
            events,
            vec![
                GameEvent::GroupsJoined {
                    id: PieceId::new(2),
                    size: 4
                },
                GameEvent::Solved
            ]
        );
        board.drop_piece(PieceId::new(2)).unwrap();
        assert!(board.take_events().is_empty());
    }

    #[test]
    fn unknown_piece_is_rejected() {
        let mut board = board(&SCATTERED);
        let id = PieceId::new(9);
        assert_eq!(board.drag(id, Point::ORIGIN), Err(GameError::UnknownPiece { id }));
        assert_eq!(board.drop_piece(id), Err(GameError::UnknownPiece { id }));
    }
}
