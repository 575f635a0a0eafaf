use std::collections::BTreeMap;

use jigcut_core::{PieceId, Point, Size};
use jigcut_generator::Layout;
use serde::{Deserialize, Serialize};

/// The live position of every piece in a play session, in display space.
///
/// The store remembers the board size its positions refer to, so saved positions can
/// be restored onto a board of a different size. Callers read positions freely; only
/// the session mutates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionStore {
    board: Size,
    positions: BTreeMap<PieceId, Point>,
}

impl PositionStore {
    pub(crate) fn new(board: Size) -> Self {
        Self {
            board,
            positions: BTreeMap::new(),
        }
    }

    /// Board size the positions are expressed against.
    #[must_use]
    pub fn board(&self) -> Size {
        self.board
    }

    /// Position of one piece.
    #[must_use]
    pub fn get(&self, id: PieceId) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    /// Number of stored positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if no position is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterates over the positions in id order.
    pub fn iter(&self) -> impl Iterator<Item = (PieceId, Point)> + '_ {
        self.positions.iter().map(|(id, p)| (*id, *p))
    }

    pub(crate) fn set(&mut self, id: PieceId, pos: Point) {
        self.positions.insert(id, pos);
    }

    pub(crate) fn apply(&mut self, layout: &Layout) {
        self.positions
            .extend(layout.iter().map(|(id, pos)| (*id, *pos)));
    }

    /// Rescales every position proportionally onto `board`.
    pub(crate) fn rescale(&mut self, board: Size) {
        let sx = ratio(board.width, self.board.width);
        let sy = ratio(board.height, self.board.height);
        for pos in self.positions.values_mut() {
            *pos = Point::new(pos.x * sx, pos.y * sy);
        }
        self.board = board;
    }
}

pub(crate) fn rescale_layout(layout: &mut Layout, from: Size, to: Size) {
    let sx = ratio(to.width, from.width);
    let sy = ratio(to.height, from.height);
    for pos in layout.values_mut() {
        *pos = Point::new(pos.x * sx, pos.y * sy);
    }
}

fn ratio(to: f64, from: f64) -> f64 {
    if from > 0.0 { to / from } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_is_proportional() {
        let mut store = PositionStore::new(Size::new(400.0, 300.0));
        store.set(PieceId::new(0), Point::new(100.0, 150.0));
        store.rescale(Size::new(800.0, 600.0));
        assert_eq!(store.get(PieceId::new(0)), Some(Point::new(200.0, 300.0)));
        assert_eq!(store.board(), Size::new(800.0, 600.0));
    }

    #[test]
    fn serializes_with_board() {
        let mut store = PositionStore::new(Size::new(10.0, 20.0));
        store.set(PieceId::new(3), Point::new(1.5, 2.0));
        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(
            json,
            r#"{"board":{"width":10.0,"height":20.0},"positions":{"3":{"x":1.5,"y":2.0}}}"#
        );
        let back = serde_json::from_str::<PositionStore>(&json).unwrap();
        assert_eq!(back, store);
    }
}
