use jigcut_core::PieceId;

/// One-shot notifications produced by a play session.
///
/// Events are queued by the session and drained by the UI shell, which turns them into
/// feedback such as sounds or messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameEvent {
    /// A piece moved from a wrong position onto its correct position.
    PieceSnapped {
        /// The snapped piece.
        id: PieceId,
    },
    /// Two groups of pieces were joined.
    GroupsJoined {
        /// The dropped piece that caused the join.
        id: PieceId,
        /// Size of the resulting group.
        size: usize,
    },
    /// The puzzle became solved. Emitted once per shuffle.
    Solved,
}
