//! Play sessions for jigcut puzzles.
//!
//! Two assembly models are provided:
//!
//! - [`Game`] is the grid-snap model. Each piece has one correct position on the board;
//!   dropping a piece near it snaps the piece into place, and the puzzle is solved when
//!   every cell holds its piece. The session tracks progress, runs the two-phase
//!   shuffle, and can be resized or resumed from saved positions.
//! - [`GroupBoard`] is the connection-group model. Pieces have no absolute target;
//!   neighbors that line up join into a [`ConnectedGroup`] that moves as one, and the
//!   puzzle is solved when a single group holds every piece.
//!
//! Both report one-shot [`GameEvent`]s for the UI shell to turn into feedback.

mod board;
mod config;
mod error;
mod event;
mod game;
mod group;
mod positions;
mod union_find;

pub use self::{
    board::expected_positions,
    config::{GameConfig, GroupConfig},
    error::GameError,
    event::GameEvent,
    game::{Game, GamePhase, MoveOutcome, ShufflePhase},
    group::{ConnectedGroup, GroupBoard},
    positions::PositionStore,
};
