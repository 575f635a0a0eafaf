//! Starting and saving play sessions against a store.

use jigcut_core::{DISPLAY_BUDGET, Size, compute_scale_factors};
use jigcut_game::{Game, GameError};
use rand::Rng;

use crate::{
    record::{Puzzle, RecordError},
    store::{PuzzleStore, StoreError},
};

/// Errors starting a play session.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SessionError {
    /// The puzzle record is unusable.
    #[display("cannot read puzzle: {_0}")]
    Record(#[from] RecordError),
    /// The store failed.
    #[display("{_0}")]
    Store(#[from] StoreError),
    /// The pieces do not form a valid game.
    #[display("cannot start game: {_0}")]
    Game(#[from] GameError),
}

/// The board a puzzle is played on by default: its image fitted into
/// [`DISPLAY_BUDGET`].
#[must_use]
pub fn default_board(puzzle: &Puzzle) -> Size {
    compute_scale_factors(puzzle.image_size(), DISPLAY_BUDGET).size
}

/// Opens a play session for `puzzle` on `board`.
///
/// Saved positions are resumed when the store has usable ones. Otherwise a fresh game
/// is created and its shuffle started, so the returned game is in
/// [`GamePhase::Shuffling`](jigcut_game::GamePhase::Shuffling) and the caller drives
/// the remaining shuffle steps.
///
/// # Errors
///
/// Returns [`SessionError`] if the record cannot be decoded, the store fails, or the
/// pieces do not form a valid game.
pub fn start_session<S, R>(
    store: &S,
    puzzle: &Puzzle,
    board: Size,
    rng: &mut R,
) -> Result<Game, SessionError>
where
    S: PuzzleStore + ?Sized,
    R: Rng + ?Sized,
{
    let (_, pieces, solution) = puzzle.to_decomposition()?.into_parts();

    if let Some(saved) = store.load_positions(&puzzle.id)? {
        match Game::resume(pieces.clone(), solution.clone(), board, saved) {
            Ok(game) => return Ok(game),
            Err(e) => log::warn!("discarding saved positions of puzzle {}: {e}", puzzle.id),
        }
    }

    let mut game = Game::new(pieces, solution, board)?;
    game.shuffle(rng);
    Ok(game)
}

/// Stores the positions of `game` for later resumption.
///
/// Nothing is written while the game is unshuffled or shuffling; returns whether the
/// positions were saved.
///
/// # Errors
///
/// Returns [`StoreError`] if the store fails.
pub fn save_session<S>(store: &mut S, puzzle_id: &str, game: &Game) -> Result<bool, StoreError>
where
    S: PuzzleStore + ?Sized,
{
    if game.phase().is_unshuffled() || game.phase().is_shuffling() {
        log::debug!("not saving puzzle {puzzle_id} during {:?}", game.phase());
        return Ok(false);
    }
    store.save_positions(puzzle_id, game.positions())?;
    Ok(true)
}
