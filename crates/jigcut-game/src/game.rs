use jigcut_core::{PieceId, Point, Size, SolutionMatrix};
use jigcut_generator::{Decomposition, Layout, Piece, ShuffleEngine};
use rand::Rng;

use crate::{
    GameConfig, GameError, GameEvent, PositionStore, board,
    positions::rescale_layout,
};

/// The step of the two-phase shuffle currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ShufflePhase {
    /// Pieces are laid out on the shuffled grid.
    Grid,
    /// Pieces have been pushed outwards.
    Spread,
}

/// Lifecycle of a play session.
///
/// ```text
/// Unshuffled --shuffle--> Shuffling(Grid) --advance--> Shuffling(Spread) --advance--> Playable
///                              ^                                                       |  ^
///                              |                                                  move |  | move
///                              +------------------- restart --- Solved <---------------+--+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GamePhase {
    /// Pieces sit at their solved positions and the shuffle has not started.
    Unshuffled,
    /// The shuffle animation is running; moves are dropped.
    Shuffling(ShufflePhase),
    /// The player is moving pieces.
    Playable,
    /// Every piece has been placed. Latched until the next shuffle.
    Solved,
}

/// What a call to [`Game::on_piece_move`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum MoveOutcome {
    /// The session is not interactive; nothing changed.
    Ignored,
    /// The piece was stored at the requested position.
    Moved,
    /// The piece was close enough to its cell and was stored exactly on it.
    Snapped {
        /// `true` if the piece was not on its cell before this move.
        newly: bool,
    },
}

/// A grid-snap play session.
///
/// The game owns the pieces, the solution matrix, and the [`PositionStore`]. Every
/// position change goes through [`on_piece_move`](Self::on_piece_move), the shuffle
/// methods, or [`resize`](Self::resize).
///
/// Positions are top-left corners in display space on a board of size
/// [`board`](Self::board). Each piece is displayed at `ratio × board`, so the board
/// should have the aspect ratio of the source image.
///
/// # Examples
///
/// ```
/// use image::RgbaImage;
/// use jigcut_core::{CutLines, PieceId, Point, Size};
/// use jigcut_game::{Game, MoveOutcome};
/// use jigcut_generator::{ShuffleSeed, decompose};
///
/// let decomposition = decompose(
///     &RgbaImage::new(300, 200),
///     &CutLines::from_unvalidated(&[100.0], &[150.0]),
/// );
/// let mut game = Game::from_decomposition(decomposition, Size::new(600.0, 400.0))?;
///
/// game.shuffle(&mut ShuffleSeed::from_label("doc").rng());
/// game.finish_shuffle();
///
/// let target = game.expected_position(PieceId::new(0))?;
/// let outcome = game.on_piece_move(PieceId::new(0), Point::new(target.x + 5.0, target.y))?;
/// assert!(outcome.is_snapped());
/// assert_eq!(game.progress(), 0.25);
/// # Ok::<(), jigcut_game::GameError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    pieces: Vec<Piece>,
    solution: SolutionMatrix,
    config: GameConfig,
    engine: ShuffleEngine,
    board: Size,
    expected: Vec<Point>,
    positions: PositionStore,
    phase: GamePhase,
    pending_spread: Option<Layout>,
    events: Vec<GameEvent>,
}

impl Game {
    /// Creates an unshuffled session with pieces at their solved positions.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoPieces`] for an empty puzzle, [`GameError::PieceOrder`] if
    /// `pieces` are not in id order, and [`GameError::InvalidSolution`] if `solution` does
    /// not place every piece exactly once.
    pub fn new(
        pieces: Vec<Piece>,
        solution: SolutionMatrix,
        board: Size,
    ) -> Result<Self, GameError> {
        Self::with_config(
            pieces,
            solution,
            board,
            GameConfig::default(),
            ShuffleEngine::default(),
        )
    }

    /// Creates a session from a decomposition.
    ///
    /// # Errors
    ///
    /// Same as [`Game::new`].
    pub fn from_decomposition(
        decomposition: Decomposition,
        board: Size,
    ) -> Result<Self, GameError> {
        let (_, pieces, solution) = decomposition.into_parts();
        Self::new(pieces, solution, board)
    }

    /// Creates a session with explicit thresholds and shuffle distances.
    ///
    /// # Errors
    ///
    /// Same as [`Game::new`].
    pub fn with_config(
        pieces: Vec<Piece>,
        solution: SolutionMatrix,
        board: Size,
        config: GameConfig,
        engine: ShuffleEngine,
    ) -> Result<Self, GameError> {
        validate(&pieces, &solution)?;
        let expected = board::expected_positions(&pieces, &solution, board);
        let mut positions = PositionStore::new(board);
        for (piece, pos) in pieces.iter().zip(&expected) {
            positions.set(piece.id(), *pos);
        }
        Ok(Self {
            pieces,
            solution,
            config,
            engine,
            board,
            expected,
            positions,
            phase: GamePhase::Unshuffled,
            pending_spread: None,
            events: Vec::new(),
        })
    }

    /// Restores a playable session from saved positions.
    ///
    /// Positions are rescaled from the board they were saved against onto `board`. A
    /// session whose pieces are all placed resumes directly in [`GamePhase::Solved`]
    /// without emitting [`GameEvent::Solved`] again.
    ///
    /// # Errors
    ///
    /// Fails like [`Game::new`], with [`GameError::MissingPosition`] if `saved` lacks a
    /// piece, or with [`GameError::UnknownPiece`] if it holds a piece that is not in the
    /// puzzle.
    pub fn resume(
        pieces: Vec<Piece>,
        solution: SolutionMatrix,
        board: Size,
        mut saved: PositionStore,
    ) -> Result<Self, GameError> {
        let mut game = Self::new(pieces, solution, board)?;
        if let Some((id, _)) = saved.iter().find(|(id, _)| game.piece(*id).is_none()) {
            return Err(GameError::UnknownPiece { id });
        }
        if let Some(piece) = game.pieces.iter().find(|p| saved.get(p.id()).is_none()) {
            return Err(GameError::MissingPosition { id: piece.id() });
        }
        saved.rescale(board);
        game.positions = saved;
        game.phase = if game.placed_count() == game.solution.cell_count() {
            GamePhase::Solved
        } else {
            GamePhase::Playable
        };
        log::info!(
            "resumed session with {}/{} pieces placed",
            game.placed_count(),
            game.pieces.len()
        );
        Ok(game)
    }

    /// The pieces, in id order.
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Looks up a piece.
    #[must_use]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index())
    }

    /// The solution matrix.
    #[must_use]
    pub fn solution(&self) -> &SolutionMatrix {
        &self.solution
    }

    /// The thresholds in use.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current board size.
    #[must_use]
    pub fn board(&self) -> Size {
        self.board
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// All current piece positions.
    #[must_use]
    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    /// Current position of one piece.
    #[must_use]
    pub fn position(&self, id: PieceId) -> Option<Point> {
        self.positions.get(id)
    }

    /// The solved top-left corner of a piece on the current board.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPiece`] if `id` is not part of this puzzle.
    pub fn expected_position(&self, id: PieceId) -> Result<Point, GameError> {
        self.expected
            .get(id.index())
            .copied()
            .ok_or(GameError::UnknownPiece { id })
    }

    /// Starts the shuffle: lays the pieces on the shuffled grid and enters
    /// [`GamePhase::Shuffling`].
    ///
    /// The shell calls [`advance_shuffle`](Self::advance_shuffle) after each
    /// [`SHUFFLE_PHASE_DELAY`](jigcut_generator::SHUFFLE_PHASE_DELAY). Clears the solved
    /// latch.
    ///
    /// Returns `false` without doing anything if a shuffle is already running.
    pub fn shuffle<R>(&mut self, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        if self.phase.is_shuffling() {
            log::debug!("shuffle requested while shuffling; ignored");
            return false;
        }
        let plan = self.engine.shuffle(self.board, &self.pieces, rng);
        self.positions.apply(&plan.grid);
        self.pending_spread = Some(plan.spread);
        self.phase = GamePhase::Shuffling(ShufflePhase::Grid);
        log::info!("shuffling {} pieces", self.pieces.len());
        true
    }

    /// Shuffles a session that has been played; identical to [`shuffle`](Self::shuffle).
    pub fn restart<R>(&mut self, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        log::info!("restarting from {:?}", self.phase);
        self.shuffle(rng)
    }

    /// Moves the shuffle to its next step and returns the new phase.
    ///
    /// Outside [`GamePhase::Shuffling`] this does nothing.
    pub fn advance_shuffle(&mut self) -> GamePhase {
        match self.phase {
            GamePhase::Shuffling(ShufflePhase::Grid) => {
                if let Some(spread) = self.pending_spread.take() {
                    self.positions.apply(&spread);
                }
                self.phase = GamePhase::Shuffling(ShufflePhase::Spread);
            }
            GamePhase::Shuffling(ShufflePhase::Spread) => {
                self.phase = GamePhase::Playable;
                log::debug!("shuffle finished");
                self.check_solved();
            }
            GamePhase::Unshuffled | GamePhase::Playable | GamePhase::Solved => {}
        }
        self.phase
    }

    /// Runs the remaining shuffle steps at once.
    pub fn finish_shuffle(&mut self) -> GamePhase {
        while self.phase.is_shuffling() {
            self.advance_shuffle();
        }
        self.phase
    }

    /// Handles a piece dragged to `to`.
    ///
    /// If the piece lands closer than [`GameConfig::snap_threshold`] to its solved
    /// position, it is stored exactly there; otherwise it is stored at `to`. A piece that
    /// was not on its cell before and is now emits [`GameEvent::PieceSnapped`]. When the
    /// last piece is placed, [`GameEvent::Solved`] is emitted once.
    ///
    /// Moves are dropped while the session is unshuffled or shuffling.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPiece`] if `id` is not part of this puzzle.
    pub fn on_piece_move(&mut self, id: PieceId, to: Point) -> Result<MoveOutcome, GameError> {
        let expected = self.expected_position(id)?;
        if !matches!(self.phase, GamePhase::Playable | GamePhase::Solved) {
            log::debug!("dropping move of piece {id} during {:?}", self.phase);
            return Ok(MoveOutcome::Ignored);
        }

        let was_snapped = self
            .positions
            .get(id)
            .is_some_and(|prev| self.is_on(prev, expected));
        let cell = self.solution.find(id);
        let outcome = if to.distance(expected) < self.config.snap_threshold
            && cell.and_then(|pos| self.solution.get(pos)) == Some(id)
        {
            self.positions.set(id, expected);
            if !was_snapped {
                log::debug!("piece {id} snapped");
                self.events.push(GameEvent::PieceSnapped { id });
            }
            MoveOutcome::Snapped { newly: !was_snapped }
        } else {
            self.positions.set(id, to);
            MoveOutcome::Moved
        };

        self.check_solved();
        Ok(outcome)
    }

    /// Matrix of the pieces currently within snap distance of their cell.
    ///
    /// Cells whose piece is not placed are `None`.
    ///
    /// # Panics
    ///
    /// Panics if a stored position refers to a piece that is not in the solution
    /// matrix; construction makes that unreachable.
    #[must_use]
    pub fn current_matrix(&self) -> SolutionMatrix {
        let mut current = SolutionMatrix::empty(self.solution.rows(), self.solution.cols());
        for (id, pos) in self.positions.iter() {
            let cell = self
                .solution
                .find(id)
                .unwrap_or_else(|| panic!("position for piece {id} has no cell"));
            let expected = self.expected[id.index()];
            if pos.distance(expected) < self.config.snap_threshold {
                current.set(cell, Some(id));
            }
        }
        current
    }

    /// Number of pieces within snap distance of their cell.
    #[must_use]
    pub fn placed_count(&self) -> usize {
        self.current_matrix().filled_count()
    }

    /// Fraction of cells holding their correct piece, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        let cells = self.solution.cell_count();
        if cells == 0 {
            return 0.0;
        }
        self.placed_count() as f64 / cells as f64
    }

    /// Returns `true` once the puzzle has been completed since the last shuffle.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.phase.is_solved()
    }

    /// Drains the queued events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Changes the board size, scaling every position proportionally.
    ///
    /// Placed pieces stay placed. A pending spread step is rescaled too.
    pub fn resize(&mut self, board: Size) {
        if board == self.board {
            return;
        }
        log::debug!(
            "resizing board from {:.0}x{:.0} to {:.0}x{:.0}",
            self.board.width,
            self.board.height,
            board.width,
            board.height
        );
        if let Some(spread) = &mut self.pending_spread {
            rescale_layout(spread, self.board, board);
        }
        self.positions.rescale(board);
        self.board = board;
        self.expected = board::expected_positions(&self.pieces, &self.solution, board);
    }

    fn is_on(&self, pos: Point, expected: Point) -> bool {
        let tolerance = self.config.snapped_tolerance;
        (pos.x - expected.x).abs() < tolerance && (pos.y - expected.y).abs() < tolerance
    }

    fn check_solved(&mut self) {
        if self.phase.is_playable() && self.placed_count() == self.solution.cell_count() {
            self.phase = GamePhase::Solved;
            self.events.push(GameEvent::Solved);
            log::info!("puzzle solved");
        }
    }
}

fn validate(pieces: &[Piece], solution: &SolutionMatrix) -> Result<(), GameError> {
    if pieces.is_empty() {
        return Err(GameError::NoPieces);
    }
    for (index, piece) in pieces.iter().enumerate() {
        if piece.id().index() != index {
            return Err(GameError::PieceOrder {
                index,
                id: piece.id(),
            });
        }
    }
    solution.check_dense()?;
    if let Some(id) = solution
        .iter()
        .filter_map(|(_, id)| id)
        .find(|id| id.index() >= pieces.len())
    {
        return Err(GameError::UnknownPiece { id });
    }
    if solution.cell_count() != pieces.len() {
        let missing = pieces
            .iter()
            .find(|p| solution.find(p.id()).is_none())
            .map_or(PieceId::new(0), Piece::id);
        return Err(GameError::MissingPosition { id: missing });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use image::RgbaImage;
    use jigcut_core::CutLines;
    use jigcut_generator::{ShuffleSeed, decompose};

    use super::*;

    const BOARD: Size = Size::new(600.0, 400.0);

    fn two_by_two() -> Game {
        let decomposition = decompose(
            &RgbaImage::new(300, 200),
            &CutLines::from_unvalidated(&[100.0], &[150.0]),
        );
        Game::from_decomposition(decomposition, BOARD).unwrap()
    }

    fn playable() -> Game {
        let mut game = two_by_two();
        assert!(game.shuffle(&mut ShuffleSeed::from_label("test").rng()));
        game.finish_shuffle();
        game
    }

    fn far_from(p: Point) -> Point {
        Point::new(p.x + 200.0, p.y + 150.0)
    }

    fn scatter(game: &mut Game) {
        for i in 0..4 {
            let id = PieceId::new(i);
            let expected = game.expected_position(id).unwrap();
            game.on_piece_move(id, far_from(expected)).unwrap();
        }
        game.take_events();
    }

    #[test]
    fn expected_positions_on_scaled_board() {
        let game = two_by_two();
        assert_eq!(game.expected_position(PieceId::new(0)), Ok(Point::new(0.0, 0.0)));
        assert_eq!(game.expected_position(PieceId::new(1)), Ok(Point::new(300.0, 0.0)));
        assert_eq!(game.expected_position(PieceId::new(2)), Ok(Point::new(0.0, 200.0)));
        assert_eq!(game.expected_position(PieceId::new(3)), Ok(Point::new(300.0, 200.0)));
        assert_eq!(
            game.expected_position(PieceId::new(4)),
            Err(GameError::UnknownPiece { id: PieceId::new(4) })
        );
    }

    #[test]
    fn moves_are_dropped_until_shuffled() {
        let mut game = two_by_two();
        assert!(game.phase().is_unshuffled());
        assert_eq!(
            game.on_piece_move(PieceId::new(0), Point::new(50.0, 50.0)),
            Ok(MoveOutcome::Ignored)
        );

        game.shuffle(&mut ShuffleSeed::from_label("drop").rng());
        let before = game.position(PieceId::new(0));
        assert_eq!(
            game.on_piece_move(PieceId::new(0), Point::new(1.0, 1.0)),
            Ok(MoveOutcome::Ignored)
        );
        assert_eq!(game.position(PieceId::new(0)), before);
        assert!(!game.shuffle(&mut ShuffleSeed::from_label("again").rng()));

        assert_eq!(
            game.advance_shuffle(),
            GamePhase::Shuffling(ShufflePhase::Spread)
        );
        assert!(game.advance_shuffle().is_playable());
    }

    #[test]
    fn snap_within_threshold() {
        let mut game = playable();
        scatter(&mut game);
        let id = PieceId::new(0);
        let expected = game.expected_position(id).unwrap();

        let outcome = game
            .on_piece_move(id, Point::new(expected.x + 30.0, expected.y - 20.0))
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Snapped { newly: true });
        assert_eq!(game.position(id), Some(expected));
        assert_eq!(game.take_events(), vec![GameEvent::PieceSnapped { id }]);

        // Snapping again is not a new snap.
        let outcome = game.on_piece_move(id, expected).unwrap();
        assert_eq!(outcome, MoveOutcome::Snapped { newly: false });
        assert!(game.take_events().is_empty());

        // 40 is not strictly below the threshold.
        let outcome = game
            .on_piece_move(id, Point::new(expected.x + 40.0, expected.y))
            .unwrap();
        assert!(outcome.is_moved());
        assert_eq!(game.position(id), Some(Point::new(expected.x + 40.0, expected.y)));
    }

    #[test]
    fn solved_is_latched_and_emitted_once() {
        let mut game = playable();
        scatter(&mut game);
        assert!((game.progress() - 0.0).abs() < f64::EPSILON);

        for i in 0..4 {
            let id = PieceId::new(i);
            let expected = game.expected_position(id).unwrap();
            game.on_piece_move(id, Point::new(expected.x + 3.0, expected.y + 4.0))
                .unwrap();
        }
        assert!(game.is_solved());
        let events = game.take_events();
        assert_eq!(events.iter().filter(|e| e.is_solved()).count(), 1);
        assert_eq!(events.iter().filter(|e| e.is_piece_snapped()).count(), 4);

        let expected = game.expected_position(PieceId::new(3)).unwrap();
        game.on_piece_move(PieceId::new(3), expected).unwrap();
        assert!(game.is_solved());
        assert!(game.take_events().is_empty());

        // Dragging a piece away again does not clear the latch.
        game.on_piece_move(PieceId::new(3), far_from(expected)).unwrap();
        assert!(game.is_solved());
        assert!((game.progress() - 0.75).abs() < f64::EPSILON);

        assert!(game.restart(&mut ShuffleSeed::from_label("again").rng()));
        assert!(!game.is_solved());
    }

    #[test]
    fn current_matrix_tracks_placed_cells() {
        let mut game = playable();
        scatter(&mut game);
        let id = PieceId::new(2);
        game.on_piece_move(id, game.expected_position(id).unwrap()).unwrap();

        let current = game.current_matrix();
        assert_eq!(current.filled_count(), 1);
        assert_eq!(current.get(jigcut_core::GridPosition::new(1, 0)), Some(id));
        assert_eq!(game.placed_count(), 1);
    }

    #[test]
    fn resize_keeps_placed_pieces_placed() {
        let mut game = playable();
        scatter(&mut game);
        let id = PieceId::new(1);
        game.on_piece_move(id, game.expected_position(id).unwrap()).unwrap();
        game.resize(Size::new(300.0, 200.0));

        assert_eq!(game.expected_position(id), Ok(Point::new(150.0, 0.0)));
        assert_eq!(game.position(id), Some(Point::new(150.0, 0.0)));
        assert_eq!(game.placed_count(), 1);
    }

    #[test]
    fn resume_restores_positions() {
        let mut game = playable();
        scatter(&mut game);
        let id = PieceId::new(0);
        game.on_piece_move(id, game.expected_position(id).unwrap()).unwrap();
        let saved = game.positions().clone();

        let resumed = Game::resume(
            game.pieces().to_vec(),
            game.solution().clone(),
            Size::new(1200.0, 800.0),
            saved,
        )
        .unwrap();
        assert!(resumed.phase().is_playable());
        assert_eq!(resumed.placed_count(), 1);
        assert_eq!(resumed.position(id), Some(Point::ORIGIN));
    }

    #[test]
    fn resume_rejects_incomplete_positions() {
        let game = two_by_two();
        let mut saved = PositionStore::new(BOARD);
        saved.set(PieceId::new(0), Point::ORIGIN);
        let err = Game::resume(game.pieces().to_vec(), game.solution().clone(), BOARD, saved)
            .unwrap_err();
        assert_eq!(err, GameError::MissingPosition { id: PieceId::new(1) });
    }

    #[test]
    fn rejects_inconsistent_puzzles() {
        let game = two_by_two();
        let pieces = game.pieces().to_vec();
        assert_eq!(
            Game::new(Vec::new(), SolutionMatrix::empty(0, 0), BOARD).unwrap_err(),
            GameError::NoPieces
        );
        assert!(matches!(
            Game::new(pieces.clone(), SolutionMatrix::empty(2, 2), BOARD),
            Err(GameError::InvalidSolution(_))
        ));
        assert_eq!(
            Game::new(pieces.clone(), SolutionMatrix::row_major(3, 2), BOARD).unwrap_err(),
            GameError::UnknownPiece { id: PieceId::new(4) }
        );
        let mut reversed = pieces;
        reversed.reverse();
        assert_eq!(
            Game::new(reversed, SolutionMatrix::row_major(2, 2), BOARD).unwrap_err(),
            GameError::PieceOrder {
                index: 0,
                id: PieceId::new(3)
            }
        );
    }
}
