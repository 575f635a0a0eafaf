//! Puzzle persistence.
//!
//! A [`PuzzleStore`] keeps puzzle records keyed by id, plus the last saved piece
//! positions of each puzzle so a play session can be resumed. [`MemoryStore`] holds
//! everything in maps; [`DirStore`] writes one JSON file per record into a directory:
//!
//! ```text
//! <dir>/<id>.json                   puzzle record
//! <dir>/piece_positions_<id>.json   saved positions
//! ```

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use jigcut_game::PositionStore;

use crate::record::Puzzle;

const POSITIONS_PREFIX: &str = "piece_positions_";
const JSON_EXTENSION: &str = "json";

/// Errors reading or writing a store.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum StoreError {
    /// Filesystem failure.
    #[display("store I/O failed: {_0}")]
    Io(#[from] io::Error),
    /// A record could not be (de)serialized.
    #[display("malformed store record: {_0}")]
    Json(#[from] serde_json::Error),
    /// The id is not usable as a record key.
    #[display("invalid puzzle id {id:?}")]
    InvalidId {
        /// The rejected id.
        id: String,
    },
}

/// Key-value storage for puzzles and saved sessions.
pub trait PuzzleStore {
    /// Returns the puzzle with `id`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn load(&self, id: &str) -> Result<Option<Puzzle>, StoreError>;

    /// Inserts or replaces a puzzle.
    ///
    /// Saved positions under the same id are discarded, as they may describe pieces the
    /// new record does not have.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn save(&mut self, puzzle: &Puzzle) -> Result<(), StoreError>;

    /// Removes a puzzle and its saved positions. Removing an absent id is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn remove(&mut self, id: &str) -> Result<(), StoreError>;

    /// Returns every stored puzzle, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn list_all(&self) -> Result<Vec<Puzzle>, StoreError>;

    /// Saves the piece positions of a play session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn save_positions(&mut self, id: &str, positions: &PositionStore) -> Result<(), StoreError>;

    /// Returns the saved positions for `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn load_positions(&self, id: &str) -> Result<Option<PositionStore>, StoreError>;

    /// Forgets the saved positions for `id`, keeping the puzzle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage fails.
    fn remove_positions(&mut self, id: &str) -> Result<(), StoreError>;
}

fn sort_newest_first(puzzles: &mut [Puzzle]) {
    puzzles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// A store that lives in memory only.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    puzzles: BTreeMap<String, Puzzle>,
    positions: BTreeMap<String, PositionStore>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PuzzleStore for MemoryStore {
    fn load(&self, id: &str) -> Result<Option<Puzzle>, StoreError> {
        Ok(self.puzzles.get(id).cloned())
    }

    fn save(&mut self, puzzle: &Puzzle) -> Result<(), StoreError> {
        self.puzzles.insert(puzzle.id.clone(), puzzle.clone());
        self.positions.remove(&puzzle.id);
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        self.puzzles.remove(id);
        self.positions.remove(id);
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Puzzle>, StoreError> {
        let mut puzzles = self.puzzles.values().cloned().collect::<Vec<_>>();
        sort_newest_first(&mut puzzles);
        Ok(puzzles)
    }

    fn save_positions(&mut self, id: &str, positions: &PositionStore) -> Result<(), StoreError> {
        self.positions.insert(id.to_owned(), positions.clone());
        Ok(())
    }

    fn load_positions(&self, id: &str) -> Result<Option<PositionStore>, StoreError> {
        Ok(self.positions.get(id).cloned())
    }

    fn remove_positions(&mut self, id: &str) -> Result<(), StoreError> {
        self.positions.remove(id);
        Ok(())
    }
}

/// A store backed by JSON files in a directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Opens the store at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        log::debug!("opened puzzle store at {}", dir.display());
        Ok(Self { dir })
    }

    /// The directory holding the records.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn puzzle_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        check_id(id)?;
        Ok(self.dir.join(format!("{id}.{JSON_EXTENSION}")))
    }

    fn positions_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        check_id(id)?;
        Ok(self
            .dir
            .join(format!("{POSITIONS_PREFIX}{id}.{JSON_EXTENSION}")))
    }
}

fn check_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId { id: id.to_owned() })
    }
}

fn read_json<T>(path: &Path) -> Result<Option<T>, StoreError>
where
    T: serde::de::DeserializeOwned,
{
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_json<T>(path: &Path, value: &T) -> Result<(), StoreError>
where
    T: serde::Serialize,
{
    fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

impl PuzzleStore for DirStore {
    fn load(&self, id: &str) -> Result<Option<Puzzle>, StoreError> {
        read_json(&self.puzzle_path(id)?)
    }

    fn save(&mut self, puzzle: &Puzzle) -> Result<(), StoreError> {
        let path = self.puzzle_path(&puzzle.id)?;
        write_json(&path, puzzle)?;
        remove_if_exists(&self.positions_path(&puzzle.id)?)?;
        log::debug!("saved puzzle {} to {}", puzzle.id, path.display());
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        remove_if_exists(&self.puzzle_path(id)?)?;
        remove_if_exists(&self.positions_path(id)?)?;
        log::debug!("removed puzzle {id}");
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Puzzle>, StoreError> {
        let mut puzzles = vec![];
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_record = path.extension().is_some_and(|ext| ext == JSON_EXTENSION)
                && path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| !stem.starts_with(POSITIONS_PREFIX));
            if !is_record {
                continue;
            }
            if let Some(puzzle) = read_json(&path)? {
                puzzles.push(puzzle);
            }
        }
        sort_newest_first(&mut puzzles);
        Ok(puzzles)
    }

    fn save_positions(&mut self, id: &str, positions: &PositionStore) -> Result<(), StoreError> {
        write_json(&self.positions_path(id)?, positions)
    }

    fn load_positions(&self, id: &str) -> Result<Option<PositionStore>, StoreError> {
        read_json(&self.positions_path(id)?)
    }

    fn remove_positions(&mut self, id: &str) -> Result<(), StoreError> {
        remove_if_exists(&self.positions_path(id)?)
    }
}

#[cfg(test)]
mod tests {
    use image::RgbaImage;
    use jigcut_core::{CutLines, Size};
    use jigcut_game::Game;
    use jigcut_generator::{ShuffleSeed, decompose};

    use super::*;

    fn puzzle(title: &str, side: u32, created_at: u64) -> Puzzle {
        let image = RgbaImage::new(side, side);
        let lines = CutLines::from_unvalidated(&[], &[f64::from(side) / 2.0]);
        let decomposition = decompose(&image, &lines);
        Puzzle::from_decomposition(title, &image, &decomposition, created_at).unwrap()
    }

    fn positions_of(puzzle: &Puzzle) -> PositionStore {
        let decomposition = puzzle.to_decomposition().unwrap();
        let board = Size::new(puzzle.original_width, puzzle.original_height);
        let mut game = Game::from_decomposition(decomposition, board).unwrap();
        game.shuffle(&mut ShuffleSeed::from_label(&puzzle.title).rng());
        game.finish_shuffle();
        game.positions().clone()
    }

    fn exercise(store: &mut impl PuzzleStore) {
        let old = puzzle("old", 10, 100);
        let new = puzzle("new", 12, 200);
        store.save(&old).unwrap();
        store.save(&new).unwrap();

        assert_eq!(store.load(&old.id).unwrap(), Some(old.clone()));
        assert_eq!(store.load("missing").unwrap(), None);

        let titles = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, ["new", "old"]);

        assert_eq!(store.load_positions(&new.id).unwrap(), None);
        let positions = positions_of(&new);
        store.save_positions(&new.id, &positions).unwrap();
        store.save_positions(&old.id, &positions).unwrap();
        assert_eq!(store.load_positions(&new.id).unwrap(), Some(positions));
        store.remove_positions(&old.id).unwrap();
        assert_eq!(store.load_positions(&old.id).unwrap(), None);
        assert!(store.load(&old.id).unwrap().is_some());

        store.remove(&new.id).unwrap();
        store.remove(&new.id).unwrap();
        assert_eq!(store.load(&new.id).unwrap(), None);
        assert_eq!(store.load_positions(&new.id).unwrap(), None);
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    fn exercise_same_image(store: &mut impl PuzzleStore) {
        let image = RgbaImage::new(300, 200);
        let cut = |horizontal: &[f64], vertical: &[f64]| {
            let lines = CutLines::from_unvalidated(horizontal, vertical);
            let decomposition = decompose(&image, &lines);
            Puzzle::from_decomposition("same", &image, &decomposition, 7).unwrap()
        };
        let grid = cut(&[100.0], &[150.0]);
        let strips = cut(&[], &[75.0, 150.0, 225.0]);
        assert_ne!(grid.id, strips.id);

        store.save(&grid).unwrap();
        store.save_positions(&grid.id, &positions_of(&grid)).unwrap();
        store.save(&strips).unwrap();
        assert_eq!(store.list_all().unwrap().len(), 2);
        assert_eq!(store.load(&grid.id).unwrap(), Some(grid.clone()));
        assert!(store.load_positions(&grid.id).unwrap().is_some());
        assert_eq!(store.load_positions(&strips.id).unwrap(), None);

        store.save(&grid).unwrap();
        assert_eq!(store.load_positions(&grid.id).unwrap(), None);
    }

    #[test]
    fn memory_store_operations() {
        exercise(&mut MemoryStore::new());
        exercise_same_image(&mut MemoryStore::new());
    }

    #[test]
    fn dir_store_operations() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirStore::open(dir.path()).unwrap();
        exercise(&mut store);

        let dir = tempfile::tempdir().unwrap();
        exercise_same_image(&mut DirStore::open(dir.path()).unwrap());
    }

    #[test]
    fn dir_store_rejects_path_like_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::open(dir.path()).unwrap();
        for id in ["", "../escape", "a/b", "with space"] {
            assert!(matches!(
                store.load(id),
                Err(StoreError::InvalidId { .. })
            ));
        }
    }

    #[test]
    fn dir_store_reports_malformed_records() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), b"{").unwrap();
        let store = DirStore::open(dir.path()).unwrap();
        assert!(matches!(store.load("broken"), Err(StoreError::Json(_))));
        assert!(store.list_all().is_err());
    }
}
