//! Command-line shell for authoring and playing jigcut puzzles.
//!
//! # Usage
//!
//! Cut an image into a 3x4 grid and store it:
//!
//! ```sh
//! cargo run -- create photo.jpg --rows 3 --cols 4
//! ```
//!
//! Cut lines can also be given explicitly, in pixels of the stored image (which is
//! first fitted into 800x600):
//!
//! ```sh
//! cargo run -- create photo.jpg --horizontal 200 --vertical 150 --vertical 420
//! ```
//!
//! List, inspect and remove stored puzzles:
//!
//! ```sh
//! cargo run -- list
//! cargo run -- show <ID>
//! cargo run -- remove <ID>
//! ```
//!
//! Play a puzzle: the pieces are shuffled (or a saved session is resumed) and then
//! placed automatically, printing progress. `--moves` stops early and saves the session:
//!
//! ```sh
//! cargo run -- play <ID> --moves 3
//! cargo run -- play <ID>
//! ```
//!
//! Puzzles are kept in `./jigcut-store` unless `--store` is given. Set `RUST_LOG=debug`
//! for diagnostics.

use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    process,
    time::{SystemTime, UNIX_EPOCH},
};

use clap::{Parser, Subcommand};
use jigcut_app::{
    DirStore, Puzzle, PuzzleStore, default_board, save_session, start_session,
};
use jigcut_core::{Axis, DISPLAY_BUDGET, PieceId, Point};
use jigcut_game::{Game, GameEvent};
use jigcut_generator::{PuzzleEditor, ShuffleSeed, bitmap::fit_within};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding stored puzzles.
    #[arg(long, value_name = "DIR", default_value = "jigcut-store")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Cut an image into pieces and store the puzzle.
    Create {
        /// Image file (PNG or JPEG).
        image: PathBuf,
        /// Puzzle title. Defaults to the file name.
        #[arg(long)]
        title: Option<String>,
        /// Split into this many evenly spaced rows.
        #[arg(long, value_name = "COUNT")]
        rows: Option<u32>,
        /// Split into this many evenly spaced columns.
        #[arg(long, value_name = "COUNT")]
        cols: Option<u32>,
        /// Horizontal cut line at this y. Repeatable.
        #[arg(long = "horizontal", value_name = "Y")]
        horizontal: Vec<f64>,
        /// Vertical cut line at this x. Repeatable.
        #[arg(long = "vertical", value_name = "X")]
        vertical: Vec<f64>,
    },
    /// List stored puzzles, newest first.
    List,
    /// Show details of a stored puzzle.
    Show {
        /// Puzzle id.
        id: String,
    },
    /// Remove a stored puzzle and its saved session.
    Remove {
        /// Puzzle id.
        id: String,
    },
    /// Shuffle (or resume) a puzzle and place its pieces automatically.
    Play {
        /// Puzzle id.
        id: String,
        /// Shuffle seed as 64 hex digits. Random if omitted.
        #[arg(long, value_name = "HEX")]
        seed: Option<ShuffleSeed>,
        /// Ignore any saved session and shuffle again.
        #[arg(long)]
        fresh: bool,
        /// Place at most this many pieces, then save the session.
        #[arg(long, value_name = "COUNT")]
        moves: Option<usize>,
    },
}

fn main() {
    better_panic::install();
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut store = DirStore::open(&args.store)?;
    match args.command {
        Command::Create {
            image,
            title,
            rows,
            cols,
            horizontal,
            vertical,
        } => create(
            &mut store,
            &image,
            title,
            (rows, cols),
            &horizontal,
            &vertical,
        ),
        Command::List => list(&store),
        Command::Show { id } => show(&store, &id),
        Command::Remove { id } => remove(&mut store, &id),
        Command::Play {
            id,
            seed,
            fresh,
            moves,
        } => play(&mut store, &id, seed, fresh, moves),
    }
}

fn create(
    store: &mut DirStore,
    path: &Path,
    title: Option<String>,
    (rows, cols): (Option<u32>, Option<u32>),
    horizontal: &[f64],
    vertical: &[f64],
) -> Result<(), Box<dyn Error>> {
    let image = image::load_from_memory(&fs::read(path)?)?.to_rgba8();
    let image = fit_within(&image, DISPLAY_BUDGET);

    let mut editor = PuzzleEditor::new();
    editor.load_image(image)?;
    let (width, height) = editor
        .image()
        .map_or((0.0, 0.0), |image| (f64::from(image.width()), f64::from(image.height())));

    let lines = evenly_spaced(rows, height)
        .map(|y| (Axis::Horizontal, y))
        .chain(evenly_spaced(cols, width).map(|x| (Axis::Vertical, x)))
        .chain(horizontal.iter().map(|y| (Axis::Horizontal, *y)))
        .chain(vertical.iter().map(|x| (Axis::Vertical, *x)))
        .collect::<Vec<_>>();
    for (axis, coordinate) in lines {
        if let Some(rejection) = editor.try_add_source_line(axis, coordinate)?.rejection() {
            eprintln!("Skipping {axis} line at {coordinate}: {rejection}");
        }
    }

    editor.break_image();
    let (Some(decomposition), Some(image)) = (
        editor.take_decomposition().filter(|d| !d.is_empty()),
        editor.image(),
    ) else {
        eprintln!("No usable cut lines; nothing to create.");
        process::exit(2);
    };

    let title = title.unwrap_or_else(|| {
        path.file_stem()
            .map_or_else(|| "untitled".to_owned(), |s| s.to_string_lossy().into_owned())
    });
    let created_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    let puzzle = Puzzle::from_decomposition(title, image, &decomposition, created_at)?;
    store.save(&puzzle)?;

    println!("Created:");
    println!("  {}", puzzle.id);
    println!();
    print_summary(&puzzle);
    Ok(())
}

fn evenly_spaced(count: Option<u32>, extent: f64) -> impl Iterator<Item = f64> {
    let count = count.unwrap_or(1).max(1);
    (1..count).map(move |i| extent * f64::from(i) / f64::from(count))
}

fn list(store: &DirStore) -> Result<(), Box<dyn Error>> {
    let puzzles = store.list_all()?;
    if puzzles.is_empty() {
        println!("No puzzles in {}.", store.dir().display());
        return Ok(());
    }
    for puzzle in puzzles {
        println!(
            "{}  {:>2}x{:<2}  {}",
            puzzle.id,
            puzzle.solution.rows(),
            puzzle.solution.cols(),
            puzzle.title
        );
    }
    Ok(())
}

fn load(store: &DirStore, id: &str) -> Result<Puzzle, Box<dyn Error>> {
    match store.load(id)? {
        Some(puzzle) => Ok(puzzle),
        None => {
            eprintln!("No puzzle with id {id}.");
            process::exit(2);
        }
    }
}

fn show(store: &DirStore, id: &str) -> Result<(), Box<dyn Error>> {
    let puzzle = load(store, id)?;
    print_summary(&puzzle);

    println!();
    println!("Solution:");
    for row in puzzle.solution.as_rows() {
        let cells = row
            .iter()
            .map(|cell| cell.map_or_else(|| "-".to_owned(), |id| id.to_string()))
            .collect::<Vec<_>>();
        println!("  {}", cells.join(" "));
    }

    println!();
    println!("Pieces:");
    for piece in &puzzle.pieces {
        println!(
            "  {:>3}: ({:.0}, {:.0}) {:.0}x{:.0}",
            piece.id, piece.x, piece.y, piece.width, piece.height
        );
    }

    if let Some(saved) = store.load_positions(id)? {
        println!();
        println!("Saved session:");
        println!("  {} piece positions", saved.len());
    }
    Ok(())
}

fn print_summary(puzzle: &Puzzle) {
    println!("Title:");
    println!("  {}", puzzle.title);
    if let Some(ai) = &puzzle.ai_content {
        println!("  {}", ai.description);
    }
    println!("Image:");
    println!("  {}x{}", puzzle.original_width, puzzle.original_height);
    println!("Grid:");
    println!(
        "  {} rows x {} cols ({} pieces)",
        puzzle.solution.rows(),
        puzzle.solution.cols(),
        puzzle.pieces.len()
    );
}

fn remove(store: &mut DirStore, id: &str) -> Result<(), Box<dyn Error>> {
    let puzzle = load(store, id)?;
    store.remove(&puzzle.id)?;
    println!("Removed {} ({})", puzzle.id, puzzle.title);
    Ok(())
}

fn play(
    store: &mut DirStore,
    id: &str,
    seed: Option<ShuffleSeed>,
    fresh: bool,
    moves: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let puzzle = load(store, id)?;
    if fresh {
        store.remove_positions(&puzzle.id)?;
    }

    let seed = seed.unwrap_or_else(ShuffleSeed::random);
    println!("Seed:");
    println!("  {seed}");
    println!();

    let mut game = start_session(store, &puzzle, default_board(&puzzle), &mut seed.rng())?;
    game.finish_shuffle();
    print_progress(&game);

    let placed = game.current_matrix();
    let remaining = game
        .pieces()
        .iter()
        .map(|piece| piece.id())
        .filter(|id| placed.find(*id).is_none())
        .collect::<Vec<_>>();
    let limit = moves.unwrap_or(remaining.len());
    for id in remaining.into_iter().take(limit) {
        place(&mut game, id)?;
        for event in game.take_events() {
            print_event(&event);
        }
        print_progress(&game);
    }

    if game.is_solved() {
        store.remove_positions(&puzzle.id)?;
    } else {
        save_session(store, &puzzle.id, &game)?;
        println!("Session saved.");
    }
    Ok(())
}

fn place(game: &mut Game, id: PieceId) -> Result<(), Box<dyn Error>> {
    let target = game.expected_position(id)?;
    // Drop a little off target, as a hand would.
    let nudge = game.config().snap_threshold / 4.0;
    game.on_piece_move(id, Point::new(target.x + nudge, target.y - nudge))?;
    Ok(())
}

fn print_event(event: &GameEvent) {
    match event {
        GameEvent::PieceSnapped { id } => println!("Piece {id} snapped into place."),
        GameEvent::GroupsJoined { id, size } => println!("Piece {id} joined a group of {size}."),
        GameEvent::Solved => println!("Solved!"),
    }
}

fn print_progress(game: &Game) {
    println!(
        "Progress: {}/{} ({:.0}%)",
        game.placed_count(),
        game.pieces().len(),
        game.progress() * 100.0
    );
}
