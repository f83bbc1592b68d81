//! Crossword layout generation: lay a list of answers onto a grid so that crossing answers share
//! letters, crop the grid to its occupied area and number the entries the usual way.
//!
//! The usual entry point is [`generate_layout`], or [`LayoutGenerator`] when the caller wants to
//! supply its own random source or inspect the words that could not be placed.

use std::fmt::{Display, Formatter};

use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod board;
pub mod errors;
pub mod generator;
pub mod grid;
pub mod layout;
pub mod logging;
pub mod score;
pub mod word;

pub use board::{Board, BoardCell};
pub use errors::{BoardError, InputError};
pub use generator::{GenerationFailure, GeneratorConfig, LayoutGenerator, Statistics};
pub use grid::{Cell, Grid, Placement, WordMark};
pub use layout::{Layout, LayoutEntry};
pub use score::{Answers, ScoreConfig, Scorer, ScoringMode};
pub use word::{CaseException, PoolWord, PuzzleInput, Word, WordEntry};

/// Default number of rows in the working canvas. Layouts are cropped afterwards, so this only
/// needs to be comfortably larger than any puzzle we expect to build.
pub const GRID_ROWS: usize = 100;

/// Default number of columns in the working canvas.
pub const GRID_COLUMNS: usize = 100;

/// Default number of complete grids to build while looking for the squarest one.
pub const SQUARE_GRID_TRIES: usize = 20;

/// Default number of from-scratch retries within a single grid build.
pub const GRID_TRIES: usize = 10;

/// Answers up to this length keep their glyphs inline rather than on the heap.
pub const MAX_INLINE_ANSWER_LENGTH: usize = 21;

/// A pool size below this is raised to it; a crossword needs at least two words to cross.
pub const MIN_POOL_SIZE: usize = 2;

/// An identifier for a word, based on its position in the filtered input list.
pub type WordIndex = usize;

/// The number printed in a crossword cell and shared by the across and down entries starting
/// there.
pub type ClueId = usize;

/// Zero-indexed (row, column) coords for a cell in the grid, where row = 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that an answer runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Across,
    Down,
}

impl Orientation {
    /// Pick either orientation with equal probability.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Orientation {
        if rng.gen_bool(0.5) {
            Orientation::Across
        } else {
            Orientation::Down
        }
    }

    /// The other orientation.
    pub fn perpendicular(self) -> Orientation {
        match self {
            Orientation::Across => Orientation::Down,
            Orientation::Down => Orientation::Across,
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Across => write!(f, "across"),
            Orientation::Down => write!(f, "down"),
        }
    }
}

/// Generate a layout for the given words, searching for the most square grid within the retry
/// budgets in `config`.
pub fn generate_layout(
    words: Vec<Word>,
    config: GeneratorConfig,
) -> Result<Layout, GenerationFailure> {
    LayoutGenerator::new(words, config).generate()
}
