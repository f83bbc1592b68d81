//! Error types for reading puzzle input and validating exported layouts.
//!
//! Failing to lay words out is not an error in this sense; see
//! [`GenerationFailure`](crate::generator::GenerationFailure), which carries the
//! words that could not be placed.

use thiserror::Error;

use crate::Orientation;

/// Problems with a word list or puzzle document supplied by the caller.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("could not parse puzzle description: {0}")]
    Json(#[from] serde_json::Error),

    /// `row`, `column` and `orientation` must be given together or not at all.
    #[error("word {index} ({answer}) has an incomplete fixed placement; row, column and orientation are all required")]
    IncompletePlacement { index: usize, answer: String },

    /// Fixed placements use 1-based coordinates.
    #[error("word {index} ({answer}) has a fixed placement at row {row}, column {column}; coordinates start at 1")]
    ZeroCoordinate {
        index: usize,
        answer: String,
        row: usize,
        column: usize,
    },
}

/// Problems found while rebuilding a board from an exported layout.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BoardError {
    #[error("{orientation} entry {clue_id} ({answer}) does not fit on a {rows}x{cols} board")]
    OutOfBounds {
        clue_id: usize,
        orientation: Orientation,
        answer: String,
        rows: usize,
        cols: usize,
    },

    #[error("conflicting letters at row {row}, column {column}: {existing:?} vs {incoming:?}")]
    ConflictingSolution {
        row: usize,
        column: usize,
        existing: char,
        incoming: char,
    },

    #[error("answers cover {actual} cells but the board has {expected}")]
    AnswerCountMismatch { expected: usize, actual: usize },
}
