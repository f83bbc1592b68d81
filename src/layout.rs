//! The exported form of a finished grid: its size plus one entry per answer, numbered the way
//! printed crosswords are.
//!
//! Coordinates in a layout are 1-based, with `startx` the column and `starty` the row of the
//! first letter. A layout serializes to and from
//! `{ "rows", "cols", "result": [{ "clue", "answer", "extraClue", "startx", "starty",
//! "orientation", "clueId" }] }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::BoardError;
use crate::grid::{Grid, Placement};
use crate::word::{PoolWord, Word};
use crate::{ClueId, GridCoord, Orientation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub rows: usize,
    pub cols: usize,
    /// Entries in reading order of their first cell, down before across where both start in
    /// the same cell.
    pub result: Vec<LayoutEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEntry {
    pub clue: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_clue: Option<Value>,
    pub startx: usize,
    pub starty: usize,
    pub orientation: Orientation,
    pub clue_id: ClueId,
}

impl LayoutEntry {
    /// The entry's position in 0-based grid coordinates, or `None` if `startx` or `starty` is 0.
    pub fn placement(&self) -> Option<Placement> {
        Some(Placement {
            row: self.starty.checked_sub(1)?,
            column: self.startx.checked_sub(1)?,
            orientation: self.orientation,
        })
    }

    /// The entry's placement if the whole answer lies on a `rows` x `cols` board.
    pub fn placement_within(&self, rows: usize, cols: usize) -> Option<Placement> {
        self.placement().filter(|placement| placement.fits(self.len(), rows, cols))
    }

    /// Length of the answer in characters.
    pub fn len(&self) -> usize {
        self.answer.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.answer.is_empty()
    }

    /// The cells covered by the answer, first letter first. Empty for an entry starting at a
    /// 0 coordinate, and cut short where a coordinate would overflow.
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> {
        let length = self.len();
        self.placement()
            .into_iter()
            .flat_map(move |placement| (0..length).map_while(move |offset| placement.checked_cell(offset)))
    }

    pub(crate) fn out_of_bounds(&self, rows: usize, cols: usize) -> BoardError {
        BoardError::OutOfBounds {
            clue_id: self.clue_id,
            orientation: self.orientation,
            answer: self.answer.clone(),
            rows,
            cols,
        }
    }
}

impl Layout {
    pub fn entry(&self, clue_id: ClueId, orientation: Orientation) -> Option<&LayoutEntry> {
        self.result
            .iter()
            .find(|entry| entry.clue_id == clue_id && entry.orientation == orientation)
    }

    /// Turn every entry back into a word fixed at its current position. Laying these out again
    /// gives back this exact layout. Fails on the first entry that is not on the board.
    pub fn to_fixed_words(&self) -> Result<Vec<Word>, BoardError> {
        self.result
            .iter()
            .map(|entry| {
                let placement = entry
                    .placement_within(self.rows, self.cols)
                    .ok_or_else(|| entry.out_of_bounds(self.rows, self.cols))?;

                Ok(Word {
                    answer: entry.answer.clone(),
                    clue: entry.clue.clone(),
                    extra_clue: entry.extra_clue.clone(),
                    placement: Some(placement),
                })
            })
            .collect()
    }
}

/// Number the words on `grid` and list them in reading order. `words` are looked up by the
/// indexes recorded in the grid's cells.
///
/// Every cell where at least one word starts gets the next clue id; the down entry is listed
/// before the across entry when both start there.
pub fn export(grid: &Grid, words: &[PoolWord]) -> Layout {
    let mut result = vec![];
    let mut next_clue_id: ClueId = 1;

    for ((row, column), cell) in grid.occupied() {
        if !cell.starts_word() {
            continue;
        }

        for orientation in [Orientation::Down, Orientation::Across] {
            let Some(mark) = cell.mark(orientation).filter(|mark| mark.is_start_of_word) else {
                continue;
            };

            let word = &words[mark.index];
            result.push(LayoutEntry {
                clue: word.clue.clone(),
                answer: word.answer.clone(),
                extra_clue: word.extra_clue.clone(),
                startx: column + 1,
                starty: row + 1,
                orientation,
                clue_id: next_clue_id,
            });
        }

        next_clue_id += 1;
    }

    Layout { rows: grid.rows(), cols: grid.columns(), result }
}
