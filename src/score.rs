//! Scoring a player's answers against a [`Board`].
//!
//! A cell scores `1` when correct, `0` when missing, and `-1` when wrong if penalties apply
//! (`0` otherwise). Empty cells do not score, and neither do space cells left blank. A word
//! scores `-1` if any of its cells does, `1` if every scored cell is correct, else `0`.

use serde::Deserialize;

use crate::board::Board;
use crate::errors::BoardError;
use crate::{ClueId, GridCoord, Orientation};

/// What an input field shows in a cell whose solution is a space. It counts as no answer.
pub const CHARACTER_PLACEHOLDER: char = '\u{ff3f}';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// One point per correct cell.
    #[default]
    Characters,
    /// One point per completely correct word.
    Words,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreConfig {
    pub mode: ScoringMode,
    pub apply_penalties: bool,
}

/// The player's answer for every cell of a board, in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    columns: usize,
    cells: Vec<Option<char>>,
}

impl Answers {
    pub fn new(board: &Board, cells: Vec<Option<char>>) -> Result<Answers, BoardError> {
        let expected = board.rows() * board.columns();
        if cells.len() != expected {
            return Err(BoardError::AnswerCountMismatch { expected, actual: cells.len() });
        }

        Ok(Answers { columns: board.columns(), cells })
    }

    /// No answers at all.
    pub fn empty(board: &Board) -> Answers {
        Answers {
            columns: board.columns(),
            cells: vec![None; board.rows() * board.columns()],
        }
    }

    pub fn get(&self, (row, column): GridCoord) -> Option<char> {
        if column >= self.columns {
            return None;
        }
        self.cells.get(row * self.columns + column).copied().flatten()
    }

    /// Set the answer for one cell. Returns `false` if `coord` is off the board.
    pub fn set(&mut self, (row, column): GridCoord, answer: Option<char>) -> bool {
        if column >= self.columns {
            return false;
        }
        match self.cells.get_mut(row * self.columns + column) {
            Some(cell) => {
                *cell = answer;
                true
            }
            None => false,
        }
    }

    /// Type `text` into the word with `clue_id` running in `orientation`, one character per
    /// cell. Extra characters are dropped. Returns `false` if there is no such word.
    pub fn fill_entry(&mut self, board: &Board, clue_id: ClueId, orientation: Orientation, text: &str) -> bool {
        let cells = board.entry_cells(clue_id, orientation);
        if cells.is_empty() {
            return false;
        }

        for (coord, answer) in cells.into_iter().zip(text.chars()) {
            self.set(coord, Some(answer));
        }
        true
    }
}

/// Score of a single cell, or `None` if the cell does not count.
pub fn cell_score(solution: Option<char>, answer: Option<char>, apply_penalties: bool) -> Option<i32> {
    let solution = solution?;
    let answer = answer.filter(|answer| !answer.is_whitespace());

    if solution == ' ' && answer.map(|answer| answer == CHARACTER_PLACEHOLDER).unwrap_or(true) {
        return None;
    }

    match answer {
        None => Some(0),
        Some(answer) if answer != solution => Some(if apply_penalties { -1 } else { 0 }),
        Some(_) => Some(1),
    }
}

pub struct Scorer<'a> {
    board: &'a Board,
    config: ScoreConfig,
}

impl<'a> Scorer<'a> {
    pub fn new(board: &'a Board, config: ScoreConfig) -> Scorer<'a> {
        Scorer { board, config }
    }

    pub fn cell_score(&self, answers: &Answers, coord: GridCoord) -> Option<i32> {
        cell_score(self.board.solution_at(coord), answers.get(coord), self.config.apply_penalties)
    }

    pub fn word_score(&self, answers: &Answers, clue_id: ClueId, orientation: Orientation) -> i32 {
        let cells = self.board.entry_cells(clue_id, orientation);
        if cells.is_empty() {
            return 0;
        }

        let scores: Vec<Option<i32>> = cells.iter().map(|&coord| self.cell_score(answers, coord)).collect();
        if scores.contains(&Some(-1)) {
            -1
        } else if scores.iter().all(|&score| score.map(|score| score == 1).unwrap_or(true)) {
            1
        } else {
            0
        }
    }

    /// Total score in the configured mode, never below zero.
    pub fn score(&self, answers: &Answers) -> u32 {
        let total: i32 = match self.config.mode {
            ScoringMode::Characters => self
                .coords()
                .filter_map(|coord| self.cell_score(answers, coord))
                .sum(),
            ScoringMode::Words => self
                .board
                .entries()
                .iter()
                .map(|entry| self.word_score(answers, entry.clue_id, entry.orientation))
                .sum(),
        };

        total.max(0) as u32
    }

    /// Cells holding a letter, or words, depending on the mode. Space cells never count
    /// towards the maximum.
    pub fn max_score(&self) -> u32 {
        let max = match self.config.mode {
            ScoringMode::Characters => self
                .board
                .cells()
                .iter()
                .filter(|cell| cell.solution.map(|solution| solution != ' ').unwrap_or(false))
                .count(),
            ScoringMode::Words => self.board.entries().len(),
        };

        max as u32
    }

    /// Does every cell with a letter have an answer?
    pub fn is_filled(&self, answers: &Answers) -> bool {
        self.coords()
            .filter(|&coord| self.board.solution_at(coord).map(|solution| solution != ' ').unwrap_or(false))
            .all(|coord| answers.get(coord).map(|answer| !answer.is_whitespace()).unwrap_or(false))
    }

    fn coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        let columns = self.board.columns();
        (0..self.board.rows()).flat_map(move |row| (0..columns).map(move |column| (row, column)))
    }
}

#[cfg(test)]
mod tests {
    use crate::board::Board;
    use crate::errors::BoardError;
    use crate::layout::{Layout, LayoutEntry};
    use crate::score::{cell_score, Answers, ScoreConfig, Scorer, ScoringMode, CHARACTER_PLACEHOLDER};
    use crate::Orientation::{self, Across, Down};

    fn entry(answer: &str, startx: usize, starty: usize, orientation: Orientation, clue_id: usize) -> LayoutEntry {
        LayoutEntry {
            clue: "Clue".to_string(),
            answer: answer.to_string(),
            extra_clue: None,
            startx,
            starty,
            orientation,
            clue_id,
        }
    }

    /// .M..
    /// HOME
    /// .M..
    fn home_and_mom() -> Board {
        let layout = Layout {
            rows: 3,
            cols: 4,
            result: vec![entry("MOM", 2, 1, Down, 1), entry("HOME", 1, 2, Across, 2)],
        };
        Board::from_layout(&layout).expect("Layout should be valid")
    }

    fn config(mode: ScoringMode, apply_penalties: bool) -> ScoreConfig {
        ScoreConfig { mode, apply_penalties }
    }

    #[test]
    fn test_cell_score() {
        assert_eq!(cell_score(Some('A'), Some('A'), true), Some(1));
        assert_eq!(cell_score(Some('A'), Some('B'), true), Some(-1));
        assert_eq!(cell_score(Some('A'), Some('B'), false), Some(0));
        assert_eq!(cell_score(Some('A'), None, true), Some(0));
        assert_eq!(cell_score(Some('A'), Some(' '), true), Some(0));
        assert_eq!(cell_score(None, Some('A'), true), None);
    }

    #[test]
    fn test_blank_space_cells_do_not_score() {
        assert_eq!(cell_score(Some(' '), None, true), None);
        assert_eq!(cell_score(Some(' '), Some(' '), true), None);
        assert_eq!(cell_score(Some(' '), Some(CHARACTER_PLACEHOLDER), true), None);
        assert_eq!(cell_score(Some(' '), Some('A'), true), Some(-1));
    }

    #[test]
    fn test_answers_must_cover_board() {
        let board = home_and_mom();

        assert_eq!(
            Answers::new(&board, vec![None; 3]),
            Err(BoardError::AnswerCountMismatch { expected: 12, actual: 3 })
        );
        assert!(Answers::new(&board, vec![None; 12]).is_ok());
    }

    #[test]
    fn test_character_scoring() {
        let board = home_and_mom();
        let mut answers = Answers::empty(&board);
        assert!(answers.fill_entry(&board, 2, Across, "HOME"));

        let scorer = Scorer::new(&board, config(ScoringMode::Characters, false));
        assert_eq!(scorer.score(&answers), 4);
        assert_eq!(scorer.max_score(), 6);
        assert!(!scorer.is_filled(&answers));

        answers.set((0, 1), Some('X'));
        assert_eq!(scorer.score(&answers), 4);

        let strict = Scorer::new(&board, config(ScoringMode::Characters, true));
        assert_eq!(strict.score(&answers), 3);
        assert_eq!(strict.cell_score(&answers, (0, 1)), Some(-1));
        assert_eq!(strict.cell_score(&answers, (0, 0)), None);
    }

    #[test]
    fn test_word_scoring() {
        let board = home_and_mom();
        let mut answers = Answers::empty(&board);
        answers.fill_entry(&board, 2, Across, "HOME");

        let scorer = Scorer::new(&board, config(ScoringMode::Words, true));
        assert_eq!(scorer.word_score(&answers, 2, Across), 1);
        assert_eq!(scorer.word_score(&answers, 1, Down), 0);
        assert_eq!(scorer.word_score(&answers, 7, Down), 0);
        assert_eq!(scorer.score(&answers), 1);
        assert_eq!(scorer.max_score(), 2);

        answers.set((0, 1), Some('X'));
        assert_eq!(scorer.word_score(&answers, 1, Down), -1);
        assert_eq!(scorer.score(&answers), 0);

        answers.fill_entry(&board, 1, Down, "MOM");
        assert_eq!(scorer.score(&answers), 2);
        assert!(scorer.is_filled(&answers));
    }

    #[test]
    fn test_score_never_negative() {
        let board = home_and_mom();
        let mut answers = Answers::empty(&board);
        answers.fill_entry(&board, 2, Across, "XXXX");

        let scorer = Scorer::new(&board, config(ScoringMode::Characters, true));
        assert_eq!(scorer.score(&answers), 0);
    }

    #[test]
    fn test_set_off_board() {
        let board = home_and_mom();
        let mut answers = Answers::empty(&board);

        assert!(!answers.set((0, 4), Some('A')));
        assert!(!answers.set((3, 0), Some('A')));
        assert_eq!(answers.get((3, 0)), None);
        assert!(!answers.fill_entry(&board, 9, Across, "A"));
    }
}
