//! The working canvas that answers are laid onto.

use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};

use rand::seq::SliceRandom;
use rand::Rng;
use smallvec::SmallVec;

use crate::{GridCoord, Orientation, WordIndex};

/// The expected maximum number of cells sharing one glyph before the index spills to the heap.
const CHAR_INDEX_INLINE: usize = 8;

/// Where an answer's first letter goes and which way the answer runs, in 0-based coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub row: usize,
    pub column: usize,
    pub orientation: Orientation,
}

impl Placement {
    /// The cell holding the letter `offset` places into the answer.
    pub fn cell(&self, offset: usize) -> GridCoord {
        match self.orientation {
            Orientation::Across => (self.row, self.column + offset),
            Orientation::Down => (self.row + offset, self.column),
        }
    }

    /// Like [`Placement::cell`], but `None` where the coordinate would overflow.
    pub fn checked_cell(&self, offset: usize) -> Option<GridCoord> {
        match self.orientation {
            Orientation::Across => self.column.checked_add(offset).map(|column| (self.row, column)),
            Orientation::Down => self.row.checked_add(offset).map(|row| (row, self.column)),
        }
    }

    /// Does an answer of `length` letters starting here stay inside a `rows` x `columns` grid?
    pub fn fits(&self, length: usize, rows: usize, columns: usize) -> bool {
        if length == 0 || self.row >= rows || self.column >= columns {
            return false;
        }
        match self.orientation {
            Orientation::Across => length <= columns - self.column,
            Orientation::Down => length <= rows - self.row,
        }
    }

    /// The cell just before the first letter, if it is on the grid.
    fn before(&self) -> Option<GridCoord> {
        match self.orientation {
            Orientation::Across => self.column.checked_sub(1).map(|column| (self.row, column)),
            Orientation::Down => self.row.checked_sub(1).map(|row| (row, self.column)),
        }
    }
}

/// The two cells directly beside `coord`, looking across the direction of travel.
fn beside(coord: GridCoord, orientation: Orientation) -> [Option<GridCoord>; 2] {
    let (row, column) = coord;
    match orientation {
        Orientation::Across => [row.checked_sub(1).map(|row| (row, column)), Some((row + 1, column))],
        Orientation::Down => [column.checked_sub(1).map(|column| (row, column)), Some((row, column + 1))],
    }
}

/// Records which word occupies a cell in one orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordMark {
    pub is_start_of_word: bool,
    pub index: WordIndex,
}

/// An occupied cell. A cell holds one glyph and belongs to at most one word per orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub across: Option<WordMark>,
    pub down: Option<WordMark>,
}

impl Cell {
    fn new(glyph: char) -> Cell {
        Cell { glyph, across: None, down: None }
    }

    pub fn mark(&self, orientation: Orientation) -> Option<WordMark> {
        match orientation {
            Orientation::Across => self.across,
            Orientation::Down => self.down,
        }
    }

    fn mark_mut(&mut self, orientation: Orientation) -> &mut Option<WordMark> {
        match orientation {
            Orientation::Across => &mut self.across,
            Orientation::Down => &mut self.down,
        }
    }

    /// Is this the first letter of a word in either orientation?
    pub fn starts_word(&self) -> bool {
        [self.across, self.down].iter().flatten().any(|mark| mark.is_start_of_word)
    }
}

/// A rectangular grid of cells plus an index from glyph to the cells currently holding it, so
/// that crossing candidates can be found without scanning the whole grid.
#[derive(Clone)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Option<Cell>>,
    char_index: HashMap<char, SmallVec<[GridCoord; CHAR_INDEX_INLINE]>>,
}

impl Debug for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("rows", &self.rows)
            .field("columns", &self.columns)
            .field("occupied", &(["(", &self.occupied().count().to_string(), " cells)"].join("")))
            .finish()
    }
}

impl Grid {
    pub fn new(rows: usize, columns: usize) -> Grid {
        Grid {
            rows,
            columns,
            cells: vec![None; rows * columns],
            char_index: HashMap::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    fn in_bounds(&self, (row, column): GridCoord) -> bool {
        row < self.rows && column < self.columns
    }

    fn slot(&self, (row, column): GridCoord) -> usize {
        row * self.columns + column
    }

    /// The cell at `coord`, or `None` if it is empty or off the grid.
    pub fn cell(&self, coord: GridCoord) -> Option<&Cell> {
        if !self.in_bounds(coord) {
            return None;
        }
        self.cells[self.slot(coord)].as_ref()
    }

    fn is_occupied(&self, coord: GridCoord) -> bool {
        self.cell(coord).is_some()
    }

    /// Every occupied cell, in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (GridCoord, &Cell)> + '_ {
        let columns = self.columns;
        self.cells.iter().enumerate().filter_map(move |(slot, cell)| {
            cell.as_ref().map(|cell| ((slot / columns, slot % columns), cell))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.occupied().next().is_none()
    }

    /// Cells currently holding `glyph`, in the order they were filled.
    pub fn positions_of(&self, glyph: char) -> &[GridCoord] {
        self.char_index.get(&glyph).map(|positions| positions.as_slice()).unwrap_or(&[])
    }

    /// Clear every cell and the glyph index.
    pub fn reset(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = None);
        self.char_index.clear();
    }

    /// Check whether `answer` can go at `placement`. Returns the number of cells it would share
    /// with words already on the grid, or `None` if the placement breaks a rule:
    ///
    /// - the answer has to fit on the grid;
    /// - it may not lie exactly on top of an identical answer;
    /// - the cells just before and after it must be empty, so words never run into each other;
    /// - a cell directly beside it must be empty unless the answer crosses an existing word
    ///   there, so parallel words never touch;
    /// - every cell it shares must hold the same glyph and belong to a word running the other
    ///   way.
    pub fn can_place_answer_at(&self, answer: &[char], placement: Placement) -> Option<usize> {
        let length = answer.len();
        if !placement.fits(length, self.rows, self.columns) {
            return None;
        }

        let is_duplicate = answer.iter().enumerate().all(|(offset, &glyph)| {
            self.cell(placement.cell(offset)).map(|cell| cell.glyph) == Some(glyph)
        });
        if is_duplicate {
            return None;
        }

        let before = placement.before();
        let after = placement.cell(length);
        if before.map(|coord| self.is_occupied(coord)).unwrap_or(false) || self.is_occupied(after) {
            return None;
        }

        let mut intersections = 0;
        for (offset, &glyph) in answer.iter().enumerate() {
            let coord = placement.cell(offset);

            match self.cell(coord) {
                None => {
                    let touches = beside(coord, placement.orientation)
                        .into_iter()
                        .flatten()
                        .any(|neighbour| self.is_occupied(neighbour));
                    if touches {
                        return None;
                    }
                }
                Some(cell) if cell.glyph == glyph && cell.mark(placement.orientation).is_none() => {
                    intersections += 1;
                }
                Some(_) => return None,
            }
        }

        Some(intersections)
    }

    /// Check whether `answer` can be written at `placement` without leaving the grid, changing
    /// a glyph, or sharing a cell with a word running the same way. Unlike
    /// [`Grid::can_place_answer_at`] this ignores the surroundings; see [`Grid::is_clear_around`].
    pub fn can_overlay_answer_at(&self, answer: &[char], placement: Placement) -> bool {
        if !placement.fits(answer.len(), self.rows, self.columns) {
            return false;
        }

        answer.iter().enumerate().all(|(offset, &glyph)| match self.cell(placement.cell(offset)) {
            None => true,
            Some(cell) => cell.glyph == glyph && cell.mark(placement.orientation).is_none(),
        })
    }

    /// For a word already written at `placement`: are the cells before and after it empty, and
    /// is every cell beside it empty wherever it is not crossed by another word?
    pub fn is_clear_around(&self, length: usize, placement: Placement) -> bool {
        let before = placement.before();
        let after = placement.cell(length);
        if before.map(|coord| self.is_occupied(coord)).unwrap_or(false) || self.is_occupied(after) {
            return false;
        }

        let crossing = placement.orientation.perpendicular();
        (0..length).map(|offset| placement.cell(offset)).all(|coord| {
            let crossed = self.cell(coord).and_then(|cell| cell.mark(crossing)).is_some();
            crossed
                || beside(coord, placement.orientation)
                    .into_iter()
                    .flatten()
                    .all(|neighbour| !self.is_occupied(neighbour))
        })
    }

    /// All placements where `answer` crosses a glyph already on the grid. A placement can show
    /// up more than once if the answer crosses the grid at several letters.
    pub fn candidate_placements(&self, answer: &[char]) -> Vec<Placement> {
        let mut candidates = vec![];

        for (offset, &glyph) in answer.iter().enumerate() {
            for &(row, column) in self.positions_of(glyph) {
                let across = column.checked_sub(offset).map(|column| Placement {
                    row,
                    column,
                    orientation: Orientation::Across,
                });
                let down = row.checked_sub(offset).map(|row| Placement {
                    row,
                    column,
                    orientation: Orientation::Down,
                });

                for placement in [across, down].into_iter().flatten() {
                    if self.can_place_answer_at(answer, placement).is_some() {
                        candidates.push(placement);
                    }
                }
            }
        }

        candidates
    }

    /// Pick one of the legal crossing placements for `answer` uniformly at random.
    pub fn find_position_for_word<R: Rng + ?Sized>(
        &self,
        answer: &[char],
        rng: &mut R,
    ) -> Option<Placement> {
        self.candidate_placements(answer).choose(rng).copied()
    }

    /// Write `answer` onto the grid, reusing cells it shares with crossing words. Callers check
    /// the placement with [`Grid::can_place_answer_at`] first.
    pub fn place_answer_at(&mut self, index: WordIndex, answer: &[char], placement: Placement) {
        for (offset, &glyph) in answer.iter().enumerate() {
            let mark = WordMark { is_start_of_word: offset == 0, index };
            self.add_cell(placement.cell(offset), glyph, placement.orientation, mark);
        }
    }

    fn add_cell(&mut self, coord: GridCoord, glyph: char, orientation: Orientation, mark: WordMark) {
        let slot = self.slot(coord);

        if self.cells[slot].is_none() {
            self.cells[slot] = Some(Cell::new(glyph));
            self.char_index.entry(glyph).or_default().push(coord);
        }

        if let Some(cell) = self.cells[slot].as_mut() {
            *cell.mark_mut(orientation) = Some(mark);
        }
    }

    /// Copy the smallest rectangle containing every occupied cell into a new grid of exactly
    /// that size. An empty grid minimizes to 0x0.
    pub fn minimize(&self) -> Grid {
        let bounds = self.occupied().fold(None, |bounds, ((row, column), _)| {
            Some(match bounds {
                None => (row, row, column, column),
                Some((row_min, row_max, column_min, column_max)) => (
                    usize::min(row_min, row),
                    usize::max(row_max, row),
                    usize::min(column_min, column),
                    usize::max(column_max, column),
                ),
            })
        });

        let Some((row_min, row_max, column_min, column_max)) = bounds else {
            return Grid::new(0, 0);
        };

        let mut minimized = Grid::new(row_max - row_min + 1, column_max - column_min + 1);
        for ((row, column), cell) in self.occupied() {
            let coord = (row - row_min, column - column_min);
            let slot = minimized.slot(coord);
            minimized.cells[slot] = Some(cell.clone());
            minimized.char_index.entry(cell.glyph).or_default().push(coord);
        }

        minimized
    }
}

/// One line per row, with `.` for empty cells.
impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = (0..self.rows)
            .map(|row| {
                (0..self.columns)
                    .map(|column| self.cell((row, column)).map(|cell| cell.glyph).unwrap_or('.'))
                    .collect()
            })
            .collect();

        write!(f, "{}", lines.join("\n"))
    }
}
