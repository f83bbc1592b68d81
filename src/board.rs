//! A per-cell solution board rebuilt from an exported [`Layout`], used to validate layouts,
//! print them, place solution-word markers and score answers.

use std::fmt::{Display, Formatter};

use bit_set::BitSet;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::errors::BoardError;
use crate::layout::{Layout, LayoutEntry};
use crate::{ClueId, GridCoord, Orientation};

/// What the board knows about one cell. Empty cells have no solution and no clue ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardCell {
    pub solution: Option<char>,
    /// 1-based position of the letter in the word written last over this cell.
    pub solution_index: Option<usize>,
    pub solution_length: Option<usize>,
    pub clue_id_across: Option<ClueId>,
    pub clue_id_down: Option<ClueId>,
    /// Set on the first cell of a word; the number printed in the corner.
    pub clue_id_marker: Option<ClueId>,
}

impl BoardCell {
    pub fn is_empty(&self) -> bool {
        self.solution.is_none()
    }

    pub fn clue_id(&self, orientation: Orientation) -> Option<ClueId> {
        match orientation {
            Orientation::Across => self.clue_id_across,
            Orientation::Down => self.clue_id_down,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: usize,
    columns: usize,
    cells: Vec<BoardCell>,
    entries: Vec<LayoutEntry>,
}

impl Board {
    /// Lay every entry of `layout` onto a board of its size, failing if an entry leaves the
    /// board or two entries disagree about a letter.
    pub fn from_layout(layout: &Layout) -> Result<Board, BoardError> {
        let rows = layout.rows;
        let columns = layout.cols;
        let mut cells = vec![BoardCell::default(); rows * columns];

        for entry in &layout.result {
            let length = entry.len();
            let Some(placement) = entry.placement_within(rows, columns) else {
                return Err(entry.out_of_bounds(rows, columns));
            };

            for (offset, glyph) in entry.answer.chars().enumerate() {
                let (row, column) = placement.cell(offset);
                let cell = &mut cells[row * columns + column];

                if let Some(existing) = cell.solution.filter(|&existing| existing != glyph) {
                    return Err(BoardError::ConflictingSolution {
                        row,
                        column,
                        existing,
                        incoming: glyph,
                    });
                }

                cell.solution = Some(glyph);
                cell.solution_index = Some(offset + 1);
                cell.solution_length = Some(length);
                match entry.orientation {
                    Orientation::Across => cell.clue_id_across = Some(entry.clue_id),
                    Orientation::Down => cell.clue_id_down = Some(entry.clue_id),
                }
                if offset == 0 {
                    cell.clue_id_marker = Some(entry.clue_id);
                }
            }
        }

        Ok(Board { rows, columns, cells, entries: layout.result.clone() })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[BoardCell] {
        &self.cells
    }

    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    pub fn cell(&self, (row, column): GridCoord) -> Option<&BoardCell> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.cells.get(self.slot((row, column)))
    }

    /// The solution letter at `coord`; `None` for empty cells and coordinates off the board.
    pub fn solution_at(&self, coord: GridCoord) -> Option<char> {
        self.cell(coord).and_then(|cell| cell.solution)
    }

    fn slot(&self, (row, column): GridCoord) -> usize {
        row * self.columns + column
    }

    fn coord(&self, slot: usize) -> GridCoord {
        (slot / self.columns, slot % self.columns)
    }

    /// The cells of the word with `clue_id` running in `orientation`, first letter first. Empty
    /// if there is no such word.
    pub fn entry_cells(&self, clue_id: ClueId, orientation: Orientation) -> Vec<GridCoord> {
        self.entries
            .iter()
            .find(|entry| entry.clue_id == clue_id && entry.orientation == orientation)
            .map(|entry| entry.cells().collect())
            .unwrap_or_default()
    }

    /// Pick a distinct random cell for each character of `solution_word`, matching on the
    /// solution letter. A space without a matching cell is left as a gap (`None`). If any
    /// other character cannot be matched the word does not fit and the result is empty.
    ///
    /// The word is compared as given; callers uppercase it the same way the answers were.
    pub fn find_solution_word_cells<R: Rng + ?Sized>(
        &self,
        solution_word: &str,
        rng: &mut R,
    ) -> Vec<Option<GridCoord>> {
        let mut used = BitSet::with_capacity(self.cells.len());
        let mut result = Vec::new();

        for glyph in solution_word.chars() {
            let candidates: Vec<usize> = self
                .cells
                .iter()
                .enumerate()
                .filter(|&(slot, cell)| cell.solution == Some(glyph) && !used.contains(slot))
                .map(|(slot, _)| slot)
                .collect();

            match candidates.choose(rng) {
                Some(&slot) => {
                    used.insert(slot);
                    result.push(Some(self.coord(slot)));
                }
                None if glyph == ' ' => result.push(None),
                None => {
                    debug!("No free cell for {:?} of solution word {:?}", glyph, solution_word);
                    return vec![];
                }
            }
        }

        result
    }
}

/// One line per row, with `.` for empty cells.
impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = self
            .cells
            .chunks(self.columns.max(1))
            .take(self.rows)
            .map(|row| row.iter().map(|cell| cell.solution.unwrap_or('.')).collect())
            .collect();

        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::board::Board;
    use crate::errors::BoardError;
    use crate::layout::{Layout, LayoutEntry};
    use crate::Orientation::{self, Across, Down};

    fn entry(answer: &str, startx: usize, starty: usize, orientation: Orientation, clue_id: usize) -> LayoutEntry {
        LayoutEntry {
            clue: ["Clue for ", answer].join(""),
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

    #[test]
    fn test_board_from_layout() {
        let board = home_and_mom();

        assert_eq!(board.to_string(), ".M..\nHOME\n.M..");
        assert_eq!(board.solution_at((0, 0)), None);
        assert_eq!(board.solution_at((1, 3)), Some('E'));
        assert_eq!(board.solution_at((7, 7)), None);

        let top = board.cell((0, 1)).unwrap();
        assert_eq!(top.clue_id_marker, Some(1));
        assert_eq!(top.clue_id_down, Some(1));
        assert_eq!(top.clue_id_across, None);

        let crossing = board.cell((1, 1)).unwrap();
        assert_eq!(crossing.solution, Some('O'));
        assert_eq!(crossing.clue_id(Across), Some(2));
        assert_eq!(crossing.clue_id(Down), Some(1));
        assert_eq!(crossing.clue_id_marker, None);
        assert_eq!((crossing.solution_index, crossing.solution_length), (Some(2), Some(4)));
    }

    #[test]
    fn test_entry_cells() {
        let board = home_and_mom();

        assert_eq!(board.entry_cells(2, Across), vec![(1, 0), (1, 1), (1, 2), (1, 3)]);
        assert_eq!(board.entry_cells(1, Down), vec![(0, 1), (1, 1), (2, 1)]);
        assert!(board.entry_cells(2, Down).is_empty());
    }

    #[test]
    fn test_conflicting_letters_are_rejected() {
        let layout = Layout {
            rows: 3,
            cols: 3,
            result: vec![entry("CAT", 1, 1, Across, 1), entry("DOG", 1, 1, Down, 1)],
        };

        assert_eq!(
            Board::from_layout(&layout),
            Err(BoardError::ConflictingSolution { row: 0, column: 0, existing: 'C', incoming: 'D' })
        );
    }

    #[test]
    fn test_entry_off_the_board_is_rejected() {
        let layout = Layout { rows: 1, cols: 3, result: vec![entry("CAT", 2, 1, Across, 1)] };

        assert!(matches!(
            Board::from_layout(&layout),
            Err(BoardError::OutOfBounds { clue_id: 1, orientation: Across, .. })
        ));

        let zero = Layout { rows: 1, cols: 3, result: vec![entry("CAT", 0, 1, Across, 1)] };
        assert!(Board::from_layout(&zero).is_err());

        let far = Layout { rows: 3, cols: 3, result: vec![entry("CAT", usize::MAX, 1, Across, 1)] };
        assert!(matches!(Board::from_layout(&far), Err(BoardError::OutOfBounds { .. })));

        let deep = Layout { rows: 3, cols: 3, result: vec![entry("CAT", 1, usize::MAX - 1, Down, 1)] };
        assert!(matches!(Board::from_layout(&deep), Err(BoardError::OutOfBounds { .. })));
    }

    #[test]
    fn test_solution_word_uses_distinct_cells() {
        let board = home_and_mom();
        let mut rng = StdRng::seed_from_u64(3);

        let cells = board.find_solution_word_cells("MOM", &mut rng);

        assert_eq!(cells.len(), 3);
        let coords: Vec<_> = cells.iter().map(|cell| cell.unwrap()).collect();
        assert_eq!(coords.iter().collect::<HashSet<_>>().len(), 3);
        let letters: String = coords.iter().map(|&coord| board.solution_at(coord).unwrap()).collect();
        assert_eq!(letters, "MOM");
    }

    #[test]
    fn test_solution_word_keeps_gaps_for_spaces() {
        let board = home_and_mom();
        let mut rng = StdRng::seed_from_u64(3);

        let cells = board.find_solution_word_cells("H E", &mut rng);

        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0], Some((1, 0)));
        assert_eq!(cells[1], None);
        assert_eq!(cells[2], Some((1, 3)));
    }

    #[test]
    fn test_solution_word_that_does_not_fit() {
        let board = home_and_mom();
        let mut rng = StdRng::seed_from_u64(3);

        // Only three cells hold an M.
        assert!(board.find_solution_word_cells("MMMM", &mut rng).is_empty());
        assert!(board.find_solution_word_cells("MAX", &mut rng).is_empty());
        assert!(board.find_solution_word_cells("", &mut rng).is_empty());
    }
}
