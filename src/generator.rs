//! The layout generator: lays a pool of words onto the canvas in waves, retrying from scratch
//! when a build gets stuck, and keeps the squarest grid it manages to build.

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;

use crate::grid::{Grid, Placement};
use crate::layout::{export, Layout};
use crate::word::{default_uppercase_exceptions, prepare_words, select_pool, CaseException, PoolWord, Word};
use crate::{Orientation, WordIndex, GRID_COLUMNS, GRID_ROWS, GRID_TRIES, SQUARE_GRID_TRIES};

/// Settings for a [`LayoutGenerator`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// Randomly limit the number of words in the puzzle. Fixed words are always kept. `None` or
    /// 0 uses every word; anything else is raised to at least 2.
    pub pool_size: Option<usize>,
    pub grid_rows: usize,
    pub grid_columns: usize,
    /// How many complete grids to build while looking for the squarest one.
    pub square_tries: usize,
    /// How many times a single grid build starts over before giving up.
    pub grid_tries: usize,
    /// Seed for the random source. Without one the generator seeds from the OS.
    pub seed: Option<u64>,
    pub uppercase_exceptions: Vec<CaseException>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            pool_size: None,
            grid_rows: GRID_ROWS,
            grid_columns: GRID_COLUMNS,
            square_tries: SQUARE_GRID_TRIES,
            grid_tries: GRID_TRIES,
            seed: None,
            uppercase_exceptions: default_uppercase_exceptions(),
        }
    }
}

/// A struct tracking statistics about the generation process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// From-scratch attempts across all grid builds.
    pub attempts: u64,
    /// Grid builds that placed every word.
    pub grids_built: u64,
    pub waves: u64,
    /// `min(rows, columns) / max(rows, columns)` of the grid that was kept.
    pub best_ratio: Option<f64>,
    pub duration: Duration,
}

/// The words could not be laid out. `bad_words` holds the words left over by the last failed
/// build; it is a sample of the problem rather than a complete diagnosis, and may be empty when
/// there were too few words to cross at all.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("could not fit the words into a crossword{}", describe_bad_words(.bad_words))]
pub struct GenerationFailure {
    pub bad_words: Vec<PoolWord>,
}

fn describe_bad_words(bad_words: &[PoolWord]) -> String {
    if bad_words.is_empty() {
        return String::new();
    }

    let answers: Vec<&str> = bad_words.iter().map(|word| word.answer.as_str()).collect();
    [" (problematic words: ", &answers.join(", "), ")"].join("")
}

/// Builds a crossword layout for one set of words. The grid and its glyph index are owned and
/// reset at the start of every attempt; a generator is meant to be used for a single puzzle.
pub struct LayoutGenerator<R: Rng = StdRng> {
    config: GeneratorConfig,
    /// Every word that survived preprocessing, indexed by `WordIndex`.
    words: Vec<PoolWord>,
    /// The words taking part in the layout, in placement order.
    pool: Vec<WordIndex>,
    grid: Grid,
    /// Waves of words still to place; a word that does not fit rolls into the next wave.
    groups: Vec<Vec<WordIndex>>,
    bad_words: Vec<WordIndex>,
    /// Set when the last build failed on a fixed word. Retrying cannot change that outcome.
    fixed_word_clash: bool,
    statistics: Statistics,
    rng: R,
}

impl LayoutGenerator<StdRng> {
    pub fn new(words: Vec<Word>, config: GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        LayoutGenerator::with_rng(words, config, rng)
    }
}

impl<R: Rng> LayoutGenerator<R> {
    /// Create a generator drawing its randomness from `rng`. The pool is chosen here, so the
    /// same words, config and seeded `rng` always produce the same layout.
    pub fn with_rng(words: Vec<Word>, config: GeneratorConfig, mut rng: R) -> Self {
        let words = prepare_words(words, &config.uppercase_exceptions);
        let pool = select_pool(&words, config.pool_size, &mut rng);
        let grid = Grid::new(config.grid_rows, config.grid_columns);

        debug!("Prepared {} words, {} in the pool", words.len(), pool.len());

        LayoutGenerator {
            config,
            words,
            pool,
            grid,
            groups: vec![],
            bad_words: vec![],
            fixed_word_clash: false,
            statistics: Statistics::default(),
            rng,
        }
    }

    pub fn words(&self) -> &[PoolWord] {
        &self.words
    }

    /// The words taking part in the layout, in the order they are placed.
    pub fn pool(&self) -> impl Iterator<Item = &PoolWord> + '_ {
        self.pool.iter().map(|&index| &self.words[index])
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Words that could not be placed by the last failed build. Empty after a success.
    pub fn bad_words(&self) -> Vec<&PoolWord> {
        self.bad_words.iter().map(|&index| &self.words[index]).collect()
    }

    /// Build the squarest grid the configured budgets allow and export it.
    pub fn generate(&mut self) -> Result<Layout, GenerationFailure> {
        let start = Instant::now();

        let result = match self.build_square_grid(self.config.square_tries) {
            Some(grid) => Ok(self.export(&grid)),
            None => Err(GenerationFailure {
                bad_words: self.bad_words().into_iter().cloned().collect(),
            }),
        };

        self.statistics.duration = start.elapsed();
        debug!("{:?}", self.statistics);

        result
    }

    /// Build up to `max_tries` grids and keep the one closest to square, stopping early on a
    /// perfect square, or giving up at once when a fixed word cannot go where it was asked for.
    /// Returns `None` if no build succeeded; [`LayoutGenerator::bad_words`] then holds the words
    /// left over by the last one.
    pub fn build_square_grid(&mut self, max_tries: usize) -> Option<Grid> {
        let mut best: Option<(Grid, f64)> = None;

        for _ in 0..max_tries {
            let Some(grid) = self.build_grid(self.config.grid_tries) else {
                if self.fixed_word_clash {
                    break;
                }
                continue;
            };

            let ratio = aspect_ratio(&grid);
            if best.as_ref().map(|&(_, best_ratio)| ratio > best_ratio).unwrap_or(true) {
                best = Some((grid, ratio));
            }

            if ratio >= 1.0 {
                break;
            }
        }

        match best {
            Some((grid, ratio)) => {
                info!("Built a {}x{} grid", grid.rows(), grid.columns());
                self.bad_words.clear();
                self.statistics.best_ratio = Some(ratio);
                Some(grid)
            }
            None => {
                warn!("Could not build a grid from {} words", self.pool.len());
                None
            }
        }
    }

    /// Build a single grid, starting over up to `max_tries` times, and return it cropped to its
    /// occupied area.
    ///
    /// Fixed words go first, exactly where they were asked for; if one of them cannot go there
    /// the build fails straight away with that word as the only bad word. Without fixed words the
    /// first (longest) word is centered on the canvas in a random orientation. The remaining
    /// words are then placed in waves, each at a random legal crossing. The build succeeds once
    /// every word is placed and gives up on an attempt when a wave places nothing.
    pub fn build_grid(&mut self, max_tries: usize) -> Option<Grid> {
        self.groups.clear();
        self.bad_words.clear();
        self.fixed_word_clash = false;

        if self.pool.is_empty() {
            warn!("No words to place");
            return None;
        }

        let fixed: Vec<(WordIndex, Placement)> = self
            .pool
            .iter()
            .filter_map(|&index| self.words[index].placement.map(|placement| (index, placement)))
            .collect();

        for attempt in 0..max_tries {
            self.statistics.attempts += 1;
            self.grid.reset();

            let mut placed = BitSet::with_capacity(self.words.len());

            if !fixed.is_empty() {
                if let Err(index) = self.place_fixed_words(&fixed, &mut placed) {
                    warn!(
                        "Fixed word {} cannot be placed at {:?}",
                        self.words[index].answer, self.words[index].placement
                    );
                    self.bad_words = vec![index];
                    self.fixed_word_clash = true;
                    return None;
                }

                if fixed.len() == self.pool.len() {
                    self.statistics.grids_built += 1;
                    return Some(self.grid.minimize());
                }
            } else {
                let index = self.pool[0];
                let placement = self.seed_placement(index);

                if self.grid.can_place_answer_at(&self.words[index].glyphs, placement).is_none() {
                    warn!("First word {} does not fit on the canvas", self.words[index].answer);
                    self.bad_words = vec![index];
                    return None;
                }
                self.grid.place_answer_at(index, &self.words[index].glyphs, placement);
                placed.insert(index);
            }

            let first_free = fixed.len().max(1);
            self.groups = vec![self.pool[first_free..].to_vec()];

            let mut word_was_added = false;
            let mut group_id = 0;
            while group_id < self.groups.len() {
                self.statistics.waves += 1;
                word_was_added = false;

                for position in 0..self.groups[group_id].len() {
                    let index = self.groups[group_id][position];

                    match self.grid.find_position_for_word(&self.words[index].glyphs, &mut self.rng) {
                        Some(placement) => {
                            self.grid.place_answer_at(index, &self.words[index].glyphs, placement);
                            placed.insert(index);
                            word_was_added = true;
                        }
                        None => {
                            if self.groups.len() == group_id + 1 {
                                self.groups.push(vec![]);
                            }
                            self.groups[group_id + 1].push(index);
                        }
                    }
                }

                // A wave without progress means nothing later can change.
                if !word_was_added {
                    break;
                }
                group_id += 1;
            }

            if word_was_added {
                debug_assert_eq!(placed.len(), self.pool.len());
                self.statistics.grids_built += 1;
                return Some(self.grid.minimize());
            }

            debug!(
                "Attempt {} placed {} of {} words after {} waves",
                attempt + 1,
                placed.len(),
                self.pool.len(),
                self.groups.len()
            );
        }

        self.bad_words = self.groups.last().cloned().unwrap_or_default();
        None
    }

    /// Place every fixed word at its requested position. All of them go down first and are then
    /// checked against the finished neighbourhood, so the result does not depend on the order
    /// they are listed in. Fails with the first word that clashes or touches a neighbour.
    fn place_fixed_words(
        &mut self,
        fixed: &[(WordIndex, Placement)],
        placed: &mut BitSet,
    ) -> Result<(), WordIndex> {
        for &(index, placement) in fixed {
            let glyphs = &self.words[index].glyphs;
            if !self.grid.can_overlay_answer_at(glyphs, placement) {
                return Err(index);
            }
            self.grid.place_answer_at(index, glyphs, placement);
            placed.insert(index);
        }

        for &(index, placement) in fixed {
            if !self.grid.is_clear_around(self.words[index].len(), placement) {
                return Err(index);
            }
        }

        Ok(())
    }

    /// Center `index` on the canvas in a random orientation.
    fn seed_placement(&mut self, index: WordIndex) -> Placement {
        let length = self.words[index].len();
        let orientation = Orientation::random(&mut self.rng);

        let mut row = self.grid.rows() / 2;
        let mut column = self.grid.columns() / 2;
        match orientation {
            Orientation::Across => column = column.saturating_sub(length / 2),
            Orientation::Down => row = row.saturating_sub(length / 2),
        }

        Placement { row, column, orientation }
    }

    /// Export a grid built by this generator.
    pub fn export(&self, grid: &Grid) -> Layout {
        export(grid, &self.words)
    }
}

fn aspect_ratio(grid: &Grid) -> f64 {
    let longest = grid.rows().max(grid.columns());
    if longest == 0 {
        return 0.0;
    }
    grid.rows().min(grid.columns()) as f64 / longest as f64
}
