//! Input words and the preprocessing applied to them before layout.

use std::cmp::Reverse;

use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::errors::InputError;
use crate::generator::GeneratorConfig;
use crate::grid::Placement;
use crate::{Orientation, WordIndex, MAX_INLINE_ANSWER_LENGTH, MIN_POOL_SIZE};

/// A character that should be uppercased to something other than what `char::to_uppercase`
/// gives, e.g. `ß` to `ẞ` rather than `SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseException {
    pub lower_case: char,
    pub upper_case: char,
}

pub fn default_uppercase_exceptions() -> Vec<CaseException> {
    vec![CaseException { lower_case: 'ß', upper_case: '\u{1e9e}' }]
}

/// Uppercase `text`, mapping any character listed in `exceptions` to its given replacement
/// instead.
pub fn to_upper_case(text: &str, exceptions: &[CaseException]) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match exceptions.iter().find(|exception| exception.lower_case == c) {
            Some(exception) => result.push(exception.upper_case),
            None => result.extend(c.to_uppercase()),
        }
    }

    result
}

/// A word as it appears in a puzzle description. Fixed placements use 1-based coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub clue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_clue: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    /// Set to `false` to keep the coordinates on record but lay the word out freely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_word: Option<bool>,
}

/// A word to lay out, with an optional fixed placement in 0-based coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub answer: String,
    pub clue: String,
    pub extra_clue: Option<Value>,
    pub placement: Option<Placement>,
}

impl Word {
    pub fn new(answer: &str, clue: &str) -> Word {
        Word {
            answer: answer.to_string(),
            clue: clue.to_string(),
            extra_clue: None,
            placement: None,
        }
    }

    /// A word that must go exactly at `placement`.
    pub fn fixed(answer: &str, clue: &str, placement: Placement) -> Word {
        Word { placement: Some(placement), ..Word::new(answer, clue) }
    }

    /// Convert a puzzle description entry, checking that a fixed placement is complete and uses
    /// 1-based coordinates. `index` is only used for error messages.
    pub fn from_entry(index: usize, entry: WordEntry) -> Result<Word, InputError> {
        let placement = match (entry.row, entry.column, entry.orientation) {
            (None, None, None) => None,
            (Some(row), Some(column), Some(orientation)) => {
                if row == 0 || column == 0 {
                    return Err(InputError::ZeroCoordinate {
                        index,
                        answer: entry.answer,
                        row,
                        column,
                    });
                }

                if entry.fix_word == Some(false) {
                    None
                } else {
                    Some(Placement { row: row - 1, column: column - 1, orientation })
                }
            }
            _ => {
                return Err(InputError::IncompletePlacement { index, answer: entry.answer });
            }
        };

        Ok(Word {
            answer: entry.answer,
            clue: entry.clue,
            extra_clue: entry.extra_clue,
            placement,
        })
    }
}

/// Convert every entry of a puzzle description, failing on the first invalid one.
pub fn words_from_entries(entries: Vec<WordEntry>) -> Result<Vec<Word>, InputError> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| Word::from_entry(index, entry))
        .collect()
}

/// A complete puzzle description: the words plus generator settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleInput {
    pub words: Vec<WordEntry>,
    #[serde(default)]
    pub config: GeneratorConfig,
    /// Optional word whose letters get marked on cells of the finished board.
    #[serde(default)]
    pub solution_word: Option<String>,
}

impl PuzzleInput {
    pub fn from_json(text: &str) -> Result<PuzzleInput, InputError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn into_parts(self) -> Result<(Vec<Word>, GeneratorConfig), InputError> {
        Ok((words_from_entries(self.words)?, self.config))
    }
}

/// A word that made it through preprocessing, with its answer uppercased and split into glyphs.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolWord {
    pub index: WordIndex,
    pub answer: String,
    pub glyphs: SmallVec<[char; MAX_INLINE_ANSWER_LENGTH]>,
    pub clue: String,
    pub extra_clue: Option<Value>,
    pub placement: Option<Placement>,
}

impl PoolWord {
    fn new(index: WordIndex, word: Word, exceptions: &[CaseException]) -> PoolWord {
        let answer = to_upper_case(&word.answer, exceptions);
        let glyphs = answer.chars().collect();

        PoolWord {
            index,
            answer,
            glyphs,
            clue: word.clue,
            extra_clue: word.extra_clue,
            placement: word.placement,
        }
    }

    /// Length of the answer in glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn is_fixed(&self) -> bool {
        self.placement.is_some()
    }
}

/// Drop words without an answer or a clue, uppercase the rest and number them by their position
/// in the filtered list.
pub fn prepare_words(words: Vec<Word>, exceptions: &[CaseException]) -> Vec<PoolWord> {
    words
        .into_iter()
        .filter(|word| {
            let complete = !word.answer.is_empty() && !word.clue.is_empty();
            if !complete {
                warn!("Dropping word without answer or clue: {:?} / {:?}", word.answer, word.clue);
            }
            complete
        })
        .enumerate()
        .map(|(index, word)| PoolWord::new(index, word, exceptions))
        .collect()
}

/// Choose which words take part in the layout and in what order.
///
/// With a pool size, every fixed word is kept and the free words are shuffled and cut so that
/// the total does not exceed it. The result lists fixed words first, then the remaining words
/// from longest to shortest, since long answers offer the most crossing opportunities.
pub fn select_pool<R: Rng + ?Sized>(
    words: &[PoolWord],
    pool_size: Option<usize>,
    rng: &mut R,
) -> Vec<WordIndex> {
    let pool_size = pool_size.filter(|&size| size > 0).map(|size| size.max(MIN_POOL_SIZE));

    let (mut pool, mut free): (Vec<WordIndex>, Vec<WordIndex>) =
        words.iter().map(|word| word.index).partition(|&index| words[index].is_fixed());

    if let Some(pool_size) = pool_size {
        free.shuffle(rng);
        free.truncate(pool_size.saturating_sub(pool.len()));
    }

    pool.extend(free);
    pool.sort_by_key(|&index| (!words[index].is_fixed(), Reverse(words[index].len())));

    pool
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    use crate::errors::InputError;
    use crate::grid::Placement;
    use crate::word::{
        default_uppercase_exceptions, prepare_words, select_pool, to_upper_case, CaseException,
        PuzzleInput, Word, WordEntry,
    };
    use crate::Orientation::{Across, Down};

    #[test]
    fn test_uppercase_keeps_sharp_s() {
        assert_eq!(to_upper_case("straße", &default_uppercase_exceptions()), "STRAẞE");
        assert_eq!(to_upper_case("straße", &[]), "STRASSE");
    }

    #[test]
    fn test_uppercase_custom_exception() {
        let exceptions = [CaseException { lower_case: 'i', upper_case: 'İ' }];

        assert_eq!(to_upper_case("istanbul", &exceptions), "İSTANBUL");
    }

    #[test]
    fn test_prepare_words_drops_incomplete_and_reindexes() {
        let words = prepare_words(
            vec![
                Word::new("apple", "Fruit"),
                Word::new("", "No answer"),
                Word::new("pear", ""),
                Word::new("plum", "Another fruit"),
            ],
            &default_uppercase_exceptions(),
        );

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].answer, "APPLE");
        assert_eq!(words[0].index, 0);
        assert_eq!(words[1].answer, "PLUM");
        assert_eq!(words[1].index, 1);
        assert_eq!(words[1].glyphs.as_slice(), &['P', 'L', 'U', 'M']);
    }

    #[test]
    fn test_pool_orders_fixed_then_longest() {
        let words = prepare_words(
            vec![
                Word::new("ox", "Animal"),
                Word::new("giraffe", "Animal"),
                Word::fixed("cat", "Animal", Placement { row: 0, column: 0, orientation: Across }),
                Word::new("horse", "Animal"),
            ],
            &[],
        );
        let mut rng = StdRng::seed_from_u64(3);

        let pool = select_pool(&words, None, &mut rng);

        assert_eq!(pool, vec![2, 1, 3, 0]);
    }

    #[test]
    fn test_pool_size_zero_uses_every_word() {
        let words = prepare_words(
            (0..6).map(|i| Word::new(&"a".repeat(i + 1), "Clue")).collect(),
            &[],
        );
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(select_pool(&words, Some(0), &mut rng).len(), 6);
        assert_eq!(select_pool(&words, None, &mut rng).len(), 6);
    }

    #[test]
    fn test_pool_size_is_at_least_two() {
        let words = prepare_words(
            (0..6).map(|i| Word::new(&"a".repeat(i + 1), "Clue")).collect(),
            &[],
        );
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(select_pool(&words, Some(1), &mut rng).len(), 2);
        assert_eq!(select_pool(&words, Some(4), &mut rng).len(), 4);
    }

    #[test]
    fn test_pool_size_keeps_every_fixed_word() {
        let fixed = |answer: &str, row: usize| {
            Word::fixed(answer, "Clue", Placement { row, column: 0, orientation: Across })
        };
        let words = prepare_words(
            vec![
                Word::new("free", "Clue"),
                fixed("one", 0),
                fixed("two", 2),
                fixed("three", 4),
                Word::new("loose", "Clue"),
            ],
            &[],
        );
        let mut rng = StdRng::seed_from_u64(3);

        let pool = select_pool(&words, Some(2), &mut rng);

        assert_eq!(pool.len(), 3);
        assert!(pool.iter().all(|&index| words[index].is_fixed()));
    }

    #[test]
    fn test_entry_with_full_placement_is_fixed() {
        let entry: WordEntry = serde_json::from_value(json!({
            "answer": "tree",
            "clue": "Grows in a forest",
            "row": 3,
            "column": 1,
            "orientation": "down"
        }))
        .unwrap();

        let word = Word::from_entry(0, entry).unwrap();

        assert_eq!(word.placement, Some(Placement { row: 2, column: 0, orientation: Down }));
    }

    #[test]
    fn test_entry_with_fix_word_disabled_is_free() {
        let entry: WordEntry = serde_json::from_value(json!({
            "answer": "tree",
            "clue": "Grows in a forest",
            "row": 3,
            "column": 1,
            "orientation": "down",
            "fixWord": false
        }))
        .unwrap();

        assert_eq!(Word::from_entry(0, entry).unwrap().placement, None);
    }

    #[test]
    fn test_entry_with_partial_placement_is_rejected() {
        let entry = WordEntry {
            answer: "tree".to_string(),
            clue: "Grows in a forest".to_string(),
            row: Some(3),
            ..WordEntry::default()
        };

        assert!(matches!(
            Word::from_entry(4, entry),
            Err(InputError::IncompletePlacement { index: 4, .. })
        ));
    }

    #[test]
    fn test_entry_with_zero_coordinate_is_rejected() {
        let entry = WordEntry {
            answer: "tree".to_string(),
            clue: "Grows in a forest".to_string(),
            row: Some(0),
            column: Some(2),
            orientation: Some(Across),
            ..WordEntry::default()
        };

        assert!(matches!(Word::from_entry(0, entry), Err(InputError::ZeroCoordinate { .. })));
    }

    #[test]
    fn test_puzzle_input_from_json() {
        let input = PuzzleInput::from_json(
            r#"{
                "words": [
                    { "answer": "sun", "clue": "Star", "extraClue": { "image": "sun.png" } },
                    { "answer": "moon", "clue": "Satellite" }
                ],
                "config": { "poolSize": 2, "seed": 11 }
            }"#,
        )
        .unwrap();

        let (words, config) = input.into_parts().unwrap();

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].extra_clue, Some(json!({ "image": "sun.png" })));
        assert_eq!(config.pool_size, Some(2));
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.grid_rows, crate::GRID_ROWS);
    }

    #[test]
    fn test_puzzle_input_rejects_bad_json() {
        assert!(matches!(PuzzleInput::from_json("{ \"words\": 3 }"), Err(InputError::Json(_))));
    }
}
