use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use placegrid::word::to_upper_case;
use placegrid::{Board, Layout, LayoutGenerator, Orientation, PuzzleInput};

/// Lay out a crossword from a JSON puzzle description
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Puzzle description: `{ "words": [...], "config": {...}, "solutionWord": "..." }`.
    /// Reads stdin when omitted or `-`
    input: Option<PathBuf>,

    /// Randomly limit the number of words used (fixed words are always kept)
    #[arg(short, long)]
    pool_size: Option<usize>,

    /// Number of complete grids to build while looking for the squarest one
    #[arg(long)]
    square_tries: Option<usize>,

    /// Number of from-scratch retries for a single grid
    #[arg(long)]
    grid_tries: Option<usize>,

    /// Seed for reproducible layouts
    #[arg(short, long)]
    seed: Option<u64>,

    /// Rows of the working canvas
    #[arg(long)]
    rows: Option<usize>,

    /// Columns of the working canvas
    #[arg(long)]
    columns: Option<usize>,

    /// Word whose letters get marked on cells of the finished board
    #[arg(long)]
    solution_word: Option<String>,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// The board followed by the clue list
    Text,
    /// The layout as JSON
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    placegrid::logging::init_logger(cli.debug);

    if let Err(e) = try_main(cli) {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main(cli: Cli) -> Result<(), Box<dyn Error>> {
    let text = match &cli.input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)?,
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let input = PuzzleInput::from_json(&text)?;
    let solution_word = cli.solution_word.clone().or_else(|| input.solution_word.clone());
    let (words, mut config) = input.into_parts()?;

    if let Some(pool_size) = cli.pool_size {
        config.pool_size = Some(pool_size);
    }
    if let Some(square_tries) = cli.square_tries {
        config.square_tries = square_tries;
    }
    if let Some(grid_tries) = cli.grid_tries {
        config.grid_tries = grid_tries;
    }
    if let Some(rows) = cli.rows {
        config.grid_rows = rows;
    }
    if let Some(columns) = cli.columns {
        config.grid_columns = columns;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let seed = config.seed;
    let exceptions = config.uppercase_exceptions.clone();

    let mut generator = LayoutGenerator::new(words, config);
    let layout = generator.generate()?;

    let statistics = generator.statistics();
    info!(
        "Laid out {} entries on a {}x{} grid in {:.3}s ({} attempts)",
        layout.result.len(),
        layout.rows,
        layout.cols,
        statistics.duration.as_secs_f64(),
        statistics.attempts
    );

    let rendered = match cli.format {
        Format::Json => serde_json::to_string_pretty(&layout)?,
        Format::Text => {
            let board = Board::from_layout(&layout)?;
            let solution_word = solution_word.map(|word| to_upper_case(&word, &exceptions));
            render_text(&layout, &board, solution_word.as_deref(), seed)
        }
    };

    match cli.output {
        Some(path) => fs::write(path, rendered + "\n")?,
        None => println!("{}", rendered),
    }

    Ok(())
}

fn render_text(layout: &Layout, board: &Board, solution_word: Option<&str>, seed: Option<u64>) -> String {
    let mut lines = vec![board.to_string()];

    for orientation in [Orientation::Across, Orientation::Down] {
        lines.push(String::new());
        lines.push(if orientation == Orientation::Across { "Across" } else { "Down" }.to_string());

        for entry in layout.result.iter().filter(|entry| entry.orientation == orientation) {
            lines.push(format!("{:>3}. {} ({})", entry.clue_id, entry.clue, entry.len()));
        }
    }

    if let Some(solution_word) = solution_word.filter(|word| !word.is_empty()) {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let cells = board.find_solution_word_cells(solution_word, &mut rng);
        if cells.is_empty() {
            warn!("Solution word {} does not fit on the board", solution_word);
        } else {
            lines.push(String::new());
            lines.push(["Solution word: ", solution_word].join(""));
            for (position, cell) in cells.iter().enumerate() {
                if let Some((row, column)) = cell {
                    lines.push(format!("{:>3}. row {}, column {}", position + 1, row + 1, column + 1));
                }
            }
        }
    }

    lines.join("\n")
}
