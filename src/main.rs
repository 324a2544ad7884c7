use clap::Parser;
use crossfill::backtracking_search::ValueOrdering;
use crossfill::render::render_grid;
use crossfill::template::generate_puzzle_from_template_string;
use crossfill::{find_fill, FillFailure, FillOptions};
use log::info;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

fn parse_value_ordering(arg: &str) -> Result<ValueOrdering, String> {
    match arg {
        "least-constraining" => Ok(ValueOrdering::LeastConstraining),
        "domain-membership" => Ok(ValueOrdering::DomainMembership),
        _ => Err(format!(
            "unknown value ordering {:?}, expected least-constraining or domain-membership",
            arg
        )),
    }
}

/// Fill a crossword structure with words from a word list.
#[derive(Debug, Parser)]
#[command(name = "crossfill")]
struct Args {
    /// Grid structure file: `_` or `.` marks a fillable cell, anything else is a block
    structure: PathBuf,

    /// Word list, one word per line
    words: PathBuf,

    /// Also write the filled grid to this file, as text in the same format that's printed
    output: Option<PathBuf>,

    /// Give up after trying this many assignments
    #[arg(long)]
    max_states: Option<u64>,

    /// Candidate order: least-constraining or domain-membership
    #[arg(long, default_value = "least-constraining", value_parser = parse_value_ordering)]
    value_ordering: ValueOrdering,
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let structure = fs::read_to_string(&args.structure)?;
    let words = fs::read_to_string(&args.words)?;
    let puzzle = generate_puzzle_from_template_string(&structure, &words)?;
    info!(
        "Loaded {}x{} grid with {} slots and {} words",
        puzzle.height(),
        puzzle.width(),
        puzzle.slot_count(),
        puzzle.vocabulary().len()
    );

    let options = FillOptions {
        value_ordering: args.value_ordering,
        max_states: args.max_states,
    };

    match find_fill(&puzzle, &options) {
        Ok(result) => {
            info!("{:?}", result.statistics);
            let display_grid = render_grid(&puzzle, &result.assignment);
            println!("{}", display_grid);

            if let Some(output) = &args.output {
                fs::write(output, display_grid + "\n")?;
                info!("Wrote grid to {}", output.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(FillFailure::Unsatisfiable) => {
            println!("No solution.");
            Ok(ExitCode::SUCCESS)
        }
        Err(FillFailure::ExhaustedStateLimit) => {
            eprintln!("Gave up after {} states.", options.max_states.unwrap_or_default());
            Ok(ExitCode::from(2))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_value_ordering, Args};
    use clap::Parser;
    use crossfill::backtracking_search::ValueOrdering;

    #[test]
    fn test_value_ordering_argument() {
        let args = Args::try_parse_from(["crossfill", "grid.txt", "words.txt"]).unwrap();
        assert_eq!(args.value_ordering, ValueOrdering::LeastConstraining);

        let args = Args::try_parse_from([
            "crossfill",
            "grid.txt",
            "words.txt",
            "--value-ordering",
            "domain-membership",
        ])
        .unwrap();
        assert_eq!(args.value_ordering, ValueOrdering::DomainMembership);

        assert!(parse_value_ordering("most-constraining").is_err());
    }
}
