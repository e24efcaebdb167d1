use std::io::{self, BufRead, BufWriter, ErrorKind, Write};

use anyhow::Result;
use clap::Parser;

use fuzzymatch::{Algorithm, MatchConfig, PreparedQuery, SmithWatermanConfig, make_buffer, score};

/// Filter stdin line by line, printing the lines that fuzzy-match the query.
/// Output preserves input order.
#[derive(Parser)]
#[command(name = "fuzzygrep", version, about)]
struct Args {
    /// Query to match lines against
    query: String,

    /// Use the Smith-Waterman local-alignment engine
    #[arg(long)]
    sw: bool,

    /// Minimum score in [0, 1]; lines scoring below are dropped
    #[arg(long, default_value_t = 0.85, value_parser = parse_score)]
    score: f64,
}

fn parse_score(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("score must be in [0, 1], got {value}"))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let algorithm = if args.sw {
        Algorithm::SmithWaterman(SmithWatermanConfig::default())
    } else {
        Algorithm::default()
    };
    let query = PreparedQuery::with_config(
        &args.query,
        MatchConfig {
            min_score: args.score,
            algorithm,
        },
    );
    let mut buffer = make_buffer();

    let stdin = io::stdin().lock();
    let mut stdout = BufWriter::new(io::stdout().lock());

    for line in stdin.lines() {
        let line = line?;
        if score(&line, &query, &mut buffer).is_some() {
            // A pager closing the pipe downstream is a normal way to stop.
            match writeln!(stdout, "{line}") {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => return Ok(()),
                other => other?,
            }
        }
    }

    match stdout.flush() {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => Ok(other?),
    }
}
