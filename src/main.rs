//! cardql - search a Scryfall card dump from the command line.
//!
//! ## Usage
//!
//! ```text
//! cardql [OPTIONS] <QUERY>...
//!
//! Options:
//!   --cards <PATH>   Card corpus (JSON array), env CARDQL_CARDS [default: cards.json]
//!   --limit <N>      Print at most N matches
//!   --explain        Print the parsed query instead of searching
//!   --json           Print matching card records as JSON
//!   --all-errors     Report every parse error, not just the first
//!   --parallel       Scan the corpus on all cores
//!   --label          Show each match's color identity label
//! ```
//!
//! Query words are joined with spaces, so `cardql t:creature c<=wu` and
//! `cardql "t:creature c<=wu"` are the same search.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use cardql::{
    CardRecord, ParseError, ParserSettings, Query, SearchSettings, color_identity_label,
    load_cards, parse_with, search_with,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Search a card corpus with Scryfall-style queries")]
struct Cli {
    /// Query text, e.g. `t:creature c<=wu mv<=3`.
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,

    /// Card corpus to search.
    #[arg(long, env = "CARDQL_CARDS", default_value = "cards.json")]
    cards: PathBuf,

    /// Print at most this many matches.
    #[arg(long)]
    limit: Option<usize>,

    /// Print the parsed query and exit.
    #[arg(long)]
    explain: bool,

    /// Print matching records as JSON.
    #[arg(long)]
    json: bool,

    /// Keep parsing past errors and report all of them.
    #[arg(long)]
    all_errors: bool,

    /// Evaluate cards in parallel.
    #[arg(long)]
    parallel: bool,

    /// Show the color identity label next to each name.
    #[arg(long)]
    label: bool,
}

fn report_errors(input: &str, errors: &[ParseError]) {
    for error in errors {
        eprintln!("error[{}]: {}", error.kind, error.message);
        eprintln!("{}", error.caret(input));
    }
}

fn parse_query(cli: &Cli, input: &str) -> Option<Query> {
    let mut settings = ParserSettings::from_env();
    settings.recover |= cli.all_errors;

    let outcome = parse_with(input, &settings);
    if !outcome.errors.is_empty() {
        let shown = if settings.recover {
            &outcome.errors[..]
        } else {
            &outcome.errors[..1]
        };
        report_errors(input, shown);
        return None;
    }
    outcome.query
}

fn print_matches(cli: &Cli, matches: &[&CardRecord]) -> Result<(), Box<dyn Error>> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(matches)?);
        return Ok(());
    }
    for card in matches {
        if cli.label {
            println!(
                "{} [{}] ({})",
                card.name,
                card.set_code.to_uppercase(),
                color_identity_label(card.color_identity)
            );
        } else {
            println!("{} [{}]", card.name, card.set_code.to_uppercase());
        }
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn Error>> {
    let input = cli.query.join(" ");
    let Some(query) = parse_query(cli, &input) else {
        return Ok(ExitCode::from(2));
    };

    if cli.explain {
        println!("{query}");
        println!("{query:#?}");
        return Ok(ExitCode::SUCCESS);
    }

    let cards = load_cards(&cli.cards)?;
    let settings = SearchSettings {
        parallel: cli.parallel,
        limit: cli.limit,
    };
    let matches = search_with(&query, &cards, &settings);
    print_matches(cli, &matches)?;
    eprintln!("{} of {} cards matched", matches.len(), cards.len());

    Ok(if matches.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();
    run(&cli)
}
