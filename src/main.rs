// LexyVocab - main.rs
// Terminal front end: deck management and an interactive study pass.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use log::info;

use lexyvocab::deck::confidence_to_five_point;
use lexyvocab::stats::StudyStats;
use lexyvocab::storage::{JsonFileStore, ReviewJournal, SqliteCardStore};
use lexyvocab::{Card, CardStore, Config, Deck, DeckId, Outcome, StudySession};

const USAGE: &str = "Usage: lexyvocab <store.db|store.json> <command>

Commands:
  decks                                   list decks
  new-deck <name>                         create a deck
  delete-deck <deck-id>                   delete a deck and its cards
  add <deck-id> <front> <hint> <example>  add a card
  stats                                   show study statistics
  study <deck-id>                         start a study pass";

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    }

    match run(Path::new(&args[1]), &args[2], &args[3..]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(store_path: &Path, command: &str, rest: &[String]) -> CliResult<()> {
    let config = match env::var_os("LEXYVOCAB_CONFIG") {
        Some(path) => Config::load(Path::new(&path))?,
        None => Config::new(),
    };
    let mut store = open_store(store_path)?;

    match (command, rest) {
        ("decks", []) => {
            let decks = store.list_decks()?;
            if decks.is_empty() {
                println!("No decks yet. Create one with `new-deck <name>`.");
            }
            for deck in decks {
                let count = store.cards_in_deck(deck.id)?.len();
                println!("{}  {} ({} cards)", deck.id, deck.name, count);
            }
        }
        ("new-deck", [name]) => {
            let deck = Deck::new(name.clone());
            store.save_deck(&deck)?;
            println!("{}", deck.id);
        }
        ("delete-deck", [deck_id]) => {
            store.delete_deck(deck_id.parse()?)?;
            println!("Deleted deck {}", deck_id);
        }
        ("add", [deck_id, front, hint, example]) => {
            let card = Card::new(deck_id.parse()?, front.clone(), hint.clone(), example.clone());
            store.save_card(&card)?;
            println!("{}", card.id());
        }
        ("stats", []) => {
            let cards = store.all_cards()?;
            let stats = StudyStats::from_cards(&config.scheduler, &cards, &store.load_streak()?);
            println!("Total cards:     {}", stats.total_cards);
            println!("Mastered:        {}", stats.mastered_cards);
            println!("Remaining:       {}", stats.remaining_cards);
            println!("Study streak:    {} days", stats.streak_days);
        }
        ("study", [deck_id]) => {
            let journal = ReviewJournal::new(&journal_path(store_path))?;
            let session = StudySession::new(config).with_journal(journal);
            study(store.as_mut(), deck_id.parse()?, session)?;
        }
        _ => return Err(USAGE.into()),
    }
    Ok(())
}

fn open_store(path: &Path) -> CliResult<Box<dyn CardStore>> {
    let store: Box<dyn CardStore> = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Box::new(JsonFileStore::open(path)?),
        _ => Box::new(SqliteCardStore::open(path)?),
    };
    Ok(store)
}

fn journal_path(store_path: &Path) -> PathBuf {
    let mut name = store_path.file_stem().unwrap_or_default().to_os_string();
    name.push(".reviews.log");
    store_path.with_file_name(name)
}

fn prompt(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    text: &str,
) -> CliResult<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;
    Ok(lines.next().transpose()?.map(|line| line.trim().to_lowercase()))
}

fn study(store: &mut dyn CardStore, deck_id: DeckId, mut session: StudySession) -> CliResult<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    info!("studying deck {}", deck_id);

    loop {
        let cards = store.cards_in_deck(deck_id)?;
        let card = match session.next_card(&cards) {
            Some(card) => card.clone(),
            None => {
                println!(
                    "This deck has no cards yet. Add some with `add {} <front> <hint> <example>`.",
                    deck_id
                );
                return Ok(());
            }
        };

        println!();
        println!("  {}", card.front);
        match prompt(&mut lines, "[Enter] show answer, [r] reset pass, [q] quit > ")?.as_deref() {
            None | Some("q") => return Ok(()),
            Some("r") => {
                session.reset_pass();
                continue;
            }
            _ => {}
        }

        println!("  {}", card.hint);
        if !card.example.is_empty() {
            println!("  {}", card.example);
        }

        let outcome = loop {
            match prompt(&mut lines, "Remembered? [y/n] > ")?.as_deref() {
                None | Some("q") => return Ok(()),
                Some("y") => break Outcome::Remembered,
                Some("n") => break Outcome::Forgotten,
                _ => continue,
            }
        };

        let now = Utc::now();
        match session.record_outcome(store, card.id(), outcome, now) {
            Ok(report) => {
                if report.milestone.is_some() {
                    let streak = session.config().session.celebration_streak;
                    println!("*** {} in a row! You're doing great! ***", streak);
                }
                let confidence = report.card.review.confidence;
                println!(
                    "  confidence {:.0}% ({}/5), next review {}",
                    confidence * 100.0,
                    confidence_to_five_point(confidence),
                    report.card.review.next_review_at.format("%Y-%m-%d %H:%M UTC")
                );
            }
            Err(e) => eprintln!("Could not save this review: {}", e),
        }
    }
}
