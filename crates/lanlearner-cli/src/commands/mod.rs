//! Subcommand implementations. Each module exposes a clap action enum and a
//! `run` function.

pub mod card;
pub mod config;
pub mod data;
pub mod review;
pub mod tag;

use lanlearner_core::{time, Card, CardRepository, Config, Database, Library, Timestamp};
use serde::Serialize;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open the database and load everything in it.
pub fn open_library() -> Result<(Database, Library), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let library = db.load_library()?;
    Ok((db, library))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `--at` value, or the current time.
pub fn event_time(at: Option<&str>) -> Result<Timestamp, Box<dyn std::error::Error>> {
    match at {
        Some(raw) => time::parse(raw).ok_or_else(|| format!("invalid time: {raw}").into()),
        None => Ok(time::now()),
    }
}

/// One-line listing of a card.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub tags: &'a [String],
    pub stage: i64,
    pub review_count: u64,
    pub next_review_date: Timestamp,
    pub next_review: String,
}

impl<'a> CardSummary<'a> {
    pub fn new(card: &'a Card, config: &Config) -> Self {
        Self {
            id: &card.id,
            title: &card.title,
            tags: &card.tags,
            stage: card.stage(),
            review_count: card.review_count(),
            next_review_date: card.next_review_date(),
            next_review: time::format(card.next_review_date(), &config.display.date_format),
        }
    }
}

pub fn summaries<'a>(cards: impl IntoIterator<Item = &'a Card>, config: &Config) -> Vec<CardSummary<'a>> {
    cards.into_iter().map(|c| CardSummary::new(c, config)).collect()
}

/// Split `a, b,c` into trimmed, non-empty parts.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
