//! Review queue and review event commands.

use clap::Subcommand;
use lanlearner_core::{
    time, CardRepository, Config, Database, Library, ReviewOutcome, Timestamp,
};
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde_json::json;

use super::{event_time, open_library, print_json, summaries, CardSummary, CommandResult};

#[derive(Subcommand)]
pub enum ReviewAction {
    /// Cards due now
    Due {
        /// Evaluate at this time (epoch ms or RFC 3339) instead of now
        #[arg(long)]
        at: Option<String>,
    },
    /// Record that the card was remembered
    Remember {
        /// Card ID
        id: String,
        /// Event time (epoch ms or RFC 3339)
        #[arg(long)]
        at: Option<String>,
    },
    /// Record that the card was forgotten
    Forget {
        /// Card ID
        id: String,
        /// Event time (epoch ms or RFC 3339)
        #[arg(long)]
        at: Option<String>,
    },
    /// Reset review progress back to stage 0
    Reset {
        /// Card ID
        id: String,
        /// Event time (epoch ms or RFC 3339)
        #[arg(long)]
        at: Option<String>,
    },
    /// Random sample of cards for a daily session
    Daily {
        /// Number of cards (default: review.daily_sample_size)
        #[arg(long)]
        size: Option<usize>,
        /// Shuffle seed (default: review.sample_seed, else random)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Review history of a card
    History {
        /// Card ID
        id: String,
    },
    /// Stage distribution and review totals
    Stats {
        /// Evaluate at this time (epoch ms or RFC 3339) instead of now
        #[arg(long)]
        at: Option<String>,
    },
}

pub fn run(action: ReviewAction) -> CommandResult {
    let (db, mut library) = open_library()?;

    match action {
        ReviewAction::Due { at } => {
            let config = Config::load()?;
            let now = event_time(at.as_deref())?;
            let due = library.cards.due(now);
            let next_due = library.cards.next_due(now);
            print_json(&json!({
                "now": now,
                "due": summaries(due, &config),
                "nextDue": next_due,
            }))?;
        }
        ReviewAction::Remember { id, at } => {
            let now = event_time(at.as_deref())?;
            apply(&db, &mut library, &id, now, Some(ReviewOutcome::Remembered))?;
        }
        ReviewAction::Forget { id, at } => {
            let now = event_time(at.as_deref())?;
            apply(&db, &mut library, &id, now, Some(ReviewOutcome::Forgot))?;
        }
        ReviewAction::Reset { id, at } => {
            let now = event_time(at.as_deref())?;
            apply(&db, &mut library, &id, now, None)?;
        }
        ReviewAction::Daily { size, seed } => {
            let config = Config::load()?;
            let size = size.unwrap_or(config.review.daily_sample_size);
            let sample = match seed.or(config.review.sample_seed) {
                Some(seed) => {
                    let mut rng = Mcg128Xsl64::seed_from_u64(seed);
                    library.cards.daily_sample(size, &mut rng)
                }
                None => library.cards.daily_sample(size, &mut rand::thread_rng()),
            };
            print_json(&summaries(sample, &config))?;
        }
        ReviewAction::History { id } => {
            let card = library
                .cards
                .get(&id)
                .ok_or_else(|| format!("card not found: {id}"))?;
            print_json(&json!({
                "id": card.id,
                "stage": card.stage(),
                "reviewCount": card.review_count(),
                "summary": card.history().summary(),
                "history": card.history(),
            }))?;
        }
        ReviewAction::Stats { at } => {
            let now = event_time(at.as_deref())?;
            print_json(&library.cards.stats(now))?;
        }
    }
    Ok(())
}

/// Apply one review event (or a reset when `outcome` is `None`) and persist
/// just that card.
fn apply(
    db: &Database,
    library: &mut Library,
    id: &str,
    now: Timestamp,
    outcome: Option<ReviewOutcome>,
) -> CommandResult {
    let position = library
        .cards
        .position(id)
        .ok_or_else(|| format!("card not found: {id}"))?;
    let card = match outcome {
        Some(outcome) => library.cards.apply_review(id, outcome, now)?,
        None => library.cards.apply_reset(id, now)?,
    };
    db.save_card(card, position)?;

    let config = Config::load()?;
    print_json(&json!({
        "card": CardSummary::new(card, &config),
        "event": card.history().last(),
        "reviewedAt": time::to_rfc3339(now),
    }))
}
