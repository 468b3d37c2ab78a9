//! Working-set selection over a card collection.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::card::Card;
use crate::time::Timestamp;

use super::intervals::MAX_STAGE;

/// Size of the daily recall sample when the caller has no preference.
pub const DEFAULT_DAILY_SAMPLE: usize = 10;

/// Cards due at `now`, in collection order.
///
/// A card is due when it is below [`MAX_STAGE`] and `next_review_date <= now`.
/// Read-only, so repeated calls with the same inputs agree.
pub fn select_due<'a, I>(cards: I, now: Timestamp) -> Vec<&'a Card>
where
    I: IntoIterator<Item = &'a Card>,
{
    cards.into_iter().filter(|card| card.is_due(now)).collect()
}

/// Up to `sample_size` cards drawn at random from the whole collection,
/// ignoring stage and due date.
///
/// The shuffle is driven by `rng`; pass a seeded generator to pin the result.
pub fn select_daily_sample<'a, I, R>(cards: I, sample_size: usize, rng: &mut R) -> Vec<&'a Card>
where
    I: IntoIterator<Item = &'a Card>,
    R: Rng + ?Sized,
{
    let mut pool: Vec<&'a Card> = cards.into_iter().collect();
    pool.shuffle(rng);
    pool.truncate(sample_size);
    pool
}

/// Earliest future due date among unmastered cards that are not due yet.
pub fn next_due<'a, I>(cards: I, now: Timestamp) -> Option<Timestamp>
where
    I: IntoIterator<Item = &'a Card>,
{
    cards
        .into_iter()
        .filter(|card| card.stage < MAX_STAGE && card.next_review_date > now)
        .map(|card| card.next_review_date)
        .min()
}
