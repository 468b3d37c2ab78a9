//! Keyed, order-preserving card store.
//!
//! Mutations replace exactly one entry by id and never reorder the rest, so a
//! review on one card cannot be observed on any other.

use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::card::{Card, ContentBlock, TagData};
use crate::error::{CoreError, Result, ValidationError};
use crate::review::{self, ReviewOutcome, MAX_STAGE};
use crate::time::Timestamp;

/// Ordered collection of cards keyed by id. Newest cards sit at the front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardCollection {
    cards: IndexMap<String, Card>,
}

/// Content changes for an existing card. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct CardEdit {
    pub title: Option<String>,
    pub blocks: Option<Vec<ContentBlock>>,
    pub remark: Option<String>,
    pub tags: Option<Vec<String>>,
    pub linked_card_ids: Option<Vec<String>>,
}

/// Stage distribution over a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total: usize,
    pub due: usize,
    pub mastered: usize,
    pub total_reviews: u64,
    pub by_stage: Vec<usize>,
    pub next_due: Option<Timestamp>,
}

impl CardCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from cards in their stored order.
    ///
    /// # Errors
    /// Returns [`ValidationError::DuplicateId`] if two cards share an id.
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Result<Self> {
        let mut out = Self::new();
        for card in cards {
            out.push(card)?;
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cards.contains_key(id)
    }

    /// Cards in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Card> + '_ {
        self.cards.values()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.cards.get_index_of(id)
    }

    /// Add a card at the front.
    ///
    /// # Errors
    /// Returns [`ValidationError::DuplicateId`] if the id is taken.
    pub fn insert(&mut self, card: Card) -> Result<()> {
        self.ensure_free(&card.id)?;
        self.cards.shift_insert(0, card.id.clone(), card);
        Ok(())
    }

    /// Add a card at the back (used when restoring stored order).
    ///
    /// # Errors
    /// Returns [`ValidationError::DuplicateId`] if the id is taken.
    pub fn push(&mut self, card: Card) -> Result<()> {
        self.ensure_free(&card.id)?;
        self.cards.insert(card.id.clone(), card);
        Ok(())
    }

    fn ensure_free(&self, id: &str) -> Result<()> {
        if self.cards.contains_key(id) {
            return Err(ValidationError::DuplicateId(id.to_string()).into());
        }
        Ok(())
    }

    /// Remove a card, keeping the order of the others.
    ///
    /// # Errors
    /// Returns [`CoreError::CardNotFound`] for an unknown id.
    pub fn remove(&mut self, id: &str) -> Result<Card> {
        self.cards.shift_remove(id).ok_or_else(|| not_found(id))
    }

    /// Replace the card with the same id in place.
    ///
    /// # Errors
    /// Returns [`CoreError::CardNotFound`] for an unknown id.
    pub fn replace(&mut self, card: Card) -> Result<&Card> {
        let slot = self.cards.get_mut(&card.id).ok_or_else(|| not_found(&card.id))?;
        *slot = card;
        Ok(slot)
    }

    /// Record a review on one card and swap the result in.
    ///
    /// # Errors
    /// Returns [`CoreError::CardNotFound`] for an unknown id.
    pub fn apply_review(
        &mut self,
        id: &str,
        outcome: ReviewOutcome,
        event_time: Timestamp,
    ) -> Result<&Card> {
        let current = self.get(id).ok_or_else(|| not_found(id))?;
        let updated = review::record_review(current, outcome, event_time);
        self.replace(updated)
    }

    /// Manually reset one card's progress.
    ///
    /// # Errors
    /// Returns [`CoreError::CardNotFound`] for an unknown id.
    pub fn apply_reset(&mut self, id: &str, event_time: Timestamp) -> Result<&Card> {
        let current = self.get(id).ok_or_else(|| not_found(id))?;
        let updated = review::reset_progress(current, event_time);
        self.replace(updated)
    }

    /// Apply a content edit. Scheduling fields are never touched.
    ///
    /// # Errors
    /// Returns [`CoreError::CardNotFound`] for an unknown id and
    /// [`ValidationError::EmptyTitle`] for a blank title.
    pub fn update_content(&mut self, id: &str, edit: CardEdit, now: Timestamp) -> Result<&Card> {
        if matches!(&edit.title, Some(t) if t.trim().is_empty()) {
            return Err(ValidationError::EmptyTitle.into());
        }
        let mut card = self.get(id).ok_or_else(|| not_found(id))?.clone();
        if let Some(title) = edit.title {
            card.title = title;
        }
        if let Some(blocks) = edit.blocks {
            card.blocks = blocks;
        }
        if let Some(remark) = edit.remark {
            card.remark = remark;
        }
        if let Some(tags) = edit.tags {
            card.tags = tags;
        }
        if let Some(links) = edit.linked_card_ids {
            card.linked_card_ids = links;
        }
        card.tags = card.merged_tags();
        card.updated_at = now;
        self.replace(card)
    }

    pub fn due(&self, now: Timestamp) -> Vec<&Card> {
        review::select_due(self.iter(), now)
    }

    pub fn daily_sample<R: Rng + ?Sized>(&self, sample_size: usize, rng: &mut R) -> Vec<&Card> {
        review::select_daily_sample(self.iter(), sample_size, rng)
    }

    pub fn next_due(&self, now: Timestamp) -> Option<Timestamp> {
        review::next_due(self.iter(), now)
    }

    pub fn search(&self, query: &str) -> Vec<&Card> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        self.iter().filter(|c| c.matches(query.trim())).collect()
    }

    pub fn by_tag(&self, tag: &str) -> Vec<&Card> {
        self.iter().filter(|c| c.tags.iter().any(|t| t == tag)).collect()
    }

    /// First card whose trimmed title equals `title` (link navigation).
    pub fn find_by_title(&self, title: &str) -> Option<&Card> {
        let wanted = title.trim();
        self.iter().find(|c| c.title.trim() == wanted)
    }

    /// Cards listed in `id`'s `linked_card_ids`, in link order. Links to
    /// deleted cards are skipped.
    ///
    /// # Errors
    /// Returns [`CoreError::CardNotFound`] for an unknown id.
    pub fn linked(&self, id: &str) -> Result<Vec<&Card>> {
        let card = self.get(id).ok_or_else(|| not_found(id))?;
        Ok(card
            .linked_card_ids
            .iter()
            .filter_map(|link| {
                let target = self.get(link);
                if target.is_none() {
                    tracing::warn!(card_id = %id, link = %link, "dangling card link");
                }
                target
            })
            .collect())
    }

    pub fn stats(&self, now: Timestamp) -> CollectionStats {
        let mut by_stage = vec![0usize; MAX_STAGE as usize + 1];
        let mut stats = CollectionStats {
            total: self.len(),
            next_due: self.next_due(now),
            ..CollectionStats::default()
        };
        for card in self.iter() {
            let idx = card.stage().clamp(0, MAX_STAGE) as usize;
            by_stage[idx] += 1;
            if card.is_mastered() {
                stats.mastered += 1;
            }
            if card.is_due(now) {
                stats.due += 1;
            }
            stats.total_reviews += card.review_count();
        }
        stats.by_stage = by_stage;
        stats
    }
}

fn not_found(id: &str) -> CoreError {
    CoreError::CardNotFound { id: id.to_string() }
}

/// Everything the application persists: cards plus the tag registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    pub cards: CardCollection,
    pub tags: Vec<TagData>,
}

impl Library {
    pub fn new(cards: CardCollection, tags: Vec<TagData>) -> Self {
        Self { cards, tags }
    }

    /// Add a new card, registering any tags it introduces.
    ///
    /// # Errors
    /// Fails on a blank title or a duplicate id.
    pub fn add_card(&mut self, mut card: Card) -> Result<&Card> {
        if card.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        card.tags = card.merged_tags();
        self.register_tags(&card.tags);
        let id = card.id.clone();
        self.cards.insert(card)?;
        self.cards.get(&id).ok_or_else(|| not_found(&id))
    }

    /// Edit a card's content, registering any new tags.
    ///
    /// # Errors
    /// See [`CardCollection::update_content`].
    pub fn edit_card(&mut self, id: &str, edit: CardEdit, now: Timestamp) -> Result<&Card> {
        let tags = self.cards.update_content(id, edit, now)?.tags.clone();
        self.register_tags(&tags);
        self.cards.get(id).ok_or_else(|| not_found(id))
    }

    pub fn register_tags(&mut self, names: &[String]) {
        for name in names {
            if !self.tags.iter().any(|t| &t.name == name) {
                self.tags.push(TagData::new(name.clone()));
            }
        }
    }

    /// Pinned tags first, then by name ignoring case.
    ///
    /// Names in CJK scripts sort by code point, not by pinyin.
    pub fn sorted_tags(&self) -> Vec<&TagData> {
        let mut tags: Vec<&TagData> = self.tags.iter().collect();
        tags.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.name.cmp(&b.name))
        });
        tags
    }

    /// # Errors
    /// Returns [`ValidationError::InvalidValue`] for an unknown tag.
    pub fn set_tag_pinned(&mut self, name: &str, pinned: bool) -> Result<()> {
        let tag = self
            .tags
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| unknown_tag(name))?;
        tag.is_pinned = pinned;
        Ok(())
    }

    /// Drop a tag from the registry. Cards keep their tag strings.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidValue`] for an unknown tag.
    pub fn delete_tag(&mut self, name: &str) -> Result<()> {
        let before = self.tags.len();
        self.tags.retain(|t| t.name != name);
        if self.tags.len() == before {
            return Err(unknown_tag(name));
        }
        Ok(())
    }

    /// Validate every card against the data-model invariants and check that
    /// tag names are unique.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.cards.iter().try_for_each(Card::validate)?;
        for (i, tag) in self.tags.iter().enumerate() {
            if self.tags[..i].iter().any(|t| t.name == tag.name) {
                return Err(ValidationError::InvalidValue {
                    field: "tags".into(),
                    message: format!("duplicate tag: {}", tag.name),
                });
            }
        }
        Ok(())
    }
}

fn unknown_tag(name: &str) -> CoreError {
    ValidationError::InvalidValue {
        field: "tag".into(),
        message: format!("unknown tag: {name}"),
    }
    .into()
}

/// Copy text for the clipboard: title, blank line, then the content of every
/// block (image data URLs included), one per line.
pub fn plain_text(card: &Card) -> String {
    let body = card
        .blocks
        .iter()
        .map(|b| b.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n\n{}", card.title, body)
}
