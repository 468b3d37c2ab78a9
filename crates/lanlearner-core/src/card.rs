//! Card entity and its content payload.
//!
//! Payload fields (title, blocks, tags, remark, links) are public and opaque to
//! the scheduler. Scheduling fields are crate-private so they can only change
//! through the review state machine in [`crate::review`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::review::history::{ReviewHistory, ReviewLog};
use crate::review::intervals::{is_valid_stage, MAX_STAGE};
use crate::review::scheduler::calculate_next_review;
use crate::time::Timestamp;

/// Kind of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Text,
    Image,
    Table,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Image => "image",
            BlockType::Table => "table",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    pub rows: Vec<Vec<String>>,
}

/// One block of card content. Images carry a base64 data URL in `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_data: Option<TableData>,
}

impl ContentBlock {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: BlockType::Text,
            content: content.into(),
            table_data: None,
        }
    }

    pub fn image(data_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: BlockType::Image,
            content: data_url.into(),
            table_data: None,
        }
    }

    pub fn table(rows: Vec<Vec<String>>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: BlockType::Table,
            content: String::new(),
            table_data: Some(TableData { rows }),
        }
    }
}

/// A registered tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagData {
    pub name: String,
    #[serde(default)]
    pub is_pinned: bool,
}

impl TagData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_pinned: false,
        }
    }
}

/// A flashcard with its review schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub remark: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    pub(crate) stage: i64,
    pub(crate) next_review_date: Timestamp,
    pub(crate) review_count: u64,
    #[serde(default)]
    pub(crate) history: ReviewHistory,

    #[serde(default)]
    pub linked_card_ids: Vec<String>,
}

impl Card {
    /// Fresh card at stage 0, first due one interval after `created_at`.
    pub fn new(title: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            blocks: Vec::new(),
            tags: Vec::new(),
            remark: String::new(),
            created_at,
            updated_at: created_at,
            stage: 0,
            next_review_date: calculate_next_review(0, created_at),
            review_count: 0,
            history: ReviewHistory::new(),
            linked_card_ids: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_block(mut self, block: ContentBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.with_block(ContentBlock::text(content))
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = remark.into();
        self
    }

    /// Reattach a schedule read back from storage.
    ///
    /// Values are taken as-is; run [`Card::validate`] on anything that did not
    /// come from this crate.
    pub fn with_persisted_schedule(
        mut self,
        stage: i64,
        next_review_date: Timestamp,
        review_count: u64,
        history: Vec<ReviewLog>,
    ) -> Self {
        self.stage = stage;
        self.next_review_date = next_review_date;
        self.review_count = review_count;
        self.history = ReviewHistory::from(history);
        self
    }

    pub fn stage(&self) -> i64 {
        self.stage
    }

    pub fn next_review_date(&self) -> Timestamp {
        self.next_review_date
    }

    pub fn review_count(&self) -> u64 {
        self.review_count
    }

    pub fn history(&self) -> &ReviewHistory {
        &self.history
    }

    pub fn is_mastered(&self) -> bool {
        self.stage >= MAX_STAGE
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        self.stage < MAX_STAGE && self.next_review_date <= now
    }

    /// Check the data-model invariants.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_valid_stage(self.stage) {
            return Err(ValidationError::StageOutOfRange {
                card_id: self.id.clone(),
                stage: self.stage,
                max: MAX_STAGE,
            });
        }
        if self.history.len() as u64 != self.review_count {
            return Err(ValidationError::HistoryMismatch {
                card_id: self.id.clone(),
                review_count: self.review_count,
                history_len: self.history.len(),
            });
        }
        if let Some(index) = self
            .history
            .iter()
            .position(|e| !is_valid_stage(e.stage_before) || !is_valid_stage(e.stage_after))
        {
            return Err(ValidationError::HistoryStageOutOfRange {
                card_id: self.id.clone(),
                index,
                max: MAX_STAGE,
            });
        }
        Ok(())
    }

    /// Text blocks verbatim, other blocks as `[kind]`, joined by spaces.
    pub fn content_summary(&self) -> String {
        self.blocks
            .iter()
            .map(|b| match b.kind {
                BlockType::Text => b.content.clone(),
                other => format!("[{}]", other.as_str()),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Case-insensitive match on title, tags or text blocks.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.title.to_lowercase().contains(&q)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&q))
            || self
                .blocks
                .iter()
                .any(|b| b.kind == BlockType::Text && b.content.to_lowercase().contains(&q))
    }

    /// Explicit tags merged with `#tag` words found in text blocks, first
    /// occurrence wins.
    pub fn merged_tags(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let inline = self
            .blocks
            .iter()
            .filter(|b| b.kind == BlockType::Text)
            .flat_map(|b| extract_inline_tags(&b.content));
        for tag in self.tags.iter().cloned().chain(inline) {
            if !out.contains(&tag) {
                out.push(tag);
            }
        }
        out
    }
}

/// Every `#` followed by a run of non-whitespace, anywhere in `text`
/// (`word#verb` yields `verb`, `##x` yields `#x`). Scanning resumes after
/// each run, so `a#b#c` is the single tag `b#c`.
pub fn extract_inline_tags(text: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find('#') {
        let after = &rest[idx + 1..];
        let end = after.find(char::is_whitespace).unwrap_or(after.len());
        if end > 0 {
            tags.push(after[..end].to_string());
        }
        rest = &after[end..];
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_card_starts_at_stage_zero() {
        let card = Card::new("apple", 0);
        assert_eq!(card.stage(), 0);
        assert_eq!(card.review_count(), 0);
        assert!(card.history().is_empty());
        assert_eq!(card.next_review_date(), 86_400_000);
        assert!(card.validate().is_ok());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let card = Card::new("apple", 0).with_id("c1").with_text("a fruit");
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["nextReviewDate"], 86_400_000);
        assert_eq!(json["reviewCount"], 0);
        assert_eq!(json["blocks"][0]["type"], "text");
        assert!(json["linkedCardIds"].is_array());
    }

    #[test]
    fn deserializes_minimal_record() {
        let json = r#"{
            "id": "x", "title": "t", "createdAt": 1, "updatedAt": 1,
            "stage": 2, "nextReviewDate": 99, "reviewCount": 0
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.stage(), 2);
        assert!(card.blocks.is_empty());
        assert!(card.history().is_empty());
    }

    #[test]
    fn validate_rejects_bad_stage() {
        let card = Card::new("t", 0).with_persisted_schedule(7, 0, 0, Vec::new());
        assert!(matches!(
            card.validate(),
            Err(ValidationError::StageOutOfRange { stage: 7, .. })
        ));
    }

    #[test]
    fn validate_rejects_count_mismatch() {
        let card = Card::new("t", 0).with_persisted_schedule(1, 0, 3, Vec::new());
        assert!(matches!(
            card.validate(),
            Err(ValidationError::HistoryMismatch { review_count: 3, history_len: 0, .. })
        ));
    }

    #[test]
    fn due_requires_time_and_unmastered_stage() {
        let card = Card::new("t", 0);
        assert!(!card.is_due(86_399_999));
        assert!(card.is_due(86_400_000));
        let mastered = card.with_persisted_schedule(5, 0, 0, Vec::new());
        assert!(!mastered.is_due(i64::MAX));
        assert!(mastered.is_mastered());
    }

    #[test]
    fn content_summary_marks_non_text_blocks() {
        let card = Card::new("t", 0)
            .with_text("hello")
            .with_block(ContentBlock::image("data:image/png;base64,AA"))
            .with_block(ContentBlock::table(vec![vec!["a".into()]]));
        assert_eq!(card.content_summary(), "hello [image] [table]");
    }

    #[test]
    fn matches_is_case_insensitive() {
        let card = Card::new("Photosynthesis", 0)
            .with_tags(["Biology"])
            .with_text("Chlorophyll absorbs light");
        assert!(card.matches("photo"));
        assert!(card.matches("bio"));
        assert!(card.matches("CHLORO"));
        assert!(!card.matches("mitochondria"));
    }

    #[test]
    fn merged_tags_include_inline_hashtags() {
        let card = Card::new("t", 0)
            .with_tags(["english"])
            .with_text("a #verb and #english and # alone, see word#noun");
        assert_eq!(card.merged_tags(), vec!["english", "verb", "noun"]);
    }

    #[test]
    fn inline_tags_follow_hash_runs() {
        assert_eq!(extract_inline_tags("see word#verb"), vec!["verb"]);
        assert_eq!(extract_inline_tags("##x"), vec!["#x"]);
        assert_eq!(extract_inline_tags("a#b#c d"), vec!["b#c"]);
        assert_eq!(extract_inline_tags("#中文 标签 #日本語"), vec!["中文", "日本語"]);
        assert!(extract_inline_tags("# trailing #").is_empty());
    }
}
