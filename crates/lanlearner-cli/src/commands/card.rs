//! Card management commands for CLI.

use clap::Subcommand;
use lanlearner_core::collection::plain_text;
use lanlearner_core::{time, Card, CardEdit, CardRepository, Config, ContentBlock};

use super::{open_library, print_json, split_list, summaries, CommandResult};

#[derive(Subcommand)]
pub enum CardAction {
    /// Create a new card
    Add {
        /// Card title
        title: String,
        /// Text block (repeatable). `#word` registers a tag
        #[arg(long = "text")]
        texts: Vec<String>,
        /// Image block as a data URL (repeatable)
        #[arg(long = "image")]
        images: Vec<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Free-form note
        #[arg(long)]
        remark: Option<String>,
        /// Comma-separated ids of related cards
        #[arg(long)]
        links: Option<String>,
    },
    /// List cards, newest first
    List {
        /// Only cards carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Include mastered cards even if display.show_mastered is off
        #[arg(long)]
        all: bool,
    },
    /// Show one card by id, or by exact title with --title
    Show {
        /// Card ID
        #[arg(required_unless_present = "title", conflicts_with = "title")]
        id: Option<String>,
        /// Look the card up by its trimmed title instead
        #[arg(long)]
        title: Option<String>,
        /// Print the clipboard text: title, blank line, block contents
        #[arg(long)]
        plain: bool,
    },
    /// List the cards a card links to
    Links {
        /// Card ID
        id: String,
    },
    /// Edit card content (review progress is untouched)
    Edit {
        /// Card ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// Replace all blocks with these text blocks
        #[arg(long = "text")]
        texts: Vec<String>,
        /// New comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// New remark
        #[arg(long)]
        remark: Option<String>,
        /// New comma-separated linked card ids
        #[arg(long)]
        links: Option<String>,
    },
    /// Delete a card and its history
    Delete {
        /// Card ID
        id: String,
    },
    /// Search titles, tags and text
    Search {
        /// Case-insensitive query
        query: String,
    },
}

pub fn run(action: CardAction) -> CommandResult {
    let (db, mut library) = open_library()?;

    match action {
        CardAction::Add {
            title,
            texts,
            images,
            tags,
            remark,
            links,
        } => {
            let mut card = Card::new(title, time::now());
            for text in texts {
                card = card.with_text(text);
            }
            for image in images {
                card = card.with_block(ContentBlock::image(image));
            }
            if let Some(t) = tags {
                card = card.with_tags(split_list(&t));
            }
            if let Some(r) = remark {
                card = card.with_remark(r);
            }
            if let Some(l) = links {
                card.linked_card_ids = split_list(&l);
            }
            let card = library.add_card(card)?.clone();
            db.save_library(&library)?;
            tracing::info!(id = %card.id, "card created");
            print_json(&card)?;
        }
        CardAction::List { tag, all } => {
            let config = Config::load()?;
            let show_mastered = all || config.display.show_mastered;
            let cards: Vec<&Card> = match tag {
                Some(ref t) => library.cards.by_tag(t),
                None => library.cards.iter().collect(),
            };
            let visible = cards
                .into_iter()
                .filter(|c| show_mastered || !c.is_mastered());
            print_json(&summaries(visible, &config))?;
        }
        CardAction::Show { id, title, plain } => {
            let card = match (id, title) {
                (Some(id), _) => library
                    .cards
                    .get(&id)
                    .ok_or_else(|| format!("card not found: {id}"))?,
                (None, Some(title)) => library
                    .cards
                    .find_by_title(&title)
                    .ok_or_else(|| format!("no card titled \"{}\"", title.trim()))?,
                (None, None) => return Err("card id or --title is required".into()),
            };
            if plain {
                println!("{}", plain_text(card));
            } else {
                print_json(card)?;
            }
        }
        CardAction::Edit {
            id,
            title,
            texts,
            tags,
            remark,
            links,
        } => {
            let edit = CardEdit {
                title,
                blocks: (!texts.is_empty())
                    .then(|| texts.into_iter().map(ContentBlock::text).collect()),
                remark,
                tags: tags.as_deref().map(split_list),
                linked_card_ids: links.as_deref().map(split_list),
            };
            let position = library
                .cards
                .position(&id)
                .ok_or_else(|| format!("card not found: {id}"))?;
            let card = library.edit_card(&id, edit, time::now())?.clone();
            db.save_card(&card, position)?;
            db.save_tags(&library.tags)?;
            print_json(&card)?;
        }
        CardAction::Links { id } => {
            let config = Config::load()?;
            print_json(&summaries(library.cards.linked(&id)?, &config))?;
        }
        CardAction::Delete { id } => {
            library.cards.remove(&id)?;
            db.delete_card(&id)?;
            println!("card deleted: {id}");
        }
        CardAction::Search { query } => {
            let config = Config::load()?;
            print_json(&summaries(library.cards.search(&query), &config))?;
        }
    }
    Ok(())
}
