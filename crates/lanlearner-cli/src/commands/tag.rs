use clap::Subcommand;
use lanlearner_core::CardRepository;
use serde_json::json;

use super::{open_library, print_json, CommandResult};

#[derive(Subcommand)]
pub enum TagAction {
    /// List tags, pinned first
    List,
    /// Pin a tag to the top of the list
    Pin {
        /// Tag name
        name: String,
    },
    /// Unpin a tag
    Unpin {
        /// Tag name
        name: String,
    },
    /// Remove a tag from the registry (cards keep it)
    Delete {
        /// Tag name
        name: String,
    },
}

pub fn run(action: TagAction) -> CommandResult {
    let (db, mut library) = open_library()?;

    match action {
        TagAction::List => {
            let rows: Vec<_> = library
                .sorted_tags()
                .into_iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "isPinned": t.is_pinned,
                        "cards": library.cards.by_tag(&t.name).len(),
                    })
                })
                .collect();
            print_json(&rows)?;
        }
        TagAction::Pin { name } => {
            library.set_tag_pinned(&name, true)?;
            db.save_tags(&library.tags)?;
            println!("tag pinned: {name}");
        }
        TagAction::Unpin { name } => {
            library.set_tag_pinned(&name, false)?;
            db.save_tags(&library.tags)?;
            println!("tag unpinned: {name}");
        }
        TagAction::Delete { name } => {
            library.delete_tag(&name)?;
            db.save_tags(&library.tags)?;
            println!("tag deleted: {name}");
        }
    }
    Ok(())
}
