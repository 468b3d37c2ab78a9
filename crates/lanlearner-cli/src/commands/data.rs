//! Backup and export commands.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use clap::Subcommand;
use lanlearner_core::storage::data_dir;
use lanlearner_core::transfer::{backup_file_name, export_backup, export_readable_csv, import_backup};
use lanlearner_core::{time, CardRepository};
use serde_json::json;

use super::{open_library, print_json, CommandResult};

#[derive(Subcommand)]
pub enum DataAction {
    /// Write a full backup
    Export {
        /// Output file (default: a dated file in the data directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace all cards and tags with the contents of a backup
    Import {
        /// Backup file written by `data export`
        path: PathBuf,
    },
    /// Write a readable CSV summary (not importable)
    Csv {
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

pub fn run(action: DataAction) -> CommandResult {
    let (db, library) = open_library()?;

    match action {
        DataAction::Export { output } => {
            let now = time::now();
            let path = match output {
                Some(path) => path,
                None => data_dir()?.join(backup_file_name(now)),
            };
            let writer = BufWriter::new(File::create(&path)?);
            export_backup(&library, now, writer)?;
            print_json(&json!({
                "path": path.display().to_string(),
                "cards": library.cards.len(),
                "tags": library.tags.len(),
            }))?;
        }
        DataAction::Import { path } => {
            let reader = BufReader::new(File::open(&path)?);
            let imported = import_backup(reader)?;
            db.save_library(&imported)?;
            print_json(&json!({
                "cards": imported.cards.len(),
                "tags": imported.tags.len(),
            }))?;
        }
        DataAction::Csv { output } => match output {
            Some(path) => {
                export_readable_csv(&library, BufWriter::new(File::create(&path)?))?;
                println!("csv written: {}", path.display());
            }
            None => export_readable_csv(&library, std::io::stdout().lock())?,
        },
    }
    Ok(())
}
