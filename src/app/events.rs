//! Defines the messages the search task sends to the UI layer.

use serde::Serialize;
use std::path::PathBuf;

use crate::core::MatchRecord;

/// One rendered result line: display name plus full path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub name: String,
    pub full_path: PathBuf,
}

impl From<MatchRecord> for ResultRow {
    fn from(record: MatchRecord) -> Self {
        Self {
            name: record.name,
            full_path: record.full_path,
        }
    }
}

/// Events sent from a background search to whoever renders results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// The complete, ordered result list of search number `generation`.
    Results {
        generation: u64,
        rows: Vec<ResultRow>,
    },
    /// A message to be displayed to the user.
    ShowError(String),
}
