//! Error types for cardviewlib
//!
//! Two families live here. `CardviewError` covers failures of the library's
//! own plumbing (reading files, parsing definitions) and is returned through
//! `Result`. `Issue` covers the ways a single card can fail to show data;
//! issues never propagate, they are turned into an inline notice for that
//! card.

use std::path::PathBuf;
use thiserror::Error;

use crate::view::{CardView, Notice, NoticeLevel};

/// Message shown when a list or pivot has no rows.
pub const NO_DATA: &str = "No data to display";
/// Message shown when every list field descriptor is unusable.
pub const NO_FIELDS: &str = "No fields to display";
/// Message shown when a graph payload carries no dataset.
pub const NO_CHART_DATA: &str = "No chart data available";
/// Message shown for a dashboard line without a saved filter.
pub const NO_FILTER: &str = "No filter selected";

/// Errors that can occur while loading definitions or fetching payloads
#[derive(Error, Debug)]
pub enum CardviewError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File content is not valid JSON for the expected shape
    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// No payload file exists for a filter
    #[error("no payload found for filter {filter_id} in {dir}")]
    PayloadNotFound { filter_id: i64, dir: PathBuf },

    /// Unknown option value (locale, format, ...)
    #[error("invalid value '{value}' for {option}")]
    InvalidOption { option: &'static str, value: String },
}

/// Card-local failure modes.
///
/// Each variant renders as one bounded notice. The display string is the
/// exact text the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// Nothing to show. Informational, not an error.
    #[error("{0}")]
    EmptyData(&'static str),

    /// The payload is present but unusable (e.g. zero usable fields).
    #[error("{0}")]
    InvalidShape(&'static str),

    /// `type` names a shape this renderer does not know.
    #[error("Unsupported data type: {0}")]
    UnsupportedType(String),

    /// The remote computation reported an error.
    #[error("{0}")]
    UpstreamError(String),

    /// The fetch itself failed.
    #[error("Error while loading data: {0}")]
    TransportFailure(String),
}

impl Issue {
    /// Visual level of the notice for this issue.
    pub fn level(&self) -> NoticeLevel {
        match self {
            Issue::EmptyData(_) => NoticeLevel::Info,
            Issue::InvalidShape(_)
            | Issue::UnsupportedType(_)
            | Issue::UpstreamError(_)
            | Issue::TransportFailure(_) => NoticeLevel::Warning,
        }
    }

    /// Convert into the view that replaces the card's content.
    pub fn into_view(self) -> CardView {
        CardView::Notice(Notice {
            level: self.level(),
            message: self.to_string(),
        })
    }
}
