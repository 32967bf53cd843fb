//! Flag lookup for ranked nations
//!
//! Resolves a country name to a flag image URL through a public name
//! directory (restcountries v3.1 by default) after applying a static alias
//! table for names the directory spells differently.
//!
//! Rendering a ranked list dispatches every lookup concurrently into a
//! rank-indexed buffer and publishes the finished list in one step. Each
//! render carries a generation ticket; a render that was overtaken by a
//! newer weight change is discarded instead of published.
//!
//! # Usage
//!
//! ```rust,ignore
//! let resolver = FlagResolver::new(FlagClient::restcountries()?, AliasTable::default());
//! let ticket = board.begin();
//! render_lists(&board, ticket, &lists, &resolver).await;
//! ```

use thiserror::Error;

pub mod aliases;
pub mod client;
pub mod render;

pub use aliases::AliasTable;
pub use client::{FlagClient, FlagClientConfig, FlagLookup};
pub use render::{
    render_entries, render_lists, FlagResolver, FlaggedEntry, FlaggedLists, RenderBoard,
    RenderTicket,
};

#[derive(Error, Debug)]
pub enum FlagLookupError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Directory returned status {0}")]
    Status(u16),
    #[error("No directory entry for {0:?}")]
    NotFound(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Cannot build lookup URL: {0}")]
    InvalidUrl(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlagLookupError>;
