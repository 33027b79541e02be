//! Shared record vocabulary: aliased strings, catalog identifiers, tracks and playlists.
//!
//! Tracks built from local playlist state may be unresolved (no identifiers).
//! Tracks parsed from a catalog response always carry exactly one identifier,
//! the one of the catalog that produced them.

mod types;
mod uri;

pub use types::*;
pub use uri::*;

use thiserror::Error;

/// Errors raised when constructing or validating records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// Input could not be parsed as an identifier for the given catalog.
    #[error("Invalid {kind} identifier: {input}")]
    InvalidUri { kind: CatalogKind, input: String },

    /// Unknown catalog name.
    #[error("Unknown catalog kind: {0}")]
    UnknownCatalog(String),

    /// Track has neither a name nor any identifier, nothing can be resolved from it.
    #[error("Track has neither a name nor any catalog identifier")]
    AmbiguousTrack,
}
