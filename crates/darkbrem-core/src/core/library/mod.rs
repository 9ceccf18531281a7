//! Pre-generated dark brem vertices and the machinery for drawing from them.

mod event_library;
mod outgoing;
mod source;

pub use event_library::{EventLibrary, MAX_RESAMPLE_ITERATIONS};
pub use outgoing::{LibraryRow, OutgoingKinematics};
pub use source::{CsvLibrary, LibrarySource, write_library_csv};

use thiserror::Error;

/// Errors raised while reading, writing, or validating an event library.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid record in '{path}' at line {line}: {reason}")]
    InvalidRecord {
        path: String,
        line: usize,
        reason: String,
    },
    /// No samples were found; an event library needs at least one.
    #[error("Event library '{path}' contains no samples")]
    Empty { path: String },
    /// The library was generated for a different A' mass than configured.
    #[error(
        "Event library was generated for an A' mass of {found} GeV but the model uses {expected} GeV"
    )]
    MassMismatch { expected: f64, found: f64 },
}
