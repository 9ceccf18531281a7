use thiserror::Error;

use super::cache::CacheError;
use super::config::ConfigError;
use crate::core::library::LibraryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Event library error: {source}")]
    Library {
        #[from]
        source: LibraryError,
    },

    #[error("Cross-section cache error: {source}")]
    Cache {
        #[from]
        source: CacheError,
    },

    #[error("No event library path was configured for the dark brem model")]
    MissingLibrary,

    #[error("Dark brem is not applicable to particle with PDG id {pdg_id}")]
    NotApplicable { pdg_id: i32 },

    #[error("Invalid incident lepton: {0}")]
    InvalidTrack(String),
}
