use std::path::PathBuf;
use thiserror::Error;

use crate::stat::loader::SkippedFile;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("can't read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed voucher {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    #[error("amount total out of decimal range")]
    Overflow,

    #[error("bad ledger directory pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Nothing usable was found; `skipped` lists files that failed to load.
    #[error("no ledger entries found in {}", dir.display())]
    NoData {
        dir: PathBuf,
        skipped: Vec<SkippedFile>,
    },
}

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("empty question")]
    EmptyInput,

    #[error("{0}")]
    Http(#[from] reqwest::Error),
}
