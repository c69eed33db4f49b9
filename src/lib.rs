pub mod advisor;
pub mod config;
pub mod error;
pub mod stat;
pub mod tui;

pub use error::{AdvisorError, LedgerError};
