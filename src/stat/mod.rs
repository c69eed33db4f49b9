pub mod datatype;
pub mod ledger;
pub mod loader;
pub mod sample_data;

pub use datatype::*;
pub use ledger::*;
pub use loader::{LoadOutcome, SkippedFile, load_batch};
pub use sample_data::sample_voucher;
