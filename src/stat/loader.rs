use super::datatype::{DETAIL_KEY, VoucherFile};
use super::ledger::{LedgerBatch, magnitude};
use crate::error::LedgerError;
use rust_decimal::Decimal;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// A voucher file that was left out of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub batch: LedgerBatch,
    /// Files that contributed to the batch, in load order.
    pub files: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

pub fn load_voucher_file(path: impl AsRef<Path>) -> Result<VoucherFile, LedgerError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| LedgerError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// `*.json` files directly inside `dir`, sorted by file name.
pub fn json_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, LedgerError> {
    let dir = dir.as_ref();
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped).join("*.json");
    let mut files = Vec::new();
    for found in glob::glob(&pattern.to_string_lossy())? {
        match found {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!("skipping unreadable path: {e}"),
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Concatenate the `明细` lists of every voucher in `dir`.
///
/// A file that fails to load is recorded in [`LoadOutcome::skipped`] and the
/// scan continues. So is a file whose amounts would push the batch past the
/// decimal range, which keeps every table of the returned batch computable.
/// An empty result is reported as [`LedgerError::NoData`].
pub fn load_batch(dir: impl AsRef<Path>) -> Result<LoadOutcome, LedgerError> {
    let dir = dir.as_ref();
    let mut outcome = LoadOutcome::default();
    let mut used = Decimal::ZERO;
    for path in json_files(dir)? {
        let loaded = load_voucher_file(&path).and_then(|voucher| {
            let size = magnitude(&voucher.entries)
                .and_then(|m| used.checked_add(m))
                .ok_or(LedgerError::Overflow)?;
            Ok((voucher, size))
        });
        match loaded {
            Ok((voucher, size)) => {
                used = size;
                if voucher.entries.is_empty() {
                    debug!(file = %path.display(), "no {DETAIL_KEY} entries");
                }
                outcome.batch.extend(voucher.entries);
                outcome.files.push(path);
            }
            Err(e) => {
                warn!(file = %path.display(), "voucher skipped: {e}");
                let reason = match e {
                    LedgerError::Overflow => format!("{}: {e}", path.display()),
                    _ => e.to_string(),
                };
                outcome.skipped.push(SkippedFile { path, reason });
            }
        }
    }
    if outcome.batch.is_empty() {
        return Err(LedgerError::NoData {
            dir: dir.to_path_buf(),
            skipped: outcome.skipped,
        });
    }
    info!(
        entries = outcome.batch.len(),
        files = outcome.files.len(),
        skipped = outcome.skipped.len(),
        "ledger loaded from {}",
        dir.display()
    );
    Ok(outcome)
}
