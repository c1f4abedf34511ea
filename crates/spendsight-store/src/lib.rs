//! Spendsight store: the single owner of persisted transaction records.
//!
//! The store keeps the whole ledger in memory, assigns ids, and writes the
//! file back after every mutation so records survive restarts. Ids are
//! monotonic and never reused, including across reloads, because the counter
//! is persisted alongside the records. The at-rest format is an obfuscated
//! envelope (see [`codec`]); a file that fails its checks is reported as
//! corrupted rather than silently replaced.

#![deny(unsafe_code)]

mod codec;

use serde::{Deserialize, Serialize};
use spendsight_core::{RecordError, Transaction};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store file {path} is corrupted: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    #[error("invalid transaction: {0}")]
    InvalidRecord(#[from] RecordError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreData {
    next_id: u64,
    records: Vec<Transaction>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

/// File-backed transaction store.
///
/// Persisted after every mutation; loading a missing file yields an empty
/// store rather than an error.
#[derive(Debug)]
pub struct TransactionStore {
    path: PathBuf,
    passphrase: String,
    data: StoreData,
}

impl TransactionStore {
    pub fn load(
        path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let passphrase = passphrase.into();

        let data = if path.exists() {
            let bytes = fs::read(&path)?;
            if bytes.is_empty() {
                StoreData::default()
            } else {
                let payload =
                    codec::decode(&bytes, &passphrase).map_err(|err| StoreError::Corrupted {
                        path: path.clone(),
                        reason: err.to_string(),
                    })?;
                serde_json::from_slice(&payload).map_err(|err| StoreError::Corrupted {
                    path: path.clone(),
                    reason: format!("undecodable payload: {err}"),
                })?
            }
        } else {
            StoreData::default()
        };

        Ok(Self {
            path,
            passphrase,
            data,
        })
    }

    /// Validate a draft, assign it the next id, persist, and return the
    /// saved record. The ledger advances only once the write succeeds, so
    /// a rejected draft or a failed persist consumes no id.
    pub fn add(&mut self, draft: Transaction) -> Result<Transaction, StoreError> {
        draft.validate()?;

        let mut record = draft;
        record.id = self.data.next_id;

        let mut candidate = self.data.clone();
        candidate.next_id += 1;
        candidate.records.push(record.clone());

        self.persist(&candidate)?;
        self.data = candidate;
        Ok(record)
    }

    /// Read snapshot of every stored record, oldest first
    pub fn records(&self) -> &[Transaction] {
        &self.data.records
    }

    pub fn len(&self) -> usize {
        self.data.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.records.is_empty()
    }

    fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let payload = serde_json::to_vec(data)?;
        let bytes = codec::encode(&payload, &self.passphrase);

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, bytes)?;
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }
}
