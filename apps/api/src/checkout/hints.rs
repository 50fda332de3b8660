//! Client-local persistence: the form draft and advisory access hints.
//!
//! Hints remember which identifiers paid and how many credits the server last
//! reported, so the UI can show "restored access" before the server answers.
//! They are base64-encoded, which hides nothing: treat every identifier stored
//! here as public. The server never reads them; its paid-access record is the
//! only authority.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::user_data::UserData;

const DRAFT_FILE: &str = "draft.json";
const HINTS_FILE: &str = "access_hints";

#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessHints {
    /// identifier → last credit balance reported by the server
    credits: BTreeMap<String, i64>,
}

impl AccessHints {
    pub fn credits_for(&self, identifier: &str) -> Option<i64> {
        self.credits.get(identifier).copied()
    }

    /// Whether the UI may optimistically label this user as paid.
    pub fn looks_paid(&self, identifier: &str) -> bool {
        self.credits_for(identifier).is_some_and(|c| c > 0)
    }

    pub fn record(&mut self, identifier: &str, credits: i64) {
        self.credits.insert(identifier.to_string(), credits);
    }

    pub fn forget(&mut self, identifier: &str) {
        self.credits.remove(identifier);
    }

    fn encode(&self) -> Result<String, LocalStoreError> {
        Ok(STANDARD.encode(serde_json::to_vec(self)?))
    }

    fn decode(raw: &str) -> Option<Self> {
        let bytes = STANDARD.decode(raw.trim()).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// Directory-backed stand-in for browser local storage.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, LocalStoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_draft(&self, draft: &UserData) -> Result<(), LocalStoreError> {
        fs::write(self.dir.join(DRAFT_FILE), serde_json::to_vec_pretty(draft)?)?;
        Ok(())
    }

    pub fn load_draft(&self) -> Result<Option<UserData>, LocalStoreError> {
        match fs::read(self.dir.join(DRAFT_FILE)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn clear_draft(&self) -> Result<(), LocalStoreError> {
        match fs::remove_file(self.dir.join(DRAFT_FILE)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Loads hints. Missing or unreadable hints are an empty set; they are
    /// only advisory.
    pub fn load_hints(&self) -> AccessHints {
        let path = self.dir.join(HINTS_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return AccessHints::default(),
        };
        AccessHints::decode(&raw).unwrap_or_else(|| {
            warn!("Discarding unreadable access hints at {}", path.display());
            AccessHints::default()
        })
    }

    pub fn save_hints(&self, hints: &AccessHints) -> Result<(), LocalStoreError> {
        fs::write(self.dir.join(HINTS_FILE), hints.encode()?)?;
        Ok(())
    }

    /// Records the server-reported balance for one identifier.
    pub fn remember_credits(&self, identifier: &str, credits: i64) -> Result<(), LocalStoreError> {
        let mut hints = self.load_hints();
        hints.record(identifier, credits);
        self.save_hints(&hints)
    }
}
