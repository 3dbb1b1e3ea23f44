//! State kept between CLI invocations: the identity session, cart and wishlist.
//!
//! Stored as one pretty-printed JSON document. A missing file is an empty
//! state, not an error.

#[cfg(test)]
#[path = "local_state_test.rs"]
mod local_state_test;

use std::io;
use std::path::{Path, PathBuf};

use cakeshop::auth::Session;
use cakeshop::shop::{Cart, Wishlist};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum StateFileError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("state file {path} is not valid JSON: {source}")]
    Malformed { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalState {
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub cart: Cart,
    #[serde(default)]
    pub wishlist: Wishlist,
}

impl LocalState {
    pub fn load(path: &Path) -> Result<Self, StateFileError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no state file; starting empty");
                return Ok(Self::default());
            }
            Err(source) => return Err(StateFileError::Read { path: path.to_owned(), source }),
        };
        serde_json::from_str(&raw).map_err(|source| StateFileError::Malformed { path: path.to_owned(), source })
    }

    pub fn save(&self, path: &Path) -> Result<(), StateFileError> {
        let rendered = serde_json::to_string_pretty(self)
            .map_err(|source| StateFileError::Malformed { path: path.to_owned(), source })?;
        std::fs::write(path, rendered).map_err(|source| StateFileError::Write { path: path.to_owned(), source })
    }
}
