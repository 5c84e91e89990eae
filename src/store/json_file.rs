// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON file store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

use super::{PersistedState, StateStore};

/// Store that keeps the state in a pretty-printed JSON file.
///
/// Parent directories are created on the first save.
///
/// # Examples
///
/// ```no_run
/// use mertik_lib::store::{JsonFileStore, StateStore};
///
/// let store = JsonFileStore::new("/var/lib/fireplace/state.json");
/// let restored = store.load()?;
/// # Ok::<(), mertik_lib::error::StoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedState>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let state = serde_json::from_str(&contents)?;
        tracing::debug!(path = %self.path.display(), "Loaded state file");
        Ok(Some(state))
    }

    fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, contents)?;
        tracing::debug!(path = %self.path.display(), "Saved state file");
        Ok(())
    }
}
