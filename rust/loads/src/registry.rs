// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persistent record of synchronized loads.
//!
//! Stored as a flat JSON object keyed by unique identifier. Writes go to a
//! temporary sibling first and are renamed into place, so a crash mid-save
//! leaves the previous registry intact.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::LoadAssignment;

#[derive(Debug, Clone)]
pub struct LoadSyncRegistry {
    path: PathBuf,
    entries: BTreeMap<String, LoadAssignment>,
}

impl LoadSyncRegistry {
    /// Empty registry that will be saved at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Read the registry at `path`. A missing file yields an empty registry;
    /// a file that cannot be parsed is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no registry file, starting empty");
                return Ok(Self::new(path));
            }
            Err(source) => return Err(Error::RegistryIo { path, source }),
        };

        let entries: BTreeMap<String, LoadAssignment> = match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(source) => return Err(Error::RegistryParse { path, source }),
        };
        info!(path = %path.display(), entries = entries.len(), "loaded load registry");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `{platform}_{element}_{type}_{8 hex}`
    pub fn generate_identifier(load: &LoadAssignment) -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!(
            "{}_{}_{}_{}",
            load.source_platform,
            load.element_id,
            load.load_type,
            &random[..8]
        )
    }

    /// Store `load`, assigning an identifier if it has none. An existing
    /// entry with the same identifier is overwritten. Returns the identifier.
    pub fn register_load(&mut self, mut load: LoadAssignment) -> String {
        if load.unique_identifier.is_empty() {
            load.unique_identifier = Self::generate_identifier(&load);
        }
        let id = load.unique_identifier.clone();
        self.entries.insert(id.clone(), load);
        id
    }

    pub fn get(&self, id: &str) -> Option<&LoadAssignment> {
        self.entries.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<LoadAssignment> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LoadAssignment)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn ids_for_platform(&self, platform: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, load)| load.source_platform == platform)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Write the registry atomically, creating the parent directory.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        let io_err = |source: std::io::Error| Error::RegistryIo {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = File::create(&tmp).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "saved load registry");
        Ok(())
    }
}
