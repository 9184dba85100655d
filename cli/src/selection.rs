//! Persisted selection state.
//!
//! A simple structured record of the paths the user picked and the
//! destination folder, stored as JSON. Read at startup to prepopulate a run
//! and written back on request. The engine never touches this; it only ever
//! sees the reconstructed job.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionState {
    #[serde(default)]
    pub items: Vec<PathBuf>,
    #[serde(default)]
    pub destination_folder: Option<PathBuf>,
}

impl SelectionState {
    pub fn load(path: &Path) -> io::Result<Self> {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, raw)
    }
}
