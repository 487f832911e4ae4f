//! Handing edited records back to the host.
//!
//! The editor never persists anything itself. On save it builds the updated
//! [`ImageRecord`] and passes it to a [`SaveSink`] supplied by the host.

use thiserror::Error;

use crate::format::ImageRecord;

/// Errors reported by a save sink.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Another save is still running
    #[error("A save is already in progress")]
    InProgress,

    /// The record could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The host rejected the record
    #[error("Save rejected: {0}")]
    Rejected(String),
}

impl SaveError {
    /// Create a rejection with a message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Receiver of saved image records.
pub trait SaveSink {
    /// Persist or forward an updated record.
    fn save(&mut self, record: &ImageRecord) -> Result<(), SaveError>;
}

impl<F> SaveSink for F
where
    F: FnMut(&ImageRecord) -> Result<(), SaveError>,
{
    fn save(&mut self, record: &ImageRecord) -> Result<(), SaveError> {
        self(record)
    }
}

/// Collects saved records in memory, replacing earlier saves of the same
/// image. Mirrors what a host does with its canonical image list.
#[derive(Debug, Clone, Default)]
pub struct RecordList {
    pub records: Vec<ImageRecord>,
}

impl RecordList {
    pub fn new(records: Vec<ImageRecord>) -> Self {
        Self { records }
    }

    /// Find a record by image name.
    pub fn get(&self, name: &str) -> Option<&ImageRecord> {
        self.records.iter().find(|r| r.name == name)
    }
}

impl SaveSink for RecordList {
    fn save(&mut self, record: &ImageRecord) -> Result<(), SaveError> {
        match self.records.iter_mut().find(|r| r.name == record.name) {
            Some(existing) => *existing = record.clone(),
            None => self.records.push(record.clone()),
        }
        Ok(())
    }
}

/// Writes each saved record to a JSON file.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileSink {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SaveSink for JsonFileSink {
    fn save(&mut self, record: &ImageRecord) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = record.to_json()?;
        std::fs::write(&self.path, json)?;
        log::info!("Saved '{}' to {:?}", record.name, self.path);
        Ok(())
    }
}
