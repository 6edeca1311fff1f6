//! StatDataStore - JSON save files keyed by object id

use super::{ObjectStatSaveData, StatModifierSaveData};
use crate::error::StatError;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reads and writes `stat_{object_id}.json` files under a data directory
#[derive(Debug, Clone)]
pub struct StatDataStore {
    root: PathBuf,
}

impl StatDataStore {
    /// Create a store rooted at `root`; the directory is created on first save
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StatDataStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the save file for an object.
    ///
    /// Ids must stay inside the data directory: empty ids, path separators
    /// and `..` are rejected.
    pub fn path_for(&self, object_id: &str) -> Result<PathBuf, StatError> {
        validate_object_id(object_id)?;
        Ok(self.root.join(format!("stat_{}.json", object_id)))
    }

    fn temp_path_for(&self, object_id: &str) -> Result<PathBuf, StatError> {
        validate_object_id(object_id)?;
        Ok(self.root.join(format!("stat_{}.json.tmp", object_id)))
    }

    /// Write the modifier list of one object, replacing any previous file.
    ///
    /// The file is written beside its final name and renamed into place, so a
    /// crash mid-write leaves the previous save intact.
    pub fn save_to_disk(
        &self,
        object_id: &str,
        modifiers: &[StatModifierSaveData],
    ) -> Result<(), StatError> {
        let temp_path = self.temp_path_for(object_id)?;
        let final_path = self.path_for(object_id)?;
        fs::create_dir_all(&self.root)?;

        let envelope = ObjectStatSaveData {
            object_id: object_id.to_string(),
            modifiers: modifiers.to_vec(),
        };
        let json = serde_json::to_string_pretty(&envelope)?;

        if let Err(e) = write_then_rename(&temp_path, &final_path, json.as_bytes()) {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = %temp_path.display(), error = %cleanup, "failed to remove temp save file");
                }
            }
            return Err(e.into());
        }

        info!(
            object = object_id,
            modifiers = modifiers.len(),
            path = %final_path.display(),
            "saved stat modifiers"
        );
        Ok(())
    }

    /// Read the modifier list of one object; `None` when it was never saved
    pub fn load_from_disk(
        &self,
        object_id: &str,
    ) -> Result<Option<Vec<StatModifierSaveData>>, StatError> {
        let path = self.path_for(object_id)?;
        if !path.exists() {
            debug!(object = object_id, "no stat save file");
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let envelope: ObjectStatSaveData = serde_json::from_str(&content)?;

        info!(
            object = object_id,
            modifiers = envelope.modifiers.len(),
            "loaded stat modifiers"
        );
        Ok(Some(envelope.modifiers))
    }

    /// Remove the save file of one object. Returns whether a file existed.
    pub fn delete(&self, object_id: &str) -> Result<bool, StatError> {
        let path = self.path_for(object_id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}

fn validate_object_id(object_id: &str) -> Result<(), StatError> {
    let invalid = object_id.is_empty()
        || object_id.contains("..")
        || object_id.contains(['/', '\\']);
    if invalid {
        return Err(StatError::InvalidObjectId(object_id.to_string()));
    }
    Ok(())
}

fn write_then_rename(temp_path: &Path, final_path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, final_path)
}
