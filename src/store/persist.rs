// Snapshot persistence module
// Loads and saves the trivia tables as a TOML file

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::models::{Category, Question};
use super::StoreError;

/// On-disk form of the store
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Next id handed out by insert; ids are never reused
    #[serde(default)]
    pub next_question_id: i64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<Question>,
}

/// Snapshot file handle
#[derive(Debug)]
pub struct SnapshotFile {
    path: PathBuf,
    /// Whether mutations are written back
    persist: bool,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>, persist: bool) -> Self {
        Self {
            path: path.into(),
            persist,
        }
    }

    /// Read the snapshot; a missing file yields `None`
    pub fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        if !self.path.exists() {
            crate::logger::log_warning(&format!(
                "Data file {} not found, starting with an empty store",
                self.path.display()
            ));
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        let snapshot = toml::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        crate::logger::log_info(&format!("Loaded trivia data from {}", self.path.display()));
        Ok(Some(snapshot))
    }

    /// Write the snapshot if persistence is enabled
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if !self.persist {
            return Ok(());
        }

        let content = toml::to_string_pretty(snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }

        // Write-then-rename so a crash never leaves a truncated data file
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;

        crate::logger::log_debug(&format!("Saved trivia data to {}", self.path.display()));
        Ok(())
    }

    #[allow(clippy::missing_const_for_fn)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot {
            next_question_id: 3,
            categories: vec![Category {
                id: 1,
                kind: "Science".to_string(),
            }],
            questions: vec![
                Question {
                    id: 1,
                    question: Some("Hematology is a branch of medicine involving the study of what?".to_string()),
                    answer: Some("Blood".to_string()),
                    category: Some(1),
                    difficulty: Some(4),
                },
                Question {
                    id: 2,
                    question: None,
                    answer: None,
                    category: None,
                    difficulty: None,
                },
            ],
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("absent.toml"), true);
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("nested/trivia.toml"), true);
        file.save(&sample()).unwrap();
        assert_eq!(file.load().unwrap(), Some(sample()));
    }

    #[test]
    fn test_save_disabled_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("trivia.toml"), false);
        file.save(&sample()).unwrap();
        assert!(!file.path().exists());
    }

    #[test]
    fn test_parse_error_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[[questions]]\nid = \"seven\"\n").unwrap();
        let err = SnapshotFile::new(&path, true).load().unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }
}
