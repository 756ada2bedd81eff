//! Trivia store module
//!
//! Holds the `categories` and `questions` tables in memory and mirrors every
//! mutation to an optional TOML snapshot. Handlers receive the store through
//! `AppState`; nothing here is global.

mod models;
mod persist;

pub use models::{lenient_int, Category, NewQuestion, Question};
pub use persist::{Snapshot, SnapshotFile};

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::StoreConfig;

/// Store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// In-memory tables, ordered by id
#[derive(Debug, Clone, Default)]
struct Tables {
    categories: BTreeMap<i64, Category>,
    questions: BTreeMap<i64, Question>,
    next_question_id: i64,
}

impl Tables {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let categories = snapshot
            .categories
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let questions: BTreeMap<i64, Question> = snapshot
            .questions
            .into_iter()
            .map(|q| (q.id, q))
            .collect();
        let highest = questions.keys().next_back().copied().unwrap_or(0);
        Self {
            categories,
            questions,
            next_question_id: snapshot.next_question_id.max(highest + 1),
        }
    }

    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            next_question_id: self.next_question_id,
            categories: self.categories.values().cloned().collect(),
            questions: self.questions.values().cloned().collect(),
        }
    }
}

/// Shared handle passed to request handlers
pub type SharedStore = Arc<TriviaStore>;

/// Category and question tables
#[derive(Debug)]
pub struct TriviaStore {
    tables: RwLock<Tables>,
    snapshot: Option<SnapshotFile>,
}

impl TriviaStore {
    /// Open the store described by the configuration
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let Some(path) = config.data_file.as_deref() else {
            return Ok(Self::in_memory(Snapshot::default()));
        };

        let file = SnapshotFile::new(path, config.persist);
        let tables = file
            .load()?
            .map(Tables::from_snapshot)
            .unwrap_or_else(|| Tables::from_snapshot(Snapshot::default()));

        Ok(Self {
            tables: RwLock::new(tables),
            snapshot: Some(file),
        })
    }

    /// Store without a backing file
    pub fn in_memory(seed: Snapshot) -> Self {
        Self {
            tables: RwLock::new(Tables::from_snapshot(seed)),
            snapshot: None,
        }
    }

    /// Backing snapshot path, if any
    pub fn data_file(&self) -> Option<&std::path::Path> {
        self.snapshot.as_ref().map(SnapshotFile::path)
    }

    /// All categories in id order
    pub async fn categories(&self) -> Vec<Category> {
        self.tables.read().await.categories.values().cloned().collect()
    }

    pub async fn category(&self, id: i64) -> Option<Category> {
        self.tables.read().await.categories.get(&id).cloned()
    }

    /// All questions in id order
    pub async fn questions(&self) -> Vec<Question> {
        self.tables.read().await.questions.values().cloned().collect()
    }

    pub async fn question_count(&self) -> usize {
        self.tables.read().await.questions.len()
    }

    pub async fn questions_in_category(&self, category: i64) -> Vec<Question> {
        self.tables
            .read()
            .await
            .questions
            .values()
            .filter(|q| q.category == Some(category))
            .cloned()
            .collect()
    }

    /// Questions whose text contains `term` (case-sensitive)
    pub async fn search(&self, term: &str) -> Vec<Question> {
        self.tables
            .read()
            .await
            .questions
            .values()
            .filter(|q| q.question.as_deref().is_some_and(|text| text.contains(term)))
            .cloned()
            .collect()
    }

    /// Questions eligible for a quiz draw.
    ///
    /// `category: None` admits every category; ids in `excluded` are skipped.
    pub async fn quiz_candidates(
        &self,
        category: Option<i64>,
        excluded: &HashSet<i64>,
    ) -> Vec<Question> {
        self.tables
            .read()
            .await
            .questions
            .values()
            .filter(|q| category.is_none() || q.category == category)
            .filter(|q| !excluded.contains(&q.id))
            .cloned()
            .collect()
    }

    /// Insert a question and return its new id
    pub async fn insert(&self, new: NewQuestion) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        let mut next = tables.clone();

        let id = next.next_question_id;
        next.questions.insert(id, new.into_row(id));
        next.next_question_id = id + 1;

        self.commit(&mut tables, next)?;
        Ok(id)
    }

    /// Delete a question; `false` when no row has that id
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.questions.contains_key(&id) {
            return Ok(false);
        }

        let mut next = tables.clone();
        next.questions.remove(&id);

        self.commit(&mut tables, next)?;
        Ok(true)
    }

    /// Persist `next`, then make it current. A failed write leaves `current` untouched.
    fn commit(&self, current: &mut Tables, next: Tables) -> Result<(), StoreError> {
        if let Some(file) = &self.snapshot {
            file.save(&next.to_snapshot())?;
        }
        *current = next;
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::{Category, Question, Snapshot};

    /// Six categories and 24 questions spread across them
    pub fn seed() -> Snapshot {
        let labels = [
            "Science",
            "Art",
            "Geography",
            "History",
            "Entertainment",
            "Sports",
        ];
        let categories = labels
            .iter()
            .zip(1..)
            .map(|(label, id)| Category {
                id,
                kind: (*label).to_string(),
            })
            .collect();
        let questions = (1..=24)
            .map(|id| Question {
                id,
                question: Some(format!("Question number {id}?")),
                answer: Some(format!("Answer {id}")),
                category: Some((id - 1) % 6 + 1),
                difficulty: Some((id - 1) % 5 + 1),
            })
            .collect();
        Snapshot {
            next_question_id: 25,
            categories,
            questions,
        }
    }
}
