//! Persistence collaborator for saved annotation sets.
//!
//! The engine never talks to a backend directly. It hands the current
//! [`AnnotationSet`] and playback timestamp to an [`AnnotationStore`] and gets
//! an id back. [`MemoryStore`] keeps records in-process, serialized the same
//! way a remote backend would receive them.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::doc::{AnnotationSet, DocError};

/// Identifier of a saved annotation.
pub type AnnotationId = Uuid;

/// Error returned by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("annotation not found: {0}")]
    NotFound(AnnotationId),
    #[error("store backend failed: {0}")]
    Backend(String),
    #[error(transparent)]
    Codec(#[from] DocError),
}

/// A saved annotation as returned by [`AnnotationStore::load`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAnnotation {
    pub id: AnnotationId,
    pub video_id: String,
    /// Playback position in seconds when the annotation was saved.
    pub timestamp: f64,
    pub strokes: AnnotationSet,
}

/// Save, load, and delete serialized annotation sets.
///
/// Futures are not `Send`: the engine lives on the browser's single thread.
#[async_trait(?Send)]
pub trait AnnotationStore {
    /// Persist `strokes` for `video_id` at `timestamp` and return the new id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if encoding or the backend fails.
    async fn save(&self, video_id: &str, strokes: &AnnotationSet, timestamp: f64) -> Result<AnnotationId, StoreError>;

    /// Fetch a saved annotation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or a codec/backend error.
    async fn load(&self, id: AnnotationId) -> Result<SavedAnnotation, StoreError>;

    /// Remove a saved annotation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    async fn delete(&self, id: AnnotationId) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct Record {
    video_id: String,
    timestamp: f64,
    strokes_json: String,
}

/// In-process store. Strokes are kept as JSON text.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<HashMap<AnnotationId, Record>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved annotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Ids saved for `video_id`, ordered by timestamp.
    #[must_use]
    pub fn ids_for_video(&self, video_id: &str) -> Vec<AnnotationId> {
        let records = self.records.borrow();
        let mut matching: Vec<(AnnotationId, f64)> = records
            .iter()
            .filter(|(_, record)| record.video_id == video_id)
            .map(|(id, record)| (*id, record.timestamp))
            .collect();
        matching.sort_by(|a, b| a.1.total_cmp(&b.1));
        matching.into_iter().map(|(id, _)| id).collect()
    }
}

#[async_trait(?Send)]
impl AnnotationStore for MemoryStore {
    async fn save(&self, video_id: &str, strokes: &AnnotationSet, timestamp: f64) -> Result<AnnotationId, StoreError> {
        if !timestamp.is_finite() {
            return Err(StoreError::Backend(format!("invalid timestamp {timestamp}")));
        }
        let strokes_json = strokes.to_json()?;
        let id = Uuid::new_v4();
        self.records
            .borrow_mut()
            .insert(id, Record { video_id: video_id.to_owned(), timestamp, strokes_json });
        Ok(id)
    }

    async fn load(&self, id: AnnotationId) -> Result<SavedAnnotation, StoreError> {
        let record = self.records.borrow().get(&id).cloned().ok_or(StoreError::NotFound(id))?;
        let strokes = AnnotationSet::from_json(&record.strokes_json)?;
        Ok(SavedAnnotation { id, video_id: record.video_id, timestamp: record.timestamp, strokes })
    }

    async fn delete(&self, id: AnnotationId) -> Result<(), StoreError> {
        match self.records.borrow_mut().remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }
}
