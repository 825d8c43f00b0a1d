//! Index-addressed document store.
//!
//! Documents live in a single ordered sequence guarded by one lock. Indices
//! are always `0..len`: removal shifts every later document down by one and
//! appends go to the end.
//!
//! Write operations take the payload as a closure producing the document.
//! The closure is only evaluated after the index has been checked, while
//! the write lock is held, so bounds errors always win over payload errors
//! and no concurrent request can move the target in between.

use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

/// An opaque JSON document, stored and returned verbatim.
pub type Document = Value;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no document at index {index} (store holds {len})")]
    NotFound { index: usize, len: usize },

    #[error("{0}")]
    InvalidPayload(String),
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    docs: RwLock<Vec<Document>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Snapshot of every document, in index order.
    pub fn list(&self) -> Vec<Document> {
        self.docs.read().clone()
    }

    pub fn get(&self, index: usize) -> Option<Document> {
        self.docs.read().get(index).cloned()
    }

    /// Appends the payload and returns it with the index it was given.
    pub fn append<F>(&self, payload: F) -> Result<(usize, Document), StoreError>
    where
        F: FnOnce() -> Result<Document, StoreError>,
    {
        let doc = payload()?;

        let mut docs = self.docs.write();
        docs.push(doc.clone());
        Ok((docs.len() - 1, doc))
    }

    /// Replaces the document at `index` wholesale.
    pub fn replace_at<F>(&self, index: usize, payload: F) -> Result<Document, StoreError>
    where
        F: FnOnce() -> Result<Document, StoreError>,
    {
        let mut docs = self.docs.write();
        let len = docs.len();
        let slot = docs.get_mut(index).ok_or(StoreError::NotFound { index, len })?;

        let doc = payload()?;
        *slot = doc.clone();
        Ok(doc)
    }

    /// Shallow merge: every key of the payload overwrites or adds the same
    /// key on the stored document, other stored keys are left alone.
    ///
    /// Both sides must be JSON objects.
    pub fn merge_at<F>(&self, index: usize, payload: F) -> Result<Document, StoreError>
    where
        F: FnOnce() -> Result<Document, StoreError>,
    {
        let mut docs = self.docs.write();
        let len = docs.len();
        let target = docs.get_mut(index).ok_or(StoreError::NotFound { index, len })?;

        let Value::Object(patch) = payload()? else {
            return Err(StoreError::InvalidPayload(
                "merge payload must be a JSON object".to_string(),
            ));
        };
        let Value::Object(fields) = &mut *target else {
            return Err(StoreError::InvalidPayload(format!(
                "document at index {index} is not a JSON object"
            )));
        };

        for (key, value) in patch {
            fields.insert(key, value);
        }
        Ok(target.clone())
    }

    /// Removes the document at `index`; later documents shift down by one.
    pub fn remove_at(&self, index: usize) -> Result<Document, StoreError> {
        let mut docs = self.docs.write();
        let len = docs.len();
        if index >= len {
            return Err(StoreError::NotFound { index, len });
        }
        Ok(docs.remove(index))
    }
}
