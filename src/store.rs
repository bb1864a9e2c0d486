//! Storage collaborator contract.
//!
//! The core never talks to a backend directly; it hands a [`Document`] to
//! a [`ProjectStore`] and reads the receipt. Failures are opaque and the
//! core does not retry.

use std::collections::BTreeMap;

use crate::{
    codec::Document,
    error::{EaselError, EaselResult},
};

#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Whether a save wrote a new project or replaced an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveStatus {
    Created,
    Updated,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SaveReceipt {
    pub id: ProjectId,
    pub status: SaveStatus,
}

pub trait ProjectStore {
    fn save(&mut self, id: &ProjectId, doc: &Document) -> EaselResult<SaveReceipt>;
    fn load(&self, id: &ProjectId) -> EaselResult<Document>;
    fn delete(&mut self, id: &ProjectId) -> EaselResult<()>;
}

/// In-memory store backing tests and the CLI's dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: BTreeMap<ProjectId, Document>,
}

impl ProjectStore for MemoryStore {
    fn save(&mut self, id: &ProjectId, doc: &Document) -> EaselResult<SaveReceipt> {
        doc.validate()?;
        let status = match self.docs.insert(id.clone(), doc.clone()) {
            None => SaveStatus::Created,
            Some(_) => SaveStatus::Updated,
        };
        Ok(SaveReceipt {
            id: id.clone(),
            status,
        })
    }

    fn load(&self, id: &ProjectId) -> EaselResult<Document> {
        self.docs
            .get(id)
            .cloned()
            .ok_or_else(|| EaselError::storage(format!("no project {:?}", id.0)))
    }

    fn delete(&mut self, id: &ProjectId) -> EaselResult<()> {
        self.docs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| EaselError::storage(format!("no project {:?}", id.0)))
    }
}
