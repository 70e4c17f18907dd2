use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::{StoreError, StoreResult};
use crate::store::{CorruptPolicy, FileInfo, JsonFileStore};
use crate::{display_name, REFLECTIONS_COLLECTION};

/// Date stamp used for reflections, e.g. `Mon Oct 19 2026`.
pub const REFLECTION_DATE_FORMAT: &str = "%a %b %d %Y";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    /// Absent on entries written before ids were assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub date: String,
    pub reflection: String,
}

impl Reflection {
    pub fn new(name: Option<&str>, text: &str) -> StoreResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyReflection);
        }
        Ok(Self {
            id: Some(Uuid::new_v4()),
            name: display_name(name),
            date: Local::now().format(REFLECTION_DATE_FORMAT).to_string(),
            reflection: text.to_string(),
        })
    }
}

/// The reflections collection. Entries are addressed by position; the order
/// in the file is insertion order.
pub struct ReflectionBook {
    store: JsonFileStore<Reflection>,
}

impl ReflectionBook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonFileStore::new(path, REFLECTIONS_COLLECTION),
        }
    }

    pub fn with_policy(self, policy: CorruptPolicy) -> Self {
        Self {
            store: self.store.with_policy(policy),
        }
    }

    pub fn store(&self) -> &JsonFileStore<Reflection> {
        &self.store
    }

    pub fn add(&self, name: Option<&str>, text: &str) -> StoreResult<Reflection> {
        let entry = Reflection::new(name, text)?;
        let total = self.store.update(|records| {
            records.push(entry.clone());
            Ok(records.len())
        })?;
        info!(name = %entry.name, total, "reflection added");
        Ok(entry)
    }

    pub fn list(&self) -> StoreResult<Vec<Reflection>> {
        self.store.load()
    }

    /// Removes the entry at `index`; later entries shift down by one.
    pub fn delete(&self, index: i64) -> StoreResult<Reflection> {
        let removed = self.store.update(|records| {
            let len = records.len();
            match usize::try_from(index) {
                Ok(position) if position < len => Ok(records.remove(position)),
                _ => Err(StoreError::IndexOutOfRange { index, len }),
            }
        })?;
        info!(index, name = %removed.name, "reflection deleted");
        Ok(removed)
    }

    pub fn delete_by_id(&self, id: Uuid) -> StoreResult<Reflection> {
        let removed = self.store.update(|records| {
            let position = records
                .iter()
                .position(|record| record.id == Some(id))
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            Ok(records.remove(position))
        })?;
        info!(%id, "reflection deleted by id");
        Ok(removed)
    }

    pub fn clear(&self) -> StoreResult<usize> {
        let removed = self.store.clear()?;
        info!(removed, "reflections cleared");
        Ok(removed)
    }

    pub fn file_info(&self) -> StoreResult<Option<FileInfo>> {
        self.store.file_info()
    }
}
