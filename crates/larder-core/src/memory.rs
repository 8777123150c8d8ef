//! In-memory [`EntryRepository`] for tests.
//!
//! Always compiled so integration tests in dependent crates can use it
//! without a running PostgreSQL instance. Behavior mirrors the database
//! implementation: insertion order, shallow field merge on update, and
//! not-found signals on zero matches.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{strip_id, Collection, Entry, FieldMap};
use crate::traits::EntryRepository;

#[derive(Default)]
pub struct MemoryEntryRepository {
    collections: RwLock<HashMap<Collection, Vec<Entry>>>,
}

impl MemoryEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_poisoned() -> Error {
        Error::Config("memory repository lock poisoned".to_string())
    }
}

#[async_trait]
impl EntryRepository for MemoryEntryRepository {
    async fn list(&self, collection: Collection) -> Result<Vec<Entry>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| Self::lock_poisoned())?;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Entry>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| Self::lock_poisoned())?;
        Ok(collections
            .get(&collection)
            .and_then(|entries| entries.iter().find(|e| e.id == id))
            .cloned())
    }

    async fn insert(&self, collection: Collection, mut fields: FieldMap) -> Result<Uuid> {
        strip_id(&mut fields);
        let id = Uuid::now_v7();
        let mut collections = self
            .collections
            .write()
            .map_err(|_| Self::lock_poisoned())?;
        collections
            .entry(collection)
            .or_default()
            .push(Entry { id, fields });
        Ok(id)
    }

    async fn update(&self, collection: Collection, id: Uuid, mut fields: FieldMap) -> Result<()> {
        strip_id(&mut fields);
        let mut collections = self
            .collections
            .write()
            .map_err(|_| Self::lock_poisoned())?;
        let entry = collections
            .get_mut(&collection)
            .and_then(|entries| entries.iter_mut().find(|e| e.id == id))
            .ok_or(Error::EntryNotFound(id))?;
        for (key, value) in fields {
            entry.fields.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| Self::lock_poisoned())?;
        let entries = collections
            .get_mut(&collection)
            .ok_or(Error::EntryNotFound(id))?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Err(Error::EntryNotFound(id));
        }
        Ok(())
    }

    async fn insert_many(&self, collection: Collection, items: Vec<FieldMap>) -> Result<Vec<Uuid>> {
        let mut ids = Vec::with_capacity(items.len());
        for fields in items {
            ids.push(self.insert(collection, fields).await?);
        }
        Ok(ids)
    }
}
