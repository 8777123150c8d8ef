//! Repository trait implemented by storage backends.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Collection, Entry, FieldMap};

/// Generic CRUD over the four entry collections.
///
/// One implementation serves every collection; callers pass the collection
/// with each operation. All operations are single-document: `insert_many` is
/// a batch of independent inserts with per-document atomicity, not a
/// transaction.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// All entries of a collection, in insertion order. No pagination.
    async fn list(&self, collection: Collection) -> Result<Vec<Entry>>;

    /// One entry by identifier, or `None` if it does not exist.
    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Entry>>;

    /// Insert the field map as-is and return the generated identifier.
    ///
    /// No field validation happens here; routes decide what to accept.
    async fn insert(&self, collection: Collection, fields: FieldMap) -> Result<Uuid>;

    /// Replace only the provided fields of an existing entry.
    ///
    /// The `id` key is stripped from the payload before apply. Returns
    /// [`crate::Error::EntryNotFound`] when no entry matches.
    async fn update(&self, collection: Collection, id: Uuid, fields: FieldMap) -> Result<()>;

    /// Delete an entry. Returns [`crate::Error::EntryNotFound`] when no entry
    /// matches.
    async fn delete(&self, collection: Collection, id: Uuid) -> Result<()>;

    /// Insert a batch of field maps, returning the generated identifiers in
    /// input order.
    async fn insert_many(&self, collection: Collection, items: Vec<FieldMap>) -> Result<Vec<Uuid>>;
}
