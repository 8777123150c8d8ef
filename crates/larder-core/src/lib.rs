//! # larder-core
//!
//! Core types, traits, and abstractions for the larder meal-planning service.
//!
//! This crate provides the entry document model, the per-collection field
//! schemas, the authorization policy, and the repository trait that the
//! database and HTTP layers implement and consume. It performs no I/O.

pub mod auth;
pub mod error;
pub mod memory;
pub mod models;
pub mod search;
pub mod traits;

// Re-export commonly used types at crate root
pub use auth::{AccessPolicy, Action, Decision, Identity};
pub use error::{Error, Result};
pub use memory::MemoryEntryRepository;
pub use models::{
    field_str, has_nonempty_name, strip_id, Collection, Entry, FieldKind, FieldMap, FieldSpec,
    Season,
};
pub use search::{entry_matches, filter_entries};
pub use traits::EntryRepository;
