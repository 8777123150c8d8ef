//! # larder-client
//!
//! Client-side data-manager for the larder REST API.
//!
//! One [`DataManager`] instance serves one collection: it fetches the full
//! collection into memory, answers case-insensitive substring searches over
//! it, and issues create/update/delete/bulk-import requests, refetching the
//! whole collection after every successful mutation. CSV import reshapes
//! parsed rows to the collection's field schema before posting them as one
//! batch.

pub mod csv_import;
pub mod manager;

pub use csv_import::parse_rows;
pub use manager::{DataManager, Draft, Phase};
