//! HTTP handlers.

pub mod access;
pub mod entries;
pub mod health;
