//! Staff
//!
//! The credential store: one row per principal. Read-only to the session lifecycle apart from the
//! last-login timestamp.

pub mod data;
pub mod records;
mod repository;

pub use repository::*;
