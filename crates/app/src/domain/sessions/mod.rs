//! Sessions
//!
//! Login, validation with sliding renewal, and logout over persisted session rows.

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::SessionsServiceError;
pub use repository::*;
pub use service::*;
