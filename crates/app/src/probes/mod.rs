//! Concrete health probes.

mod database;
mod http;

pub use database::{DATABASE_TARGET, DatabaseProbe};
pub use http::{HEALTH_CHECK_HEADER, HttpProbe};
