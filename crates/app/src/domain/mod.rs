//! Barrest Domain Concerns

pub mod sessions;
pub mod staff;
pub mod store;
