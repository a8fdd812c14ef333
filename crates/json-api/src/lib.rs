//! Barrest JSON services
//!
//! HTTP surfaces of the Barrest edge: the session service (login, validation with sliding
//! renewal, logout) and the API gateway that authenticates and proxies every other route.

pub mod config;
pub mod errors;
pub mod gateway;
pub mod healthcheck;
pub mod observability;
pub mod sessions;
pub mod shutdown;
pub mod state;

mod extensions;
#[cfg(test)]
mod test_helpers;
