//! Stateful core of the Barrest edge control plane: credential and session stores, the session
//! lifecycle service, concrete health probes and the gateway's session client.

pub mod clients;
pub mod context;
pub mod database;
pub mod domain;
pub mod passwords;
pub mod probes;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

#[cfg(test)]
mod test;

mod uuids;

pub use domain::{sessions, staff};
