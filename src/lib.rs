//! Barrest
//!
//! Storeless core of the Barrest edge control plane: the signed session token codec and the
//! generic dependency health monitor shared by every service.

pub mod health;
pub mod tokens;
