//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::Depot;

use crate::{errors::ApiError, observability::REQUEST_ID_DEPOT_KEY};

/// Helpers for reading request-scoped values out of the depot.
pub(crate) trait DepotExt {
    /// Injected state of type `T`, or an internal error attributed to `service`.
    fn obtain_or_500<T: Any + Send + Sync>(&self, service: &str) -> Result<&T, ApiError>;

    /// Correlation id recorded by the request logging hoop.
    fn request_id(&self) -> Option<&str>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self, service: &str) -> Result<&T, ApiError> {
        self.obtain::<T>().map_err(|_ignored| {
            tracing::error!("missing injected state in depot");

            ApiError::internal("An internal error occurred", service)
        })
    }

    fn request_id(&self) -> Option<&str> {
        self.get::<String>(REQUEST_ID_DEPOT_KEY)
            .ok()
            .map(String::as_str)
    }
}
