// Source trait for driver location data
use crate::domain::driver::DriverId;
use crate::domain::location::DriverLocationFix;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The call to the backend could not complete
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with an unexpected payload shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("no location found for driver {0}")]
    NotFound(DriverId),
}

#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Fetch the current fix of every driver
    async fn fetch_all(&self) -> Result<Vec<DriverLocationFix>, FetchError>;

    /// Fetch the fix of a single driver
    async fn fetch_one(&self, driver_id: DriverId) -> Result<DriverLocationFix, FetchError>;
}
