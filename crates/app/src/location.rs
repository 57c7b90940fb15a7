//! Location access.
//!
//! The browser original read coordinates from the geolocation API; here
//! the source is an injected provider so embedders can supply real
//! coordinates (flags, config, a GPS daemon) and tests can simulate
//! denial. A provider failure degrades the nearby view only - other
//! views never depend on location.

use async_trait::async_trait;
use thiserror::Error;

/// A geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Why a location read failed.
#[derive(Debug, Clone, Error)]
pub enum LocationError {
    /// The user (or platform) refused the location read.
    #[error("Unable to get your location. Please enable location services.")]
    Denied,
    /// No location source is available at all.
    #[error("Location is not supported by this client.")]
    Unsupported,
}

/// Source of the device's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Read the current position.
    ///
    /// # Errors
    ///
    /// Returns a [`LocationError`] when the read is denied or no source
    /// exists.
    async fn current_location(&self) -> Result<Coordinates, LocationError>;
}

/// Provider returning a fixed coordinate pair.
pub struct FixedLocation {
    coordinates: Coordinates,
}

impl FixedLocation {
    /// Create a provider for the given coordinates.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinates: Coordinates {
                latitude,
                longitude,
            },
        }
    }

    /// Build from `TIFFIN_LATITUDE`/`TIFFIN_LONGITUDE`, if both are set
    /// and parse.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let latitude = std::env::var("TIFFIN_LATITUDE").ok()?.parse().ok()?;
        let longitude = std::env::var("TIFFIN_LONGITUDE").ok()?.parse().ok()?;
        Some(Self::new(latitude, longitude))
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        Ok(self.coordinates)
    }
}

/// Provider for environments with no location source.
pub struct LocationUnavailable;

#[async_trait]
impl LocationProvider for LocationUnavailable {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Provider that always reports a denied read (tests).
pub struct LocationDenied;

#[async_trait]
impl LocationProvider for LocationDenied {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Denied)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_location() {
        let provider = FixedLocation::new(12.97, 77.59);
        let coords = provider.current_location().await.unwrap();
        assert!((coords.latitude - 12.97).abs() < f64::EPSILON);
        assert!((coords.longitude - 77.59).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_unavailable_and_denied() {
        assert!(matches!(
            LocationUnavailable.current_location().await,
            Err(LocationError::Unsupported)
        ));
        assert!(matches!(
            LocationDenied.current_location().await,
            Err(LocationError::Denied)
        ));
    }
}
