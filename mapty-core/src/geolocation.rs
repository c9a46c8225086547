use async_trait::async_trait;
use log::debug;

use crate::errors::GeolocationError;
use crate::geo::Coords;

/// Source of the device's current position.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> Result<Coords, GeolocationError>;
}

/// Reports a configured position, or `Unavailable` when none is configured.
#[derive(Debug, Clone, Default)]
pub struct FixedGeolocator {
    position: Option<Coords>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coords>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coords, GeolocationError> {
        debug!("fixed geolocator asked for position: {:?}", self.position);
        self.position.ok_or_else(|| {
            GeolocationError::Unavailable("no home position configured".to_string())
        })
    }
}
