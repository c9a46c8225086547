use thiserror::Error as ThisError;

/// Why a submitted form was rejected.
#[derive(Debug, Clone, PartialEq, ThisError)]
#[non_exhaustive]
pub enum InputError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Failure reported by a [`crate::geolocation::Geolocator`].
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum GeolocationError {
    #[error("permission to read the position was denied")]
    PermissionDenied,
    #[error("position unavailable: {0}")]
    Unavailable(String),
    #[error("timed out waiting for a position")]
    Timeout,
}

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store error: {0}")]
    Common(String),
}

impl From<&str> for StoreError {
    fn from(s: &str) -> Self {
        StoreError::Common(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum CoordsParseError {
    #[error("expected `lat,lng`, got `{0}`")]
    Format(String),
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}
