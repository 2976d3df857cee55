//! WGS84 coordinates for containers and depots.

use geo::Point;
use thiserror::Error;

/// A latitude/longitude pair in decimal degrees.
///
/// Fields are public so values can be read from storage or JSON as-is; use
/// [`GeoPoint::new`] or [`GeoPoint::validate`] before trusting them.
///
/// # Examples
/// ```
/// use kerbside_core::GeoPoint;
///
/// let point = GeoPoint::new(11.53952, -72.92859).expect("valid point");
/// assert_eq!(point.latitude, 11.53952);
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    /// Latitude in degrees, `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in degrees, `[-180, 180]`.
    pub longitude: f64,
}

/// A latitude or longitude fell outside its valid range.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("coordinate ({latitude}, {longitude}) is outside the valid latitude/longitude range")]
pub struct CoordinateError {
    /// Offending latitude.
    pub latitude: f64,
    /// Offending longitude.
    pub longitude: f64,
}

impl GeoPoint {
    /// Validate and construct a [`GeoPoint`].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate()?;
        Ok(point)
    }

    /// Check that both components are finite and within range.
    ///
    /// `NaN` and infinities are rejected because they fall outside every
    /// inclusive range.
    pub fn validate(&self) -> Result<(), CoordinateError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CoordinateError {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Return `true` when the point lies within the WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<GeoPoint> for Point<f64> {
    /// `geo` uses `x = longitude` and `y = latitude`.
    fn from(point: GeoPoint) -> Self {
        Self::new(point.longitude, point.latitude)
    }
}
