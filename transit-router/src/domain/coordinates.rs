//! Geographic coordinates and straight-line distances.

use std::fmt;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Error returned for latitude/longitude values outside their ranges.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinates ({latitude}, {longitude}): {reason}")]
pub struct InvalidCoordinates {
    latitude: f64,
    longitude: f64,
    reason: &'static str,
}

/// A WGS84 position in decimal degrees.
///
/// # Examples
///
/// ```
/// use transit_router::domain::Coordinates;
///
/// let a = Coordinates::new(46.758029, -71.336759).unwrap();
/// let b = Coordinates::new(46.829049, -71.248305).unwrap();
/// let km = a.distance_km(&b);
/// assert!(km > 9.0 && km < 11.0);
///
/// assert!(Coordinates::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Latitude must lie in [-90, 90], longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinates> {
        let invalid = |reason| InvalidCoordinates {
            latitude,
            longitude,
            reason,
        };
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(invalid("latitude must be within [-90, 90]"));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid("longitude must be within [-180, 180]"));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle (haversine) distance in kilometres.
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);

        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}
