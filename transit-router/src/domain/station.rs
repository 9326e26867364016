//! Identifier types for stations, trips and lines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier of a station (a GTFS `stop_id`).
///
/// Two values at the top of the range are reserved for the synthetic
/// origin and destination points of a query; schedule data may not use them.
///
/// # Examples
///
/// ```
/// use transit_router::domain::StationId;
///
/// let id = StationId::new(1515);
/// assert!(!id.is_reserved());
/// assert!(StationId::ORIGIN.is_reserved());
/// assert_eq!(id.to_string(), "1515");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(u32);

impl StationId {
    /// Marker station of the synthetic origin vertex.
    pub const ORIGIN: StationId = StationId(u32::MAX);

    /// Marker station of the synthetic destination vertex.
    pub const DESTINATION: StationId = StationId(u32::MAX - 1);

    pub const fn new(id: u32) -> Self {
        StationId(id)
    }

    /// True for the origin and destination markers.
    pub fn is_reserved(self) -> bool {
        self == Self::ORIGIN || self == Self::DESTINATION
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ORIGIN => f.write_str("StationId(origin)"),
            Self::DESTINATION => f.write_str("StationId(destination)"),
            StationId(id) => write!(f, "StationId({id})"),
        }
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ORIGIN => f.write_str("origin"),
            Self::DESTINATION => f.write_str("destination"),
            StationId(id) => write!(f, "{id}"),
        }
    }
}

/// Identifier of a scheduled vehicle run (a GTFS `trip_id`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(String);

impl TripId {
    pub fn new(id: impl Into<String>) -> Self {
        TripId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TripId({})", self.0)
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a line (a GTFS `route_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u32);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
