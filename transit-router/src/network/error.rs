//! Network error types.

use std::fmt;

use super::EventKey;
use crate::domain::{LineId, StationId, TripId};
use crate::graph::{GraphError, VertexId};
use crate::schedule::StopEventId;

/// The kind of arc being added when a weight turned out invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcClass {
    /// Consecutive stops of one trip
    Ride,
    /// Staying at a station until its next event
    Wait,
    /// Walking between two stations
    Transfer,
    /// From the query origin to a nearby station
    OriginAccess,
    /// From a nearby station to the query destination
    DestinationAccess,
}

impl fmt::Display for ArcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArcClass::Ride => "ride",
            ArcClass::Wait => "wait",
            ArcClass::Transfer => "transfer",
            ArcClass::OriginAccess => "origin access",
            ArcClass::DestinationAccess => "destination access",
        };
        f.write_str(name)
    }
}

/// Errors from building, attaching to, or querying a transit network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// A graph operation addressed a vertex or arc that does not exist
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A computed weight was negative or did not fit below the
    /// unreachable sentinel; the schedule violates its own ordering
    #[error("inconsistent schedule: {class} arc from {from:?} to {to:?} would take {seconds}s")]
    InconsistentSchedule {
        class: ArcClass,
        from: EventKey,
        to: EventKey,
        seconds: i64,
    },

    #[error("stop event {0:?} has no vertex")]
    UnmappedEvent(EventKey),

    #[error("vertex {0} has no stop event")]
    UnmappedVertex(VertexId),

    #[error("only {mapped} of {total} stop events belong to a trip")]
    OrphanStopEvents { mapped: usize, total: usize },

    #[error("stop event {0:?} is missing from the schedule")]
    UnknownStopEvent(StopEventId),

    #[error("unknown station {0}")]
    UnknownStation(StationId),

    #[error("unknown trip {0}")]
    UnknownTrip(TripId),

    #[error("unknown line {0}")]
    UnknownLine(LineId),

    /// The walk to or from a station cannot be expressed as a duration
    #[error("walking time for station {0} is out of range")]
    WalkTime(StationId),

    /// `attach` while an origin/destination pair is in place
    #[error("an origin and destination are already attached")]
    AlreadyAttached,

    /// `detach` or `route` without an attached pair
    #[error("no origin and destination attached")]
    NotAttached,

    /// The shortest path does not have the shape of an itinerary
    #[error("malformed path: {0}")]
    MalformedPath(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = NetworkError::InconsistentSchedule {
            class: ArcClass::Ride,
            from: EventKey::Scheduled(StopEventId(3)),
            to: EventKey::Scheduled(StopEventId(4)),
            seconds: -60,
        };
        assert_eq!(
            err.to_string(),
            "inconsistent schedule: ride arc from Scheduled(StopEventId(3)) to \
             Scheduled(StopEventId(4)) would take -60s"
        );

        assert_eq!(
            NetworkError::AlreadyAttached.to_string(),
            "an origin and destination are already attached"
        );
        assert_eq!(
            NetworkError::NotAttached.to_string(),
            "no origin and destination attached"
        );
        assert_eq!(
            NetworkError::MalformedPath("too short").to_string(),
            "malformed path: too short"
        );

        assert_eq!(
            NetworkError::WalkTime(StationId::new(7)).to_string(),
            "walking time for station 7 is out of range"
        );

        let err: NetworkError = GraphError::ArcNotFound { from: 1, to: 2 }.into();
        assert_eq!(err.to_string(), "no arc from 1 to 2");
    }

    #[test]
    fn arc_class_display() {
        assert_eq!(ArcClass::Wait.to_string(), "wait");
        assert_eq!(ArcClass::OriginAccess.to_string(), "origin access");
        assert_eq!(ArcClass::DestinationAccess.to_string(), "destination access");
    }
}
