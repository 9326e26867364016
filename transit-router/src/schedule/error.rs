//! Schedule error types.
//!
//! These errors describe schedule data that is malformed or refers to
//! entities that do not exist. They are raised while the schedule is being
//! assembled, before any graph is built.

use crate::domain::{InvalidCoordinates, LineId, StationId, TimeError, TripId};

/// Errors raised while assembling or loading a schedule.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Station id collides with an origin/destination marker
    #[error("station id {0:?} is reserved")]
    ReservedStation(StationId),

    #[error("station {0} is defined twice")]
    DuplicateStation(StationId),

    #[error("line {0} is defined twice")]
    DuplicateLine(LineId),

    #[error("trip {0} is defined twice")]
    DuplicateTrip(TripId),

    #[error("unknown station {0}")]
    UnknownStation(StationId),

    #[error("unknown line {0}")]
    UnknownLine(LineId),

    #[error("unknown trip {0}")]
    UnknownTrip(TripId),

    /// Two stop events of one trip share a sequence number
    #[error("trip {trip} has two stops with sequence {sequence}")]
    DuplicateSequence { trip: TripId, sequence: u32 },

    #[error("trip {trip} departs stop {sequence} before arriving")]
    DepartureBeforeArrival { trip: TripId, sequence: u32 },

    /// Window end precedes window start
    #[error("schedule window ends before it starts")]
    InvalidWindow,

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error(transparent)]
    Time(#[from] TimeError),

    #[error(transparent)]
    Coordinates(#[from] InvalidCoordinates),

    #[error("malformed schedule snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read schedule snapshot: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ScheduleError::ReservedStation(StationId::ORIGIN);
        assert_eq!(err.to_string(), "station id StationId(origin) is reserved");

        let err = ScheduleError::UnknownStation(StationId::new(12));
        assert_eq!(err.to_string(), "unknown station 12");

        let err = ScheduleError::DuplicateSequence {
            trip: TripId::new("T1"),
            sequence: 3,
        };
        assert_eq!(err.to_string(), "trip T1 has two stops with sequence 3");

        let err = ScheduleError::InvalidDate("09/02/2017".into());
        assert_eq!(
            err.to_string(),
            "invalid date \"09/02/2017\", expected YYYY-MM-DD"
        );
    }
}
