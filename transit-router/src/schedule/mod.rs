//! Schedule data for one service date.
//!
//! The schedule is populated once (programmatically or from a JSON
//! snapshot) and then read by the network builder. It never changes while
//! a network built from it is in use.

mod error;
mod model;
mod snapshot;

pub use error::ScheduleError;
pub use model::{Line, Schedule, Station, StopEvent, StopEventId, Transfer, Trip};
pub use snapshot::{
    LineRecord, ScheduleSnapshot, StationRecord, StopTimeRecord, TransferRecord, TripRecord,
};
