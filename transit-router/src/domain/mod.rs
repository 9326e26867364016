//! Domain value types for the transit router.
//!
//! Identifiers, geographic positions and schedule instants. All types
//! enforce their invariants at construction time, so code that receives
//! them can trust their validity.

mod coordinates;
mod station;
mod time;

pub use coordinates::{Coordinates, InvalidCoordinates};
pub use station::{LineId, StationId, TripId};
pub use time::{ScheduleTime, TimeError, split_hms};
