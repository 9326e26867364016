//! Itineraries reconstructed from shortest paths, and their narration.

use std::fmt;

use crate::domain::{ScheduleTime, StationId, TripId, split_hms};
use crate::graph::VertexId;

/// A station as shown to the rider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationRef {
    pub id: StationId,
    pub name: String,
}

impl fmt::Display for StationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.id, self.name)
    }
}

/// One instruction of an itinerary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Walk from the origin to the first station.
    WalkToStation(StationRef),

    /// Ride one trip between two of its stops.
    Ride {
        /// Public line number.
        line: String,
        trip: TripId,
        headsign: String,
        from: StationRef,
        departure: ScheduleTime,
        to: StationRef,
        arrival: ScheduleTime,
    },

    /// Walk between two stations.
    Walk { from: StationRef, to: StationRef },

    /// Walk from the last station to the destination.
    WalkToDestination(StationRef),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::WalkToStation(station) => write!(f, "Go to station {station}"),
            Step::Ride {
                line,
                trip,
                headsign,
                to,
                departure,
                arrival,
                ..
            } => {
                write!(f, "From this station, take bus number {line} at {departure} (trip {trip}")?;
                if !headsign.is_empty() {
                    write!(f, ", towards {headsign}")?;
                }
                write!(f, ") and get off at station {to} at {arrival}")
            }
            Step::Walk { to, .. } => write!(f, "From this station, walk to station {to}"),
            Step::WalkToDestination(_) => f.write_str("Walk from this station to the destination"),
        }
    }
}

/// A fastest journey from origin to destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    /// Start of the schedule window, when the rider leaves the origin.
    pub departure: ScheduleTime,
    pub steps: Vec<Step>,
    pub arrival: ScheduleTime,
    pub travel_time_secs: u32,
}

impl Itinerary {
    /// Trips ridden, in order.
    pub fn trips(&self) -> impl Iterator<Item = &TripId> {
        self.steps.iter().filter_map(|step| match step {
            Step::Ride { trip, .. } => Some(trip),
            _ => None,
        })
    }

    /// Number of vehicle changes.
    pub fn transfer_count(&self) -> usize {
        self.trips().count().saturating_sub(1)
    }
}

impl fmt::Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=====================")?;
        writeln!(f, "      ITINERARY      ")?;
        writeln!(f, "=====================")?;
        writeln!(f)?;
        writeln!(f, "Departure from origin: {}", self.departure)?;
        for step in &self.steps {
            writeln!(f, "{step}")?;
        }
        writeln!(f, "Arrival at destination: {}", self.arrival)?;
        let (h, m, s) = split_hms(self.travel_time_secs);
        write!(f, "Trip duration: {h} hours, {m} minutes, {s} seconds")
    }
}

/// How a query ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Reached(Itinerary),
    /// No path within the schedule window.
    Unreachable,
    /// Zero travel time.
    AlreadyThere,
}

impl RouteOutcome {
    pub fn itinerary(&self) -> Option<&Itinerary> {
        match self {
            RouteOutcome::Reached(itinerary) => Some(itinerary),
            _ => None,
        }
    }

    fn narrate(&self) -> String {
        match self {
            RouteOutcome::Reached(itinerary) => itinerary.to_string(),
            RouteOutcome::Unreachable => {
                "The destination cannot be reached from the origin during this time window"
                    .to_string()
            }
            RouteOutcome::AlreadyThere => {
                "You are already at the requested destination".to_string()
            }
        }
    }
}

/// Everything a route query produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteReport {
    pub outcome: RouteOutcome,
    /// Seconds from the window start to arrival; [`INFINITY`](crate::graph::INFINITY)
    /// when unreachable.
    pub travel_time_secs: u32,
    pub path: Vec<VertexId>,
    /// Human-readable itinerary, when requested.
    pub narration: Option<String>,
    /// Wall-clock time spent in the shortest path search.
    pub query_duration_micros: i64,
}

impl RouteReport {
    pub(super) fn new(
        outcome: RouteOutcome,
        travel_time_secs: u32,
        path: Vec<VertexId>,
        verbose: bool,
        query_duration_micros: i64,
    ) -> Self {
        let narration = verbose.then(|| outcome.narrate());
        Self {
            outcome,
            travel_time_secs,
            path,
            narration,
            query_duration_micros,
        }
    }

    pub fn is_reachable(&self) -> bool {
        !matches!(self.outcome, RouteOutcome::Unreachable)
    }
}
