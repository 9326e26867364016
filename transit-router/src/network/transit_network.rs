//! Time-expanded transit network.
//!
//! Every stop event of the schedule becomes one vertex. Arcs connect events
//! that can follow each other in time:
//!
//! - **ride**: the next stop of the same trip;
//! - **wait**: the next event at the same station;
//! - **transfer**: the first event at a neighbouring station that can be
//!   caught after walking there.
//!
//! Each event sits at its arrival time and arc weights are the seconds
//! elapsed between the two events, so a shortest path is a fastest journey.

use std::collections::HashMap;

use chrono::Duration;
use tracing::{debug, info};

use super::config::NetworkConfig;
use super::error::{ArcClass, NetworkError};
use crate::domain::{ScheduleTime, StationId, TripId};
use crate::graph::{Graph, INFINITY, VertexId};
use crate::schedule::{Schedule, StopEvent, StopEventId};

/// What a vertex stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKey {
    /// A stop event of the schedule
    Scheduled(StopEventId),
    /// The synthetic query origin
    Origin,
    /// The synthetic query destination
    Destination,
}

/// Vertices created for an attached origin/destination pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Attachment {
    pub(super) origin: VertexId,
    pub(super) destination: VertexId,
}

/// Arc counts per class, recorded by [`TransitNetwork::build`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub vertices: usize,
    pub ride_arcs: usize,
    pub wait_arcs: usize,
    pub transfer_arcs: usize,
}

impl BuildStats {
    pub fn total_arcs(&self) -> usize {
        self.ride_arcs + self.wait_arcs + self.transfer_arcs
    }
}

/// Graph of stop events plus the mapping between vertices and events.
#[derive(Debug, Clone)]
pub struct TransitNetwork {
    pub(super) graph: Graph,
    /// Vertex id -> event.
    pub(super) vertex_events: Vec<EventKey>,
    /// Event -> vertex id.
    pub(super) event_vertices: HashMap<EventKey, VertexId>,
    pub(super) config: NetworkConfig,
    pub(super) attachment: Option<Attachment>,
    /// Sources of the destination access arcs, in insertion order.
    pub(super) destination_sources: Vec<VertexId>,
    pub(super) origin_arc_count: usize,
    pub(super) destination_arc_count: usize,
    stats: BuildStats,
}

impl TransitNetwork {
    /// Build the time-expanded graph of `schedule`.
    ///
    /// Fails if any arc would get a negative weight, which means the
    /// schedule's times contradict its stop ordering. No partially built
    /// network is ever returned.
    pub fn build(schedule: &Schedule, config: NetworkConfig) -> Result<Self, NetworkError> {
        let total = schedule.stop_event_count();
        let mut network = Self {
            graph: Graph::new(total),
            vertex_events: Vec::with_capacity(total + 2),
            event_vertices: HashMap::with_capacity(total + 2),
            config,
            attachment: None,
            destination_sources: Vec::new(),
            origin_arc_count: 0,
            destination_arc_count: 0,
            stats: BuildStats::default(),
        };

        network.add_ride_arcs(schedule)?;
        if network.vertex_events.len() != total {
            return Err(NetworkError::OrphanStopEvents {
                mapped: network.vertex_events.len(),
                total,
            });
        }
        network.add_wait_arcs(schedule)?;
        network.add_transfer_arcs(schedule)?;
        network.stats.vertices = network.graph.num_vertices();

        info!(
            vertices = network.stats.vertices,
            ride_arcs = network.stats.ride_arcs,
            wait_arcs = network.stats.wait_arcs,
            transfer_arcs = network.stats.transfer_arcs,
            "built transit network"
        );

        Ok(network)
    }

    /// Map each trip's events to fresh vertices, linking consecutive stops.
    fn add_ride_arcs(&mut self, schedule: &Schedule) -> Result<(), NetworkError> {
        for trip in schedule.trips() {
            let mut previous: Option<(VertexId, StopEventId, ScheduleTime)> = None;
            for &id in trip.events() {
                let time = stop_event(schedule, id)?.event_time();
                let vertex = self.map_event(EventKey::Scheduled(id));

                if let Some((prev_vertex, prev_id, prev_time)) = previous {
                    let weight = arc_weight(
                        ArcClass::Ride,
                        EventKey::Scheduled(prev_id),
                        EventKey::Scheduled(id),
                        time.seconds_since(prev_time),
                    )?;
                    self.graph.add_arc(prev_vertex, vertex, weight)?;
                    self.stats.ride_arcs += 1;
                }
                previous = Some((vertex, id, time));
            }
        }
        Ok(())
    }

    /// Link each station's events in time order.
    fn add_wait_arcs(&mut self, schedule: &Schedule) -> Result<(), NetworkError> {
        for station in schedule.stations() {
            for pair in station.events().windows(2) {
                let (from, to) = (EventKey::Scheduled(pair[0]), EventKey::Scheduled(pair[1]));
                let seconds = stop_event(schedule, pair[1])?
                    .event_time()
                    .seconds_since(stop_event(schedule, pair[0])?.event_time());
                let weight = arc_weight(ArcClass::Wait, from, to, seconds)?;
                let (i, j) = (self.require_vertex(from)?, self.require_vertex(to)?);
                self.graph.add_arc(i, j, weight)?;
                self.stats.wait_arcs += 1;
            }
        }
        Ok(())
    }

    /// For every event at a transfer's origin station, link to the first
    /// event at the target station that is reachable after the walk. The walk
    /// starts when the event departs.
    fn add_transfer_arcs(&mut self, schedule: &Schedule) -> Result<(), NetworkError> {
        for transfer in schedule.transfers() {
            let from_station = schedule
                .station(transfer.from)
                .ok_or(NetworkError::UnknownStation(transfer.from))?;
            let to_station = schedule
                .station(transfer.to)
                .ok_or(NetworkError::UnknownStation(transfer.to))?;
            let walk = Duration::seconds(i64::from(transfer.walk_seconds));

            for &id in from_station.events() {
                let event = stop_event(schedule, id)?;
                let Some(ready) = event.departure.checked_add(walk) else {
                    continue;
                };
                let Some(target) = schedule.first_event_at_or_after(to_station, ready) else {
                    continue;
                };

                let (from, to) = (EventKey::Scheduled(id), EventKey::Scheduled(target));
                let seconds = stop_event(schedule, target)?
                    .event_time()
                    .seconds_since(event.event_time());
                let weight = arc_weight(ArcClass::Transfer, from, to, seconds)?;
                let (i, j) = (self.require_vertex(from)?, self.require_vertex(to)?);
                self.graph.add_arc(i, j, weight)?;
                self.stats.transfer_arcs += 1;
            }
        }
        debug!(
            transfers = schedule.transfers().len(),
            transfer_arcs = self.stats.transfer_arcs,
            "added transfer arcs"
        );
        Ok(())
    }

    /// Assign the next vertex id to `key`, or return the one it already has.
    pub(super) fn map_event(&mut self, key: EventKey) -> VertexId {
        if let Some(&vertex) = self.event_vertices.get(&key) {
            return vertex;
        }
        let vertex = self.vertex_events.len();
        self.vertex_events.push(key);
        self.event_vertices.insert(key, vertex);
        vertex
    }

    pub(super) fn require_vertex(&self, key: EventKey) -> Result<VertexId, NetworkError> {
        self.vertex_of(key).ok_or(NetworkError::UnmappedEvent(key))
    }

    /// Vertex standing for `key`, if mapped.
    pub fn vertex_of(&self, key: EventKey) -> Option<VertexId> {
        self.event_vertices.get(&key).copied()
    }

    /// Event standing behind `vertex`, if any.
    pub fn event_of(&self, vertex: VertexId) -> Option<EventKey> {
        self.vertex_events.get(vertex).copied()
    }

    /// Station of the event behind `vertex`; the reserved markers for the
    /// synthetic origin and destination.
    pub fn station_of(&self, schedule: &Schedule, vertex: VertexId) -> Result<StationId, NetworkError> {
        match self.event_of(vertex).ok_or(NetworkError::UnmappedVertex(vertex))? {
            EventKey::Origin => Ok(StationId::ORIGIN),
            EventKey::Destination => Ok(StationId::DESTINATION),
            EventKey::Scheduled(id) => Ok(stop_event(schedule, id)?.station),
        }
    }

    /// Trip of the event behind `vertex`; `None` for synthetic vertices.
    pub fn trip_of<'s>(
        &self,
        schedule: &'s Schedule,
        vertex: VertexId,
    ) -> Result<Option<&'s TripId>, NetworkError> {
        match self.event_of(vertex).ok_or(NetworkError::UnmappedVertex(vertex))? {
            EventKey::Origin | EventKey::Destination => Ok(None),
            EventKey::Scheduled(id) => Ok(Some(&stop_event(schedule, id)?.trip)),
        }
    }

    /// Number of mapped events, synthetic ones included.
    pub fn num_mapped(&self) -> usize {
        self.event_vertices.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.graph.num_vertices()
    }

    pub fn num_arcs(&self) -> usize {
        self.graph.num_arcs()
    }

    /// Read access to the underlying graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn build_stats(&self) -> BuildStats {
        self.stats
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    /// Arcs from the origin added by the current attachment.
    pub fn origin_arc_count(&self) -> usize {
        self.origin_arc_count
    }

    /// Arcs into the destination added by the current attachment.
    pub fn destination_arc_count(&self) -> usize {
        self.destination_arc_count
    }

    pub fn max_walk_km(&self) -> f64 {
        self.config.max_walk_km()
    }
}

pub(super) fn stop_event(schedule: &Schedule, id: StopEventId) -> Result<&StopEvent, NetworkError> {
    schedule
        .stop_event(id)
        .ok_or(NetworkError::UnknownStopEvent(id))
}

/// Convert an elapsed time into an arc weight.
pub(super) fn arc_weight(
    class: ArcClass,
    from: EventKey,
    to: EventKey,
    seconds: i64,
) -> Result<u32, NetworkError> {
    match u32::try_from(seconds) {
        Ok(weight) if weight != INFINITY => Ok(weight),
        _ => Err(NetworkError::InconsistentSchedule {
            class,
            from,
            to,
            seconds,
        }),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{Coordinates, LineId};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    /// (first departure minute after 08:00, [(station, minutes since previous stop)])
    type TripPlan = (u32, Vec<(u32, u32)>);

    fn schedule_from(trips: &[TripPlan], transfers: &[(u32, u32, u32)]) -> Schedule {
        let date = NaiveDate::from_ymd_opt(2017, 2, 9).unwrap();
        let at = |minutes: u32| {
            ScheduleTime::from_hms(date, 8 + minutes / 60, minutes % 60, 0).unwrap()
        };
        let mut s = Schedule::new(date, at(0), at(4 * 60 - 1)).unwrap();
        s.add_line(LineId(1), "1", "").unwrap();
        for id in 1..=4u32 {
            let coords = Coordinates::new(46.8 + f64::from(id) * 0.002, -71.2).unwrap();
            s.add_station(StationId::new(id), format!("S{id}"), coords).unwrap();
        }
        for (n, (first, stops)) in trips.iter().enumerate() {
            let trip = TripId::new(format!("T{n:02}"));
            s.add_trip(trip.clone(), LineId(1), "").unwrap();
            let mut minutes = *first;
            for (seq, (station, gap)) in stops.iter().enumerate() {
                minutes += gap;
                s.add_stop_event(StopEvent {
                    station: StationId::new(*station),
                    trip: trip.clone(),
                    sequence: seq as u32 + 1,
                    arrival: at(minutes),
                    departure: at(minutes),
                })
                .unwrap();
            }
        }
        for &(from, to, secs) in transfers {
            s.add_transfer(StationId::new(from), StationId::new(to), secs).unwrap();
        }
        s
    }

    fn trip_plan() -> impl Strategy<Value = TripPlan> {
        (0u32..120, prop::collection::vec((1u32..=4, 0u32..15), 1..6))
    }

    proptest! {
        #[test]
        fn ordered_schedules_always_build(
            trips in prop::collection::vec(trip_plan(), 0..8),
            transfers in prop::collection::vec((1u32..=4, 1u32..=4, 0u32..900), 0..6),
        ) {
            let schedule = schedule_from(&trips, &transfers);
            let net = TransitNetwork::build(&schedule, NetworkConfig::default()).unwrap();

            prop_assert_eq!(net.num_vertices(), schedule.stop_event_count());
            prop_assert_eq!(net.num_arcs(), net.build_stats().total_arcs());
            for v in 0..net.num_vertices() {
                let key = net.event_of(v).unwrap();
                prop_assert_eq!(net.vertex_of(key), Some(v));
            }
        }

        #[test]
        fn detach_undoes_attach(
            trips in prop::collection::vec(trip_plan(), 0..8),
            lat in 46.795f64..46.815,
        ) {
            let schedule = schedule_from(&trips, &[]);
            let mut net = TransitNetwork::build(&schedule, NetworkConfig::default()).unwrap();
            let graph = net.graph().clone();
            let point = Coordinates::new(lat, -71.2).unwrap();

            net.attach(&schedule, point, point).unwrap();
            let report = net.route(&schedule, true).unwrap();
            prop_assert!(report.narration.is_some());
            net.detach().unwrap();

            prop_assert_eq!(net.graph(), &graph);
            prop_assert_eq!(net.num_mapped(), schedule.stop_event_count());
        }
    }
}
