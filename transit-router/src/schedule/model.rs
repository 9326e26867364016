//! In-memory schedule model.
//!
//! Stop events are stored once, in an arena owned by [`Schedule`]. Trips and
//! stations refer to them by [`StopEventId`], so every relation between
//! events is an index relation.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::NaiveDate;
use tracing::debug;

use super::ScheduleError;
use crate::domain::{Coordinates, LineId, ScheduleTime, StationId, TripId};

/// Index of a stop event in the schedule's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopEventId(pub usize);

/// A scheduled visit of one trip to one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopEvent {
    pub station: StationId,
    pub trip: TripId,
    /// Position within the trip (GTFS `stop_sequence`).
    pub sequence: u32,
    pub arrival: ScheduleTime,
    pub departure: ScheduleTime,
}

impl StopEvent {
    /// The instant this event occupies in the time-expanded graph.
    ///
    /// Every arc measures time between arrivals, so the weights along any
    /// path add up to the elapsed time between its ends, and a rider getting
    /// off never pays for the vehicle's dwell.
    pub fn event_time(&self) -> ScheduleTime {
        self.arrival
    }
}

/// A line (route) grouping trips under one public number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub id: LineId,
    /// Number shown to riders, e.g. "800".
    pub number: String,
    pub description: String,
}

/// A physical stop with the events that happen there.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub coordinates: Coordinates,
    /// Sorted by event time; equal times keep insertion order.
    events: Vec<StopEventId>,
}

impl Station {
    pub fn events(&self) -> &[StopEventId] {
        &self.events
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.id, self.name)
    }
}

/// One scheduled vehicle run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub id: TripId,
    pub line: LineId,
    pub headsign: String,
    /// Sorted by sequence number.
    events: Vec<StopEventId>,
}

impl Trip {
    pub fn events(&self) -> &[StopEventId] {
        &self.events
    }
}

/// A walking connection between two stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub from: StationId,
    pub to: StationId,
    /// Fixed walking duration in seconds.
    pub walk_seconds: u32,
}

/// Read-only schedule snapshot for one service date and time window.
#[derive(Debug, Clone)]
pub struct Schedule {
    date: NaiveDate,
    start: ScheduleTime,
    end: ScheduleTime,
    lines: BTreeMap<LineId, Line>,
    stations: BTreeMap<StationId, Station>,
    trips: BTreeMap<TripId, Trip>,
    transfers: Vec<Transfer>,
    events: Vec<StopEvent>,
}

impl Schedule {
    /// Create an empty schedule covering `[start, end]` on `date`.
    pub fn new(
        date: NaiveDate,
        start: ScheduleTime,
        end: ScheduleTime,
    ) -> Result<Self, ScheduleError> {
        if end < start {
            return Err(ScheduleError::InvalidWindow);
        }
        Ok(Self {
            date,
            start,
            end,
            lines: BTreeMap::new(),
            stations: BTreeMap::new(),
            trips: BTreeMap::new(),
            transfers: Vec::new(),
            events: Vec::new(),
        })
    }

    pub fn add_line(
        &mut self,
        id: LineId,
        number: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), ScheduleError> {
        match self.lines.entry(id) {
            Entry::Occupied(_) => Err(ScheduleError::DuplicateLine(id)),
            Entry::Vacant(slot) => {
                slot.insert(Line {
                    id,
                    number: number.into(),
                    description: description.into(),
                });
                Ok(())
            }
        }
    }

    pub fn add_station(
        &mut self,
        id: StationId,
        name: impl Into<String>,
        coordinates: Coordinates,
    ) -> Result<(), ScheduleError> {
        if id.is_reserved() {
            return Err(ScheduleError::ReservedStation(id));
        }
        match self.stations.entry(id) {
            Entry::Occupied(_) => Err(ScheduleError::DuplicateStation(id)),
            Entry::Vacant(slot) => {
                slot.insert(Station {
                    id,
                    name: name.into(),
                    coordinates,
                    events: Vec::new(),
                });
                Ok(())
            }
        }
    }

    pub fn add_trip(
        &mut self,
        id: TripId,
        line: LineId,
        headsign: impl Into<String>,
    ) -> Result<(), ScheduleError> {
        if !self.lines.contains_key(&line) {
            return Err(ScheduleError::UnknownLine(line));
        }
        match self.trips.entry(id) {
            Entry::Occupied(slot) => Err(ScheduleError::DuplicateTrip(slot.key().clone())),
            Entry::Vacant(slot) => {
                let id = slot.key().clone();
                slot.insert(Trip {
                    id,
                    line,
                    headsign: headsign.into(),
                    events: Vec::new(),
                });
                Ok(())
            }
        }
    }

    /// Add a stop event to the arena and index it by trip and station.
    ///
    /// Events whose stop does not overlap the schedule window (departing
    /// before its start or arriving after its end) are skipped and `Ok(None)`
    /// is returned.
    pub fn add_stop_event(&mut self, event: StopEvent) -> Result<Option<StopEventId>, ScheduleError> {
        if event.departure < event.arrival {
            return Err(ScheduleError::DepartureBeforeArrival {
                trip: event.trip,
                sequence: event.sequence,
            });
        }
        if !self.stations.contains_key(&event.station) {
            return Err(ScheduleError::UnknownStation(event.station));
        }
        let Some(trip) = self.trips.get_mut(&event.trip) else {
            return Err(ScheduleError::UnknownTrip(event.trip));
        };

        if event.departure < self.start || event.arrival > self.end {
            return Ok(None);
        }

        let events = &self.events;
        let trip_pos = trip
            .events
            .partition_point(|id| events[id.0].sequence < event.sequence);
        if trip
            .events
            .get(trip_pos)
            .is_some_and(|id| events[id.0].sequence == event.sequence)
        {
            return Err(ScheduleError::DuplicateSequence {
                trip: event.trip,
                sequence: event.sequence,
            });
        }

        let id = StopEventId(self.events.len());
        trip.events.insert(trip_pos, id);

        // Station presence was checked above.
        if let Some(station) = self.stations.get_mut(&event.station) {
            let time = event.event_time();
            let station_pos = station
                .events
                .partition_point(|e| events[e.0].event_time() <= time);
            station.events.insert(station_pos, id);
        }

        self.events.push(event);
        Ok(Some(id))
    }

    /// Register a walking transfer. Transfers from a station to itself are
    /// ignored, waiting in place is already part of the network.
    pub fn add_transfer(
        &mut self,
        from: StationId,
        to: StationId,
        walk_seconds: u32,
    ) -> Result<(), ScheduleError> {
        for station in [from, to] {
            if !self.stations.contains_key(&station) {
                return Err(ScheduleError::UnknownStation(station));
            }
        }
        if from != to {
            self.transfers.push(Transfer {
                from,
                to,
                walk_seconds,
            });
        }
        Ok(())
    }

    /// Drop stations and trips that ended up without any stop event, and
    /// the transfers that touched those stations.
    pub fn prune(&mut self) {
        let stations_before = self.stations.len();
        let trips_before = self.trips.len();

        self.stations.retain(|_, s| !s.events.is_empty());
        self.trips.retain(|_, t| !t.events.is_empty());
        let stations = &self.stations;
        self.transfers
            .retain(|t| stations.contains_key(&t.from) && stations.contains_key(&t.to));

        debug!(
            stations_removed = stations_before - self.stations.len(),
            trips_removed = trips_before - self.trips.len(),
            "pruned schedule"
        );
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Start of the schedule window; walking offsets are measured from here.
    pub fn start(&self) -> ScheduleTime {
        self.start
    }

    pub fn end(&self) -> ScheduleTime {
        self.end
    }

    /// Trips in id order.
    pub fn trips(&self) -> impl Iterator<Item = &Trip> {
        self.trips.values()
    }

    /// Stations in id order.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn trip(&self, id: &TripId) -> Option<&Trip> {
        self.trips.get(id)
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(&id)
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(&id)
    }

    pub fn stop_event(&self, id: StopEventId) -> Option<&StopEvent> {
        self.events.get(id.0)
    }

    pub fn stop_event_count(&self) -> usize {
        self.events.len()
    }

    pub fn num_stations(&self) -> usize {
        self.stations.len()
    }

    pub fn num_trips(&self) -> usize {
        self.trips.len()
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Stations no further than `max_km` from `point`, with their distance.
    pub fn stations_within(
        &self,
        point: &Coordinates,
        max_km: f64,
    ) -> impl Iterator<Item = (&Station, f64)> + '_ {
        let point = *point;
        self.stations.values().filter_map(move |station| {
            let km = station.coordinates.distance_km(&point);
            (km <= max_km).then_some((station, km))
        })
    }

    /// First event at `station` whose event time is at or after `not_before`.
    pub fn first_event_at_or_after(
        &self,
        station: &Station,
        not_before: ScheduleTime,
    ) -> Option<StopEventId> {
        let pos = station
            .events
            .partition_point(|id| self.events[id.0].event_time() < not_before);
        station.events.get(pos).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 2, 9).unwrap()
    }

    fn time(s: &str) -> ScheduleTime {
        ScheduleTime::parse_hhmmss(s, date()).unwrap()
    }

    fn coords(lat: f64, lon: f64) -> Coordinates {
        Coordinates::new(lat, lon).unwrap()
    }

    fn station(id: u32) -> StationId {
        StationId::new(id)
    }

    fn event(trip: &str, st: u32, seq: u32, at: &str) -> StopEvent {
        StopEvent {
            station: station(st),
            trip: TripId::new(trip),
            sequence: seq,
            arrival: time(at),
            departure: time(at),
        }
    }

    fn base() -> Schedule {
        let mut s = Schedule::new(date(), time("08:00:00"), time("12:00:00")).unwrap();
        s.add_line(LineId(1), "800", "Express").unwrap();
        s.add_station(station(1), "Alpha", coords(46.80, -71.20)).unwrap();
        s.add_station(station(2), "Bravo", coords(46.81, -71.20)).unwrap();
        s.add_trip(TripId::new("T1"), LineId(1), "Bravo").unwrap();
        s.add_trip(TripId::new("T2"), LineId(1), "Bravo").unwrap();
        s
    }

    #[test]
    fn rejects_inverted_window() {
        let err = Schedule::new(date(), time("12:00:00"), time("08:00:00")).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidWindow));
    }

    #[test]
    fn rejects_reserved_and_duplicate_stations() {
        let mut s = base();
        assert!(matches!(
            s.add_station(StationId::ORIGIN, "x", coords(0.0, 0.0)),
            Err(ScheduleError::ReservedStation(_))
        ));
        assert!(matches!(
            s.add_station(station(1), "x", coords(0.0, 0.0)),
            Err(ScheduleError::DuplicateStation(_))
        ));
    }

    #[test]
    fn trip_requires_known_line() {
        let mut s = base();
        assert!(matches!(
            s.add_trip(TripId::new("T9"), LineId(42), ""),
            Err(ScheduleError::UnknownLine(LineId(42)))
        ));
        assert!(matches!(
            s.add_trip(TripId::new("T1"), LineId(1), ""),
            Err(ScheduleError::DuplicateTrip(_))
        ));
    }

    #[test]
    fn stop_event_requires_known_references() {
        let mut s = base();
        assert!(matches!(
            s.add_stop_event(event("T1", 9, 1, "09:00:00")),
            Err(ScheduleError::UnknownStation(_))
        ));
        assert!(matches!(
            s.add_stop_event(event("T9", 1, 1, "09:00:00")),
            Err(ScheduleError::UnknownTrip(_))
        ));
    }

    #[test]
    fn trip_events_sorted_by_sequence() {
        let mut s = base();
        let third = s.add_stop_event(event("T1", 2, 3, "09:20:00")).unwrap().unwrap();
        let first = s.add_stop_event(event("T1", 1, 1, "09:00:00")).unwrap().unwrap();
        let second = s.add_stop_event(event("T1", 2, 2, "09:10:00")).unwrap().unwrap();

        let trip = s.trip(&TripId::new("T1")).unwrap();
        assert_eq!(trip.events(), &[first, second, third]);
        assert_eq!(s.stop_event_count(), 3);
    }

    #[test]
    fn duplicate_sequence_rejected() {
        let mut s = base();
        s.add_stop_event(event("T1", 1, 1, "09:00:00")).unwrap();
        assert!(matches!(
            s.add_stop_event(event("T1", 2, 1, "09:05:00")),
            Err(ScheduleError::DuplicateSequence { sequence: 1, .. })
        ));
    }

    #[test]
    fn departure_before_arrival_rejected() {
        let mut s = base();
        let mut e = event("T1", 1, 1, "09:00:00");
        e.departure = time("08:59:00");
        assert!(matches!(
            s.add_stop_event(e),
            Err(ScheduleError::DepartureBeforeArrival { .. })
        ));
    }

    #[test]
    fn station_events_sorted_by_time() {
        let mut s = base();
        let late = s.add_stop_event(event("T1", 1, 1, "10:00:00")).unwrap().unwrap();
        let early = s.add_stop_event(event("T2", 1, 1, "09:00:00")).unwrap().unwrap();

        let alpha = s.station(station(1)).unwrap();
        assert_eq!(alpha.events(), &[early, late]);
    }

    #[test]
    fn events_outside_window_skipped() {
        let mut s = base();
        assert_eq!(s.add_stop_event(event("T1", 1, 1, "07:59:59")).unwrap(), None);
        assert_eq!(s.add_stop_event(event("T1", 1, 2, "12:00:01")).unwrap(), None);
        assert!(s.add_stop_event(event("T1", 1, 3, "12:00:00")).unwrap().is_some());
        assert_eq!(s.stop_event_count(), 1);
    }

    #[test]
    fn events_overlapping_window_edges_kept() {
        let mut s = base();
        // Arrives before the start but is still boardable at it.
        let mut early = event("T1", 1, 1, "07:55:00");
        early.departure = time("08:05:00");
        assert!(s.add_stop_event(early).unwrap().is_some());

        // Arrives before the end, leaves after it.
        let mut late = event("T1", 2, 2, "11:58:00");
        late.departure = time("12:10:00");
        assert!(s.add_stop_event(late).unwrap().is_some());

        assert_eq!(s.stop_event_count(), 2);
    }

    #[test]
    fn station_events_sorted_by_arrival() {
        let mut s = base();
        // Long dwell: arrives first, departs last.
        let mut dwell = event("T1", 1, 1, "09:00:00");
        dwell.departure = time("09:30:00");
        let dwell = s.add_stop_event(dwell).unwrap().unwrap();
        let quick = s.add_stop_event(event("T2", 1, 1, "09:10:00")).unwrap().unwrap();

        let alpha = s.station(station(1)).unwrap().clone();
        assert_eq!(alpha.events(), &[dwell, quick]);
        assert_eq!(s.first_event_at_or_after(&alpha, time("09:05:00")), Some(quick));
    }

    #[test]
    fn first_event_at_or_after() {
        let mut s = base();
        let a = s.add_stop_event(event("T1", 1, 1, "09:00:00")).unwrap().unwrap();
        let b = s.add_stop_event(event("T2", 1, 1, "09:30:00")).unwrap().unwrap();
        let alpha = s.station(station(1)).unwrap().clone();

        assert_eq!(s.first_event_at_or_after(&alpha, time("08:00:00")), Some(a));
        assert_eq!(s.first_event_at_or_after(&alpha, time("09:00:00")), Some(a));
        assert_eq!(s.first_event_at_or_after(&alpha, time("09:00:01")), Some(b));
        assert_eq!(s.first_event_at_or_after(&alpha, time("09:30:01")), None);
    }

    #[test]
    fn transfers_validate_and_skip_self_loops() {
        let mut s = base();
        s.add_transfer(station(1), station(2), 120).unwrap();
        s.add_transfer(station(1), station(1), 0).unwrap();
        assert!(matches!(
            s.add_transfer(station(1), station(7), 60),
            Err(ScheduleError::UnknownStation(_))
        ));
        assert_eq!(
            s.transfers(),
            &[Transfer {
                from: station(1),
                to: station(2),
                walk_seconds: 120
            }]
        );
    }

    #[test]
    fn prune_removes_empty_entities() {
        let mut s = base();
        s.add_stop_event(event("T1", 1, 1, "09:00:00")).unwrap();
        s.add_transfer(station(1), station(2), 120).unwrap();

        s.prune();

        assert_eq!(s.num_stations(), 1);
        assert_eq!(s.num_trips(), 1);
        assert!(s.station(station(2)).is_none());
        assert!(s.trip(&TripId::new("T2")).is_none());
        assert!(s.transfers().is_empty());
    }

    #[test]
    fn stations_within_radius() {
        let s = base();
        let near_alpha = coords(46.8001, -71.2001);
        let found: Vec<_> = s
            .stations_within(&near_alpha, 0.5)
            .map(|(st, _)| st.id)
            .collect();
        assert_eq!(found, vec![station(1)]);

        let both: Vec<_> = s.stations_within(&near_alpha, 5.0).collect();
        assert_eq!(both.len(), 2);
    }

    #[test]
    fn station_display() {
        let s = base();
        assert_eq!(s.station(station(1)).unwrap().to_string(), "1 - Alpha");
    }
}
