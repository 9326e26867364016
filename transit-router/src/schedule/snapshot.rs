//! JSON schedule snapshots.
//!
//! A snapshot is a pre-filtered extract of a GTFS feed for one service
//! date: lines, stations, trips running that day, their stop times and the
//! registered transfers. Times are service-day "HH:MM:SS" strings.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use super::{Schedule, ScheduleError, StopEvent};
use crate::domain::{Coordinates, LineId, ScheduleTime, StationId, TripId};

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSnapshot {
    /// Service date, "YYYY-MM-DD".
    pub date: String,
    /// Window start, e.g. "08:30:00".
    pub start: String,
    /// Window end; may exceed "24:00:00".
    pub end: String,
    #[serde(default)]
    pub lines: Vec<LineRecord>,
    #[serde(default)]
    pub stations: Vec<StationRecord>,
    #[serde(default)]
    pub trips: Vec<TripRecord>,
    #[serde(default)]
    pub stop_times: Vec<StopTimeRecord>,
    #[serde(default)]
    pub transfers: Vec<TransferRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineRecord {
    pub id: LineId,
    pub number: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationRecord {
    pub id: StationId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripRecord {
    pub id: TripId,
    pub line: LineId,
    #[serde(default)]
    pub headsign: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopTimeRecord {
    pub trip: TripId,
    pub station: StationId,
    pub sequence: u32,
    pub arrival: String,
    pub departure: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferRecord {
    pub from: StationId,
    pub to: StationId,
    /// GTFS `min_transfer_time`, seconds.
    pub min_transfer_time: u32,
}

impl Schedule {
    /// Assemble a schedule from a snapshot, keeping only stop events inside
    /// the window and pruning what is left empty.
    pub fn from_snapshot(snapshot: ScheduleSnapshot) -> Result<Self, ScheduleError> {
        let date = NaiveDate::parse_from_str(&snapshot.date, "%Y-%m-%d")
            .map_err(|_| ScheduleError::InvalidDate(snapshot.date.clone()))?;
        let start = ScheduleTime::parse_hhmmss(&snapshot.start, date)?;
        let end = ScheduleTime::parse_hhmmss(&snapshot.end, date)?;

        let mut schedule = Schedule::new(date, start, end)?;

        for line in snapshot.lines {
            schedule.add_line(line.id, line.number, line.description)?;
        }
        for station in snapshot.stations {
            let coordinates = Coordinates::new(station.latitude, station.longitude)?;
            schedule.add_station(station.id, station.name, coordinates)?;
        }
        for trip in snapshot.trips {
            schedule.add_trip(trip.id, trip.line, trip.headsign)?;
        }

        let total = snapshot.stop_times.len();
        let mut kept = 0usize;
        for record in snapshot.stop_times {
            let event = StopEvent {
                arrival: ScheduleTime::parse_hhmmss(&record.arrival, date)?,
                departure: ScheduleTime::parse_hhmmss(&record.departure, date)?,
                station: record.station,
                trip: record.trip,
                sequence: record.sequence,
            };
            if schedule.add_stop_event(event)?.is_some() {
                kept += 1;
            }
        }

        for transfer in snapshot.transfers {
            schedule.add_transfer(transfer.from, transfer.to, transfer.min_transfer_time)?;
        }

        schedule.prune();

        info!(
            %date,
            window_start = %start,
            window_end = %end,
            stop_times = total,
            stop_events = kept,
            stations = schedule.num_stations(),
            trips = schedule.num_trips(),
            transfers = schedule.transfers().len(),
            "loaded schedule snapshot"
        );

        Ok(schedule)
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ScheduleError> {
        let snapshot: ScheduleSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// Read a snapshot from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ScheduleError> {
        let reader = BufReader::new(File::open(path)?);
        let snapshot: ScheduleSnapshot = serde_json::from_reader(reader)?;
        Self::from_snapshot(snapshot)
    }
}
