//! Shortest path queries and itinerary reconstruction.

use std::time::Instant;

use tracing::{debug, info};

use super::error::NetworkError;
use super::itinerary::{Itinerary, RouteOutcome, RouteReport, StationRef, Step};
use super::transit_network::{EventKey, TransitNetwork, stop_event};
use crate::domain::StationId;
use crate::graph::{INFINITY, VertexId};
use crate::schedule::{Schedule, StopEvent, StopEventId};

impl TransitNetwork {
    /// Find the fastest journey between the attached origin and destination.
    ///
    /// An unreachable destination and a zero travel time are outcomes, not
    /// errors. With `verbose`, the report carries a narrated itinerary.
    pub fn route(&self, schedule: &Schedule, verbose: bool) -> Result<RouteReport, NetworkError> {
        let attachment = self.attachment.ok_or(NetworkError::NotAttached)?;

        let started = Instant::now();
        let shortest = self
            .graph
            .shortest_path(attachment.origin, attachment.destination)?;
        let query_duration_micros =
            i64::try_from(started.elapsed().as_micros()).unwrap_or(i64::MAX);

        debug!(
            distance = shortest.distance,
            path_len = shortest.path.len(),
            micros = query_duration_micros,
            "shortest path search finished"
        );

        let outcome = match shortest.distance {
            INFINITY => RouteOutcome::Unreachable,
            0 => RouteOutcome::AlreadyThere,
            distance => {
                RouteOutcome::Reached(self.itinerary(schedule, &shortest.path, distance)?)
            }
        };

        if let RouteOutcome::Reached(itinerary) = &outcome {
            info!(
                travel_time_secs = itinerary.travel_time_secs,
                rides = itinerary.trips().count(),
                "route found"
            );
        }

        Ok(RouteReport::new(
            outcome,
            shortest.distance,
            shortest.path,
            verbose,
            query_duration_micros,
        ))
    }

    /// Turn a vertex path from origin to destination into rider steps.
    ///
    /// Consecutive events at one station are waits and produce no step.
    /// Consecutive stops of one trip are merged into a single ride. Any other
    /// change of station is a walk, even between two events of the same trip.
    pub(super) fn itinerary(
        &self,
        schedule: &Schedule,
        path: &[VertexId],
        travel_time_secs: u32,
    ) -> Result<Itinerary, NetworkError> {
        let (first, last) = match path {
            [first, .., last] if path.len() >= 3 => (*first, *last),
            _ => return Err(NetworkError::MalformedPath("fewer than three vertices")),
        };
        if self.station_of(schedule, first)? != StationId::ORIGIN {
            return Err(NetworkError::MalformedPath("does not start at the origin"));
        }
        if self.station_of(schedule, last)? != StationId::DESTINATION {
            return Err(NetworkError::MalformedPath("does not end at the destination"));
        }

        let events = path[1..path.len() - 1]
            .iter()
            .map(|&vertex| match self.event_of(vertex) {
                Some(EventKey::Scheduled(id)) => Ok((id, stop_event(schedule, id)?)),
                Some(_) => Err(NetworkError::MalformedPath("synthetic vertex inside the path")),
                None => Err(NetworkError::UnmappedVertex(vertex)),
            })
            .collect::<Result<Vec<(StopEventId, &StopEvent)>, _>>()?;

        let (Some((_, boarding)), Some((_, alighting))) = (events.first(), events.last()) else {
            return Err(NetworkError::MalformedPath("fewer than three vertices"));
        };

        let mut steps = vec![Step::WalkToStation(station_ref(schedule, boarding.station)?)];
        let mut ride: Option<(&StopEvent, &StopEvent)> = None;

        for pair in events.windows(2) {
            let ((from_id, from), (to_id, to)) = (pair[0], pair[1]);
            if from.station == to.station {
                // Waiting in place.
                flush_ride(schedule, &mut ride, &mut steps)?;
            } else if is_next_stop(schedule, from, from_id, to_id)? {
                match ride.filter(|(board, _)| board.trip == from.trip) {
                    Some((board, _)) => ride = Some((board, to)),
                    None => {
                        flush_ride(schedule, &mut ride, &mut steps)?;
                        ride = Some((from, to));
                    }
                }
            } else {
                flush_ride(schedule, &mut ride, &mut steps)?;
                steps.push(Step::Walk {
                    from: station_ref(schedule, from.station)?,
                    to: station_ref(schedule, to.station)?,
                });
            }
        }
        flush_ride(schedule, &mut ride, &mut steps)?;
        steps.push(Step::WalkToDestination(station_ref(schedule, alighting.station)?));

        let departure = schedule.start();
        let arrival = departure
            .checked_add(chrono::Duration::seconds(i64::from(travel_time_secs)))
            .ok_or(NetworkError::MalformedPath("arrival time out of range"))?;

        Ok(Itinerary {
            departure,
            steps,
            arrival,
            travel_time_secs,
        })
    }
}

fn station_ref(schedule: &Schedule, id: StationId) -> Result<StationRef, NetworkError> {
    let station = schedule
        .station(id)
        .ok_or(NetworkError::UnknownStation(id))?;
    Ok(StationRef {
        id,
        name: station.name.clone(),
    })
}

/// Whether `to` is the stop right after `from` on `from`'s trip.
fn is_next_stop(
    schedule: &Schedule,
    from: &StopEvent,
    from_id: StopEventId,
    to_id: StopEventId,
) -> Result<bool, NetworkError> {
    let trip = schedule
        .trip(&from.trip)
        .ok_or_else(|| NetworkError::UnknownTrip(from.trip.clone()))?;
    Ok(trip
        .events()
        .windows(2)
        .any(|pair| pair[0] == from_id && pair[1] == to_id))
}

/// Close the ride in progress, if any, into a step.
fn flush_ride(
    schedule: &Schedule,
    ride: &mut Option<(&StopEvent, &StopEvent)>,
    steps: &mut Vec<Step>,
) -> Result<(), NetworkError> {
    let Some((board, alight)) = ride.take() else {
        return Ok(());
    };
    let trip = schedule
        .trip(&board.trip)
        .ok_or_else(|| NetworkError::UnknownTrip(board.trip.clone()))?;
    let line = schedule
        .line(trip.line)
        .ok_or(NetworkError::UnknownLine(trip.line))?;

    steps.push(Step::Ride {
        line: line.number.clone(),
        trip: trip.id.clone(),
        headsign: trip.headsign.clone(),
        from: station_ref(schedule, board.station)?,
        departure: board.departure,
        to: station_ref(schedule, alight.station)?,
        arrival: alight.arrival,
    });
    Ok(())
}
