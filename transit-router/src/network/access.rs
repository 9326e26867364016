//! Walking access arcs between a query's end points and the network.

use tracing::{debug, warn};

use super::error::{ArcClass, NetworkError};
use super::transit_network::{Attachment, EventKey, TransitNetwork, arc_weight, stop_event};
use crate::domain::Coordinates;
use crate::schedule::Schedule;

impl TransitNetwork {
    /// Connect `origin` and `destination` to the network.
    ///
    /// The origin reaches, for every station within walking range, the first
    /// event that can be caught after walking there from the start of the
    /// schedule window. Every event at a station within walking range of the
    /// destination reaches the destination after the walk, counted from the
    /// event's arrival.
    ///
    /// Only one pair can be attached at a time. If attaching fails half way,
    /// the network is restored to its state before the call.
    pub fn attach(
        &mut self,
        schedule: &Schedule,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<(), NetworkError> {
        if self.attachment.is_some() {
            return Err(NetworkError::AlreadyAttached);
        }

        let base = self.graph.num_vertices();
        self.graph.resize(base + 2);
        let attachment = Attachment {
            origin: self.map_event(EventKey::Origin),
            destination: self.map_event(EventKey::Destination),
        };
        self.attachment = Some(attachment);

        let result = self
            .add_origin_arcs(schedule, &origin, attachment)
            .and_then(|()| self.add_destination_arcs(schedule, &destination, attachment));

        if let Err(err) = result {
            if let Err(rollback) = self.detach() {
                warn!(error = %rollback, "failed to roll back partial attach");
            }
            return Err(err);
        }

        debug!(
            %origin,
            %destination,
            origin_arcs = self.origin_arc_count,
            destination_arcs = self.destination_arc_count,
            "attached query end points"
        );
        Ok(())
    }

    fn add_origin_arcs(
        &mut self,
        schedule: &Schedule,
        origin: &Coordinates,
        attachment: Attachment,
    ) -> Result<(), NetworkError> {
        let start = schedule.start();
        for (station, km) in schedule.stations_within(origin, self.config.max_walk_km()) {
            let walk = self
                .config
                .walk_time(km)
                .ok_or(NetworkError::WalkTime(station.id))?;
            let Some(ready) = start.checked_add(walk) else {
                continue;
            };
            let Some(first) = schedule.first_event_at_or_after(station, ready) else {
                continue;
            };

            let to = EventKey::Scheduled(first);
            let seconds = stop_event(schedule, first)?.event_time().seconds_since(start);
            let weight = arc_weight(ArcClass::OriginAccess, EventKey::Origin, to, seconds)?;
            let target = self.require_vertex(to)?;
            self.graph.add_arc(attachment.origin, target, weight)?;
            self.origin_arc_count += 1;
        }
        Ok(())
    }

    fn add_destination_arcs(
        &mut self,
        schedule: &Schedule,
        destination: &Coordinates,
        attachment: Attachment,
    ) -> Result<(), NetworkError> {
        for (station, km) in schedule.stations_within(destination, self.config.max_walk_km()) {
            let seconds = self
                .config
                .walk_time(km)
                .ok_or(NetworkError::WalkTime(station.id))?
                .num_seconds();
            // Event times are arrivals, so the walk starts as the vehicle stops.
            for &id in station.events() {
                let from = EventKey::Scheduled(id);
                let weight =
                    arc_weight(ArcClass::DestinationAccess, from, EventKey::Destination, seconds)?;
                let source = self.require_vertex(from)?;
                self.graph.add_arc(source, attachment.destination, weight)?;
                self.destination_sources.push(source);
                self.destination_arc_count += 1;
            }
        }
        Ok(())
    }

    /// Remove the access arcs and synthetic vertices added by
    /// [`attach`](Self::attach), leaving the network as it was after build.
    pub fn detach(&mut self) -> Result<(), NetworkError> {
        let attachment = self.attachment.ok_or(NetworkError::NotAttached)?;

        let sources = std::mem::take(&mut self.destination_sources);
        for &source in sources.iter().rev() {
            self.graph.remove_arc(source, attachment.destination)?;
        }

        // The origin's arcs go with its adjacency list.
        self.graph.resize(attachment.origin);
        self.vertex_events.truncate(attachment.origin);
        self.event_vertices.remove(&EventKey::Origin);
        self.event_vertices.remove(&EventKey::Destination);

        self.origin_arc_count = 0;
        self.destination_arc_count = 0;
        self.attachment = None;

        debug!(vertices = self.graph.num_vertices(), "detached query end points");
        Ok(())
    }
}
