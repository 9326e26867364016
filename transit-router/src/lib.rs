//! Minimum-time itineraries over a public-transit schedule.
//!
//! A [`schedule::Schedule`] for one service date is turned into a
//! time-expanded graph whose vertices are stop events
//! ([`network::TransitNetwork`]). Each query attaches an origin and a
//! destination point with walking access arcs, runs Dijkstra over the
//! [`graph::Graph`] and narrates the resulting itinerary.

pub mod domain;
pub mod graph;
pub mod network;
pub mod schedule;
