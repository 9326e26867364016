//! Time-expanded transit network and single-pair routing.
//!
//! [`TransitNetwork::build`] turns a [`Schedule`](crate::schedule::Schedule)
//! into a graph of stop events. A query then:
//!
//! 1. attaches an origin and a destination point with walking access arcs,
//! 2. routes between them, optionally narrating the itinerary,
//! 3. detaches, leaving the network ready for the next query.

mod access;
mod config;
mod error;
mod itinerary;
mod route;
mod transit_network;

pub use config::{ConfigError, NetworkConfig};
pub use error::{ArcClass, NetworkError};
pub use itinerary::{Itinerary, RouteOutcome, RouteReport, StationRef, Step};
pub use transit_network::{BuildStats, EventKey, TransitNetwork};
