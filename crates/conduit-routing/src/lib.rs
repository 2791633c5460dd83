//! Conduit Routing - maps audio sources to sinks.
//!
//! A [`RoutingTable`] holds up to `max_routes` [`RouteRule`]s, each joining
//! one source [`AudioEndpoint`] to one sink. For every period of audio a
//! source produces, [`RoutingTable::route_buffer`] visits that source's
//! enabled routes in `(priority, id)` order and hands each sink a buffer:
//!
//! | Route type  | Sink receives                                   |
//! |-------------|-------------------------------------------------|
//! | `Direct`    | the input itself (zero copy)                    |
//! | `Mixed`     | an independent copy it may mutate               |
//! | `Processed` | the output of the route's [`ProcessingChain`]   |
//!
//! Routes can be added, updated and removed from any thread while another
//! thread routes audio. The audio thread reads a published snapshot of the
//! route list and never blocks on a writer; see [`table`] for the details.
//!
//! [`ProcessingChain`]: conduit_chain::ProcessingChain

mod config;
mod endpoint;
mod error;
mod rule;
pub mod table;

pub use config::RoutingConfig;
pub use endpoint::{AudioEndpoint, Direction, EndpointId};
pub use error::RoutingError;
pub use rule::{DEFAULT_PRIORITY, RouteId, RouteRule, RouteType};
pub use table::{ChangeCallback, RouteChange, RoutedBuffer, RoutingTable};
