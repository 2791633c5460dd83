//! Route rules.

use crate::{AudioEndpoint, Direction, EndpointId, RoutingError};
use conduit_chain::ChainSpec;
use serde::{Deserialize, Serialize};

/// Route identifier, assigned by the table. Zero means "not yet assigned".
pub type RouteId = u32;

/// How a matched route hands its buffer to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    /// The input buffer is passed through by reference.
    Direct,
    /// The sink receives an independent copy it may mutate or mix into.
    Mixed,
    /// The route's chain processes the buffer; Direct when there is no chain.
    Processed,
}

/// Priority given by [`RouteRule::new`].
pub const DEFAULT_PRIORITY: u8 = 128;

/// A configured mapping from one source endpoint to one sink endpoint.
///
/// Routes dispatch in ascending `(priority, id)` order.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRule {
    /// Assigned by [`RoutingTable::add_route`](crate::RoutingTable::add_route).
    pub id: RouteId,
    /// Where audio comes from.
    pub source: AudioEndpoint,
    /// Where audio goes.
    pub sink: AudioEndpoint,
    /// Dispatch mode.
    pub route_type: RouteType,
    /// Lower values dispatch first.
    pub priority: u8,
    /// Disabled routes are skipped by `route_buffer`.
    pub enabled: bool,
    /// Effect chain description for Processed routes.
    pub chain: Option<ChainSpec>,
}

impl RouteRule {
    /// An enabled rule with default priority and no chain.
    pub fn new(source: AudioEndpoint, sink: AudioEndpoint, route_type: RouteType) -> Self {
        Self {
            id: 0,
            source,
            sink,
            route_type,
            priority: DEFAULT_PRIORITY,
            enabled: true,
            chain: None,
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Attach a chain description.
    pub fn with_chain(mut self, chain: ChainSpec) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Mark the rule disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// The `(source, sink)` endpoint id pair identifying this route.
    pub fn endpoints(&self) -> (EndpointId, EndpointId) {
        (self.source.id, self.sink.id)
    }

    /// Checks endpoint names and directions.
    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.source.name.is_empty() || self.sink.name.is_empty() {
            return Err(RoutingError::InvalidArgument("endpoint name is empty"));
        }
        if self.source.direction != Direction::Source {
            return Err(RoutingError::InvalidArgument("route source is not a source endpoint"));
        }
        if self.sink.direction != Direction::Sink {
            return Err(RoutingError::InvalidArgument("route sink is not a sink endpoint"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_directions() {
        let ok = RouteRule::new(
            AudioEndpoint::source(1, "mic"),
            AudioEndpoint::sink(2, "speaker"),
            RouteType::Direct,
        );
        ok.validate().unwrap();

        let reversed = RouteRule::new(
            AudioEndpoint::sink(2, "speaker"),
            AudioEndpoint::source(1, "mic"),
            RouteType::Direct,
        );
        assert!(matches!(
            reversed.validate(),
            Err(RoutingError::InvalidArgument(_))
        ));

        let unnamed = RouteRule::new(
            AudioEndpoint::source(1, ""),
            AudioEndpoint::sink(2, "speaker"),
            RouteType::Mixed,
        );
        assert!(unnamed.validate().is_err());
    }
}
