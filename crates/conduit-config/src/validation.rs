//! Framework configuration validation.
//!
//! [`validate_config`] checks a whole [`FrameworkConfig`] and reports every
//! problem it finds, not just the first.
//!
//! # Example
//!
//! ```rust
//! use conduit_config::{FrameworkConfig, RouteConfig, ValidationError, validate_config};
//!
//! let mut config = FrameworkConfig::default();
//! config.routes.push(RouteConfig::direct(1, 2));
//!
//! // neither endpoint is declared
//! let Err(ValidationError::Multiple(errors)) = validate_config(&config) else {
//!     panic!("expected two errors");
//! };
//! assert_eq!(errors.len(), 2);
//! ```

use crate::FrameworkConfig;
use conduit_routing::{Direction, EndpointId};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A `[routing]` value is out of range.
    #[error("routing: {0}")]
    Routing(String),

    /// Two endpoints share an id.
    #[error("endpoint id {0} declared more than once")]
    DuplicateEndpoint(EndpointId),

    /// An endpoint has an empty name.
    #[error("endpoint {0} has an empty name")]
    EmptyEndpointName(EndpointId),

    /// A route references an undeclared endpoint.
    #[error("route {route}: endpoint {endpoint} is not declared")]
    UnknownEndpoint {
        /// Index of the route in the file.
        route: usize,
        /// Missing endpoint id.
        endpoint: EndpointId,
    },

    /// A route's source is not a source, or its sink is not a sink.
    #[error("route {route}: endpoint {endpoint} is not a {expected:?}")]
    WrongDirection {
        /// Index of the route in the file.
        route: usize,
        /// Offending endpoint id.
        endpoint: EndpointId,
        /// Direction the route needs.
        expected: Direction,
    },

    /// Two routes join the same endpoints.
    #[error("route {route}: duplicate route from {source_id} to {sink_id}")]
    DuplicateRoute {
        /// Index of the second route in the file.
        route: usize,
        /// Source endpoint id.
        source_id: EndpointId,
        /// Sink endpoint id.
        sink_id: EndpointId,
    },

    /// A route's priority does not fit 0-255.
    #[error("route {route}: priority {priority} out of range [0, 255]")]
    PriorityOutOfRange {
        /// Index of the route in the file.
        route: usize,
        /// Configured priority.
        priority: u32,
    },

    /// More routes than `max_routes`.
    #[error("{count} routes exceed max_routes = {max}")]
    TooManyRoutes {
        /// Routes declared.
        count: usize,
        /// Configured limit.
        max: usize,
    },

    /// A route's chain has a bad format, gain or effect parameter.
    #[error("route {route}: chain: {reason}")]
    InvalidChain {
        /// Index of the route in the file.
        route: usize,
        /// What is wrong.
        reason: String,
    },

    /// A module entry has an empty path.
    #[error("module {0}: path is empty")]
    EmptyModulePath(usize),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check every part of `config`.
pub fn validate_config(config: &FrameworkConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if let Err(e) = config.routing.validate() {
        errors.push(ValidationError::Routing(e.to_string()));
    }

    let mut endpoints = BTreeMap::new();
    for endpoint in &config.endpoints {
        if endpoints.insert(endpoint.id, endpoint.direction).is_some() {
            errors.push(ValidationError::DuplicateEndpoint(endpoint.id));
        }
        if endpoint.name.is_empty() {
            errors.push(ValidationError::EmptyEndpointName(endpoint.id));
        }
    }

    if config.routes.len() > config.routing.max_routes {
        errors.push(ValidationError::TooManyRoutes {
            count: config.routes.len(),
            max: config.routing.max_routes,
        });
    }

    let mut pairs = BTreeSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        for (endpoint, expected) in [
            (route.source, Direction::Source),
            (route.sink, Direction::Sink),
        ] {
            match endpoints.get(&endpoint) {
                None => errors.push(ValidationError::UnknownEndpoint {
                    route: index,
                    endpoint,
                }),
                Some(&direction) if direction != expected => {
                    errors.push(ValidationError::WrongDirection {
                        route: index,
                        endpoint,
                        expected,
                    });
                }
                Some(_) => {}
            }
        }
        if !pairs.insert((route.source, route.sink)) {
            errors.push(ValidationError::DuplicateRoute {
                route: index,
                source_id: route.source,
                sink_id: route.sink,
            });
        }
        if let Some(priority) = route.priority
            && priority > u32::from(u8::MAX)
        {
            errors.push(ValidationError::PriorityOutOfRange {
                route: index,
                priority,
            });
        }
        if let Some(chain) = &route.chain
            && let Err(e) = chain.validate()
        {
            errors.push(ValidationError::InvalidChain {
                route: index,
                reason: e.to_string(),
            });
        }
    }

    for (index, module) in config.modules.iter().enumerate() {
        if module.path.trim().is_empty() {
            errors.push(ValidationError::EmptyModulePath(index));
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
