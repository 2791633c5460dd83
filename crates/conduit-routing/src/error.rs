//! Error types for routing operations.

use crate::{EndpointId, RouteId};
use conduit_chain::ChainError;
use conduit_core::SampleFormat;
use thiserror::Error;

/// Errors returned by [`RoutingTable`](crate::RoutingTable) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// A routing configuration value is out of range.
    #[error("invalid routing config: {0}")]
    InvalidConfig(&'static str),

    /// A rule or buffer argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A route between this pair of endpoints already exists.
    #[error("route from endpoint {source_id} to endpoint {sink_id} already exists")]
    AlreadyExists {
        /// Source endpoint id.
        source_id: EndpointId,
        /// Sink endpoint id.
        sink_id: EndpointId,
    },

    /// No route with this id.
    #[error("route {0} not found")]
    NotFound(RouteId),

    /// The table already holds `max_routes` routes.
    #[error("route table full ({0} routes)")]
    CapacityExceeded(usize),

    /// An endpoint with this id is already registered.
    #[error("endpoint {0} already registered")]
    EndpointExists(EndpointId),

    /// No endpoint with this id is registered.
    #[error("endpoint {0} not registered")]
    EndpointNotFound(EndpointId),

    /// The buffer does not fit the pre-allocated route scratch space.
    #[error("buffer of {requested} samples exceeds route scratch capacity of {capacity}")]
    BufferTooLarge {
        /// Samples needed.
        requested: usize,
        /// Samples available.
        capacity: usize,
    },

    /// The buffer's sample format differs from the table's configured format.
    #[error("buffer format {actual:?} does not match routing format {expected:?}")]
    FormatMismatch {
        /// Configured format.
        expected: SampleFormat,
        /// Format supplied.
        actual: SampleFormat,
    },

    /// A Processed route's chain expects a different channel count than the
    /// period carries.
    #[error("route chain has {chain} channel(s), period has {period}")]
    ChannelMismatch {
        /// Channels the chain was built for.
        chain: usize,
        /// Samples per frame in the period.
        period: usize,
    },

    /// A route's chain could not be built or run.
    #[error("route chain: {0}")]
    Chain(#[from] ChainError),
}

impl RoutingError {
    /// POSIX-style negative error code for this error.
    pub fn errno(&self) -> i32 {
        match self {
            RoutingError::InvalidConfig(_)
            | RoutingError::InvalidArgument(_)
            | RoutingError::FormatMismatch { .. }
            | RoutingError::ChannelMismatch { .. } => -libc::EINVAL,
            RoutingError::AlreadyExists { .. } | RoutingError::EndpointExists(_) => -libc::EEXIST,
            RoutingError::NotFound(_) | RoutingError::EndpointNotFound(_) => -libc::ENOENT,
            RoutingError::CapacityExceeded(_) => -libc::ENOSPC,
            RoutingError::BufferTooLarge { .. } => -libc::ENOMEM,
            RoutingError::Chain(e) => e.errno(),
        }
    }
}
