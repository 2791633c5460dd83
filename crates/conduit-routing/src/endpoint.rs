//! Audio endpoints.

use serde::{Deserialize, Serialize};

/// Process-unique endpoint identifier.
pub type EndpointId = u32;

/// Whether an endpoint produces or consumes audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Produces audio (capture device, decoder, network receiver).
    Source,
    /// Consumes audio (playback device, encoder, network sender).
    Sink,
}

impl Direction {
    /// The opposite direction.
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Source => Direction::Sink,
            Direction::Sink => Direction::Source,
        }
    }
}

/// A named, directional point in the audio graph.
///
/// Endpoints are owned by whichever I/O backend registers them; the routing
/// table only stores copies inside its rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioEndpoint {
    /// Endpoint identifier.
    pub id: EndpointId,
    /// Source or sink.
    pub direction: Direction,
    /// Display name.
    pub name: String,
    /// Backing device, if any (e.g. `"hw:0"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl AudioEndpoint {
    /// A source endpoint.
    pub fn source(id: EndpointId, name: impl Into<String>) -> Self {
        Self {
            id,
            direction: Direction::Source,
            name: name.into(),
            device: None,
        }
    }

    /// A sink endpoint.
    pub fn sink(id: EndpointId, name: impl Into<String>) -> Self {
        Self {
            id,
            direction: Direction::Sink,
            name: name.into(),
            device: None,
        }
    }

    /// Attach a backing device string.
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }
}
