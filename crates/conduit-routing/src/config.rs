//! Routing table configuration.

use crate::RoutingError;
use conduit_core::SampleFormat;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Configuration consumed by [`RoutingTable::new`](crate::RoutingTable::new).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Maximum number of live routes.
    pub max_routes: usize,
    /// Priority given to routes created without one (0-255).
    pub default_priority: u32,
    /// Create Direct routes automatically when endpoints are registered.
    pub enable_auto_routing: bool,
    /// Largest period, in frames, that Mixed and Processed routes can carry.
    pub processing_buffer_size: usize,
    /// Wire format of routed buffers; sizes the scratch buffer.
    #[serde(with = "sample_format_name")]
    pub sample_format: SampleFormat,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_routes: 64,
            default_priority: 128,
            enable_auto_routing: false,
            processing_buffer_size: 4096,
            sample_format: SampleFormat::F32,
        }
    }
}

impl RoutingConfig {
    /// Checks every field's range.
    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.max_routes == 0 {
            return Err(RoutingError::InvalidConfig("max_routes must be at least 1"));
        }
        if self.default_priority > u32::from(u8::MAX) {
            return Err(RoutingError::InvalidConfig("default_priority must be at most 255"));
        }
        if self.processing_buffer_size == 0 {
            return Err(RoutingError::InvalidConfig(
                "processing_buffer_size must be at least 1",
            ));
        }
        Ok(())
    }

    /// `default_priority` as a route priority. Valid once [`validate`](Self::validate) passed.
    pub fn route_priority(&self) -> u8 {
        u8::try_from(self.default_priority).unwrap_or(u8::MAX)
    }
}

mod sample_format_name {
    use super::*;

    pub fn serialize<S: Serializer>(format: &SampleFormat, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(format.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SampleFormat, D::Error> {
        let name = String::deserialize(d)?;
        SampleFormat::from_name(&name).ok_or_else(|| {
            serde::de::Error::unknown_variant(&name, &["i16", "i32", "f32"])
        })
    }
}
