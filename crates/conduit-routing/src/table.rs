//! The routing table.
//!
//! # Thread Safety
//!
//! - **Route list**: an immutable `Vec<Arc<RouteEntry>>` published through
//!   `ArcSwap`. `route_buffer` loads the current snapshot wait-free; writers
//!   copy it, modify the copy and store it back. A replaced route (and its
//!   chain) is dropped once the last snapshot referencing it is released.
//! - **Writers**: serialized on a `Mutex` that `route_buffer` never takes.
//! - **Chains**: each Processed route's chain sits behind its own `Mutex`,
//!   locked only while the chain runs.
//! - **Scratch**: one pre-sized buffer behind a `Mutex`, held for the
//!   duration of a `route_buffer` call.

use crate::{
    AudioEndpoint, EndpointId, RouteId, RouteRule, RouteType, RoutingConfig, RoutingError,
};
use arc_swap::ArcSwap;
use conduit_chain::{ChainSpec, ProcessingChain, builtin_registry};
use conduit_core::{MAX_CHANNELS, SampleFormat, SampleVec, Samples, SamplesMut};
use conduit_registry::EffectRegistry;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// What happened to a route, as reported to the change callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteChange {
    /// The route was added.
    Added,
    /// The route was removed.
    Removed,
    /// The route's fields or chain were replaced.
    Updated,
}

/// Change-notification callback.
pub type ChangeCallback = dyn Fn(&RouteRule, RouteChange) + Send + Sync;

/// Per-route buffer handed to the sink.
#[derive(Debug)]
pub enum RoutedBuffer<'a> {
    /// The caller's input, unchanged (Direct routes).
    Shared(Samples<'a>),
    /// A buffer owned by this dispatch that the sink may mutate
    /// (Mixed copies and Processed chain output).
    Owned(SamplesMut<'a>),
}

impl RoutedBuffer<'_> {
    /// Read-only view of the routed samples.
    pub fn samples(&self) -> Samples<'_> {
        match self {
            RoutedBuffer::Shared(s) => *s,
            RoutedBuffer::Owned(s) => s.as_samples(),
        }
    }

    /// Returns true for a zero-copy pass-through.
    pub fn is_shared(&self) -> bool {
        matches!(self, RoutedBuffer::Shared(_))
    }
}

/// A published route: the rule plus its instantiated chain.
struct RouteEntry {
    rule: RouteRule,
    chain: Option<Arc<Mutex<ProcessingChain>>>,
}

struct WriterState {
    next_id: RouteId,
    endpoints: BTreeMap<EndpointId, AudioEndpoint>,
}

/// Maps source endpoints to sink endpoints through ordered route rules.
///
/// # Example
///
/// ```rust
/// use conduit_core::Samples;
/// use conduit_routing::{AudioEndpoint, RouteRule, RouteType, RoutingConfig, RoutingTable};
///
/// let table = RoutingTable::new(RoutingConfig::default()).unwrap();
/// table
///     .add_route(RouteRule::new(
///         AudioEndpoint::source(1, "capture"),
///         AudioEndpoint::sink(2, "playback"),
///         RouteType::Direct,
///     ))
///     .unwrap();
///
/// let period = [0.0f32; 256];
/// let mut delivered = Vec::new();
/// let count = table
///     .route_buffer(1, Samples::F32(&period), 128, |rule, _buffer| delivered.push(rule.sink.id))
///     .unwrap();
/// assert_eq!(count, 1);
/// assert_eq!(delivered, [2]);
/// ```
pub struct RoutingTable {
    config: RoutingConfig,
    registry: Arc<EffectRegistry>,
    routes: ArcSwap<Vec<Arc<RouteEntry>>>,
    writer: Mutex<WriterState>,
    callback: Mutex<Option<Arc<ChangeCallback>>>,
    scratch: Mutex<SampleVec>,
}

impl RoutingTable {
    /// Create an empty table whose chains use the built-in effects.
    pub fn new(config: RoutingConfig) -> Result<Self, RoutingError> {
        Self::with_registry(config, builtin_registry())
    }

    /// Create an empty table whose chains are built through `registry`.
    pub fn with_registry(
        config: RoutingConfig,
        registry: Arc<EffectRegistry>,
    ) -> Result<Self, RoutingError> {
        config.validate()?;
        let scratch_len = config.processing_buffer_size.saturating_mul(MAX_CHANNELS);
        tracing::debug!(
            max_routes = config.max_routes,
            scratch_len,
            format = config.sample_format.name(),
            "routing: table created"
        );
        Ok(Self {
            config,
            registry,
            routes: ArcSwap::from_pointee(Vec::new()),
            writer: Mutex::new(WriterState {
                next_id: 1,
                endpoints: BTreeMap::new(),
            }),
            callback: Mutex::new(None),
            scratch: Mutex::new(SampleVec::with_capacity(config.sample_format, scratch_len)),
        })
    }

    /// The configuration the table was created with.
    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    fn build_chain(
        &self,
        spec: Option<&ChainSpec>,
    ) -> Result<Option<Arc<Mutex<ProcessingChain>>>, RoutingError> {
        spec.map(|spec| {
            let chain = spec.build_with(
                Arc::clone(&self.registry),
                self.config.processing_buffer_size,
            )?;
            Ok(Arc::new(Mutex::new(chain)))
        })
        .transpose()
    }

    fn publish(&self, mut routes: Vec<Arc<RouteEntry>>) {
        routes.sort_by_key(|e| (e.rule.priority, e.rule.id));
        self.routes.store(Arc::new(routes));
    }

    fn notify(&self, rule: &RouteRule, change: RouteChange) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback(rule, change);
        }
    }

    /// Add a route, deep-copying its chain. Returns the assigned id.
    pub fn add_route(&self, rule: RouteRule) -> Result<RouteId, RoutingError> {
        rule.validate()?;
        let added = {
            let mut writer = self.writer.lock();
            let current = self.routes.load_full();
            let (source_id, sink_id) = rule.endpoints();
            if current.iter().any(|e| e.rule.endpoints() == (source_id, sink_id)) {
                tracing::warn!(source_id, sink_id, "routing: duplicate route rejected");
                return Err(RoutingError::AlreadyExists { source_id, sink_id });
            }
            if current.len() >= self.config.max_routes {
                tracing::warn!(max = self.config.max_routes, "routing: table full");
                return Err(RoutingError::CapacityExceeded(self.config.max_routes));
            }
            let chain = self.build_chain(rule.chain.as_ref())?;

            let mut rule = rule;
            rule.id = writer.next_id;
            writer.next_id += 1;

            let mut next = current.as_ref().clone();
            next.push(Arc::new(RouteEntry {
                rule: rule.clone(),
                chain,
            }));
            self.publish(next);
            rule
        };
        tracing::debug!(
            id = added.id,
            source = added.source.id,
            sink = added.sink.id,
            route_type = ?added.route_type,
            "routing: route added"
        );
        self.notify(&added, RouteChange::Added);
        Ok(added.id)
    }

    /// Add a route at the configured default priority.
    pub fn add_route_default_priority(
        &self,
        source: AudioEndpoint,
        sink: AudioEndpoint,
        route_type: RouteType,
    ) -> Result<RouteId, RoutingError> {
        self.add_route(
            RouteRule::new(source, sink, route_type).with_priority(self.config.route_priority()),
        )
    }

    /// Remove a route and drop its chain. Returns the removed rule.
    pub fn remove_route(&self, id: RouteId) -> Result<RouteRule, RoutingError> {
        let removed = {
            let _writer = self.writer.lock();
            let current = self.routes.load_full();
            let pos = current
                .iter()
                .position(|e| e.rule.id == id)
                .ok_or(RoutingError::NotFound(id))?;
            let mut next = current.as_ref().clone();
            let entry = next.remove(pos);
            self.publish(next);
            entry.rule.clone()
        };
        tracing::debug!(id, "routing: route removed");
        self.notify(&removed, RouteChange::Removed);
        Ok(removed)
    }

    /// Replace the route whose id is `rule.id`.
    ///
    /// The chain is rebuilt only if its description changed, so an unchanged
    /// chain keeps its effect state. `None` removes the chain.
    pub fn update_route(&self, rule: RouteRule) -> Result<(), RoutingError> {
        rule.validate()?;
        {
            let _writer = self.writer.lock();
            let current = self.routes.load_full();
            let pos = current
                .iter()
                .position(|e| e.rule.id == rule.id)
                .ok_or(RoutingError::NotFound(rule.id))?;
            let (source_id, sink_id) = rule.endpoints();
            if current
                .iter()
                .any(|e| e.rule.id != rule.id && e.rule.endpoints() == (source_id, sink_id))
            {
                return Err(RoutingError::AlreadyExists { source_id, sink_id });
            }
            let existing = &current[pos];
            let chain = if existing.rule.chain == rule.chain {
                existing.chain.clone()
            } else {
                self.build_chain(rule.chain.as_ref())?
            };
            let mut next = current.as_ref().clone();
            next[pos] = Arc::new(RouteEntry {
                rule: rule.clone(),
                chain,
            });
            self.publish(next);
        }
        tracing::debug!(id = rule.id, "routing: route updated");
        self.notify(&rule, RouteChange::Updated);
        Ok(())
    }

    /// Enable or disable a route without touching its chain.
    pub fn set_route_enabled(&self, id: RouteId, enabled: bool) -> Result<(), RoutingError> {
        let mut rule = self.route(id).ok_or(RoutingError::NotFound(id))?;
        rule.enabled = enabled;
        self.update_route(rule)
    }

    /// Remove every route. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let removed = {
            let _writer = self.writer.lock();
            let current = self.routes.load_full();
            self.routes.store(Arc::new(Vec::new()));
            current
        };
        for entry in removed.iter() {
            self.notify(&entry.rule, RouteChange::Removed);
        }
        removed.len()
    }

    /// The route between `source_id` and `sink_id`, if any.
    pub fn find_route(&self, source_id: EndpointId, sink_id: EndpointId) -> Option<RouteRule> {
        self.routes
            .load()
            .iter()
            .find(|e| e.rule.endpoints() == (source_id, sink_id))
            .map(|e| e.rule.clone())
    }

    /// The route with this id, if any.
    pub fn route(&self, id: RouteId) -> Option<RouteRule> {
        self.routes
            .load()
            .iter()
            .find(|e| e.rule.id == id)
            .map(|e| e.rule.clone())
    }

    /// Copy of every route in dispatch order.
    pub fn routes(&self) -> Vec<RouteRule> {
        self.routes.load().iter().map(|e| e.rule.clone()).collect()
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.load().len()
    }

    /// Returns true if the table holds no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.load().is_empty()
    }

    /// Register the change callback, replacing any previous one.
    ///
    /// The callback runs synchronously on the mutating thread after the
    /// change is visible to `route_buffer`.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(&RouteRule, RouteChange) + Send + Sync + 'static,
    {
        *self.callback.lock() = Some(Arc::new(callback));
    }

    /// Remove the change callback.
    pub fn clear_callback(&self) {
        *self.callback.lock() = None;
    }

    /// Produce a buffer for every enabled route whose source is `source_id`
    /// and hand it to `dispatch`, in route order.
    ///
    /// `input` holds exactly `frame_count` interleaved frames, so its length
    /// must be a multiple of `frame_count` with at most [`MAX_CHANNELS`]
    /// samples per frame. Direct routes (and
    /// Processed routes without a chain) receive `input` itself; Mixed
    /// routes receive a copy and Processed routes receive their chain's
    /// output, both in the table's scratch buffer. A route whose buffer
    /// cannot be produced is skipped with a warning without affecting the
    /// others. Returns the number of routes dispatched.
    pub fn route_buffer<F>(
        &self,
        source_id: EndpointId,
        input: Samples<'_>,
        frame_count: usize,
        mut dispatch: F,
    ) -> Result<usize, RoutingError>
    where
        F: FnMut(&RouteRule, RoutedBuffer<'_>),
    {
        if frame_count == 0 || input.is_empty() {
            return Err(RoutingError::InvalidArgument("empty buffer"));
        }
        if input.len() % frame_count != 0 {
            return Err(RoutingError::InvalidArgument(
                "buffer length is not a whole number of frames",
            ));
        }
        let channels = input.len() / frame_count;
        if channels > MAX_CHANNELS {
            return Err(RoutingError::InvalidArgument(
                "buffer holds more than frame_count frames",
            ));
        }
        let routes = self.routes.load();
        let mut scratch = self.scratch.lock();
        let mut dispatched = 0;
        for entry in routes
            .iter()
            .filter(|e| e.rule.enabled && e.rule.source.id == source_id)
        {
            let routed =
                self.dispatch_route(entry, input, frame_count, channels, &mut scratch, &mut dispatch);
            match routed {
                Ok(()) => dispatched += 1,
                Err(error) => {
                    tracing::warn!(route = entry.rule.id, %error, "routing: route skipped");
                }
            }
        }
        Ok(dispatched)
    }

    fn dispatch_route<F>(
        &self,
        entry: &RouteEntry,
        input: Samples<'_>,
        frame_count: usize,
        channels: usize,
        scratch: &mut SampleVec,
        dispatch: &mut F,
    ) -> Result<(), RoutingError>
    where
        F: FnMut(&RouteRule, RoutedBuffer<'_>),
    {
        match (entry.rule.route_type, &entry.chain) {
            (RouteType::Direct, _) | (RouteType::Processed, None) => {
                dispatch(&entry.rule, RoutedBuffer::Shared(input));
            }
            (RouteType::Mixed, _) => {
                check_scratch(scratch, input.format(), input.len())?;
                scratch.copy_from(input);
                dispatch(&entry.rule, RoutedBuffer::Owned(scratch.as_samples_mut()));
            }
            (RouteType::Processed, Some(chain)) => {
                let mut chain = chain.lock();
                if chain.channels() != channels {
                    return Err(RoutingError::ChannelMismatch {
                        chain: chain.channels(),
                        period: channels,
                    });
                }
                let len = input.len();
                check_scratch(scratch, input.format(), len)?;
                chain.apply(input, scratch.prepare(input.format(), len), frame_count)?;
                drop(chain);
                dispatch(&entry.rule, RoutedBuffer::Owned(scratch.as_samples_mut()));
            }
        }
        Ok(())
    }

    /// Register an endpoint.
    ///
    /// With auto-routing enabled, a Direct route is created between the new
    /// endpoint and every registered endpoint of the opposite direction at
    /// the default priority. Existing pairs are skipped; creation stops when
    /// the table is full. Returns the ids of the routes created.
    pub fn register_endpoint(&self, endpoint: AudioEndpoint) -> Result<Vec<RouteId>, RoutingError> {
        if endpoint.name.is_empty() {
            return Err(RoutingError::InvalidArgument("endpoint name is empty"));
        }
        let peers: Vec<AudioEndpoint> = {
            let mut writer = self.writer.lock();
            if writer.endpoints.contains_key(&endpoint.id) {
                return Err(RoutingError::EndpointExists(endpoint.id));
            }
            writer.endpoints.insert(endpoint.id, endpoint.clone());
            if !self.config.enable_auto_routing {
                return Ok(Vec::new());
            }
            writer
                .endpoints
                .values()
                .filter(|e| e.direction == endpoint.direction.opposite())
                .cloned()
                .collect()
        };
        tracing::debug!(id = endpoint.id, peers = peers.len(), "routing: endpoint registered");

        let mut created = Vec::new();
        for peer in peers {
            let (source, sink) = match endpoint.direction {
                crate::Direction::Source => (endpoint.clone(), peer),
                crate::Direction::Sink => (peer, endpoint.clone()),
            };
            match self.add_route_default_priority(source, sink, RouteType::Direct) {
                Ok(id) => created.push(id),
                Err(RoutingError::AlreadyExists { .. }) => {}
                Err(RoutingError::CapacityExceeded(max)) => {
                    tracing::warn!(max, "routing: auto-routing stopped, table full");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }

    /// Unregister an endpoint and remove every route touching it.
    /// Returns the number of routes removed.
    pub fn unregister_endpoint(&self, id: EndpointId) -> Result<usize, RoutingError> {
        let removed: Vec<Arc<RouteEntry>> = {
            let mut writer = self.writer.lock();
            if writer.endpoints.remove(&id).is_none() {
                return Err(RoutingError::EndpointNotFound(id));
            }
            let current = self.routes.load_full();
            let (removed, kept): (Vec<_>, Vec<_>) = current
                .iter()
                .cloned()
                .partition(|e| e.rule.source.id == id || e.rule.sink.id == id);
            if !removed.is_empty() {
                self.publish(kept);
            }
            removed
        };
        tracing::debug!(id, routes = removed.len(), "routing: endpoint unregistered");
        for entry in &removed {
            self.notify(&entry.rule, RouteChange::Removed);
        }
        Ok(removed.len())
    }

    /// Copy of every registered endpoint, ordered by id.
    pub fn endpoints(&self) -> Vec<AudioEndpoint> {
        self.writer.lock().endpoints.values().cloned().collect()
    }
}

fn check_scratch(scratch: &SampleVec, format: SampleFormat, len: usize) -> Result<(), RoutingError> {
    if scratch.format() != format {
        return Err(RoutingError::FormatMismatch {
            expected: scratch.format(),
            actual: format,
        });
    }
    if len > scratch.capacity() {
        return Err(RoutingError::BufferTooLarge {
            requested: len,
            capacity: scratch.capacity(),
        });
    }
    Ok(())
}

impl fmt::Debug for RoutingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingTable")
            .field("config", &self.config)
            .field("routes", &self.routes())
            .finish_non_exhaustive()
    }
}
