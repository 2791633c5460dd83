//! The framework configuration file.

use crate::paths::resolve_module_path;
use crate::error::FileAction;
use crate::{ConfigError, validation};
use conduit_chain::ChainSpec;
use conduit_modules::{ModuleError, ModuleLoader};
use conduit_registry::{EffectKind, ProcessingParams};
use conduit_routing::{
    AudioEndpoint, EndpointId, RouteRule, RouteType, RoutingConfig, RoutingTable,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_enabled() -> bool {
    true
}

fn default_route_type() -> RouteType {
    RouteType::Direct
}

/// One `[[routes]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Source endpoint id.
    pub source: EndpointId,
    /// Sink endpoint id.
    pub sink: EndpointId,
    /// Dispatch mode.
    #[serde(rename = "type", default = "default_route_type")]
    pub route_type: RouteType,
    /// Priority 0-255; `[routing] default_priority` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Whether the route dispatches.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Effect chain for processed routes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<ChainSpec>,
}

impl RouteConfig {
    /// An enabled Direct route at the default priority.
    pub fn direct(source: EndpointId, sink: EndpointId) -> Self {
        Self {
            source,
            sink,
            route_type: RouteType::Direct,
            priority: None,
            enabled: true,
            chain: None,
        }
    }

    /// A Processed route running `chain`.
    pub fn processed(source: EndpointId, sink: EndpointId, chain: ChainSpec) -> Self {
        Self {
            route_type: RouteType::Processed,
            chain: Some(chain),
            ..Self::direct(source, sink)
        }
    }
}

/// One `[[modules]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Shared library path, bare file name, or `builtin:<name>`.
    pub path: String,
    /// String handed to the module's `init`.
    #[serde(default)]
    pub config: String,
}

impl ModuleConfig {
    /// A module entry with an empty init string.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            config: String::new(),
        }
    }

    /// Set the init string.
    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = config.into();
        self
    }
}

/// Everything a conduit process is configured with.
///
/// # Example
///
/// ```rust
/// use conduit_config::FrameworkConfig;
///
/// let config = FrameworkConfig::from_toml(r#"
///     [routing]
///     max_routes = 4
///
///     [[endpoints]]
///     id = 1
///     direction = "source"
///     name = "capture"
///
///     [[endpoints]]
///     id = 2
///     direction = "sink"
///     name = "playback"
///
///     [[routes]]
///     source = 1
///     sink = 2
/// "#).unwrap();
///
/// let table = config.build_routing_table().unwrap();
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Routing table settings.
    pub routing: RoutingConfig,
    /// Declared endpoints.
    pub endpoints: Vec<AudioEndpoint>,
    /// Routes between declared endpoints.
    pub routes: Vec<RouteConfig>,
    /// Modules to load at startup.
    pub modules: Vec<ModuleConfig>,
}

impl FrameworkConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io(FileAction::Read, path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(
            path = %path.display(),
            endpoints = config.endpoints.len(),
            routes = config.routes.len(),
            modules = config.modules.len(),
            "config: loaded"
        );
        Ok(config)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(FileAction::CreateDir, parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::io(FileAction::Write, path, e))?;
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the configuration; see [`validate_config`](crate::validate_config).
    pub fn validate(&self) -> validation::ValidationResult<()> {
        validation::validate_config(self)
    }

    /// A small working configuration: capture to playback through a
    /// compressor and reverb, plus the built-in chain module.
    pub fn starter() -> Self {
        let chain = ChainSpec::new(48000, 2)
            .with_node(ProcessingParams::defaults(EffectKind::Compressor))
            .with_node(ProcessingParams::defaults(EffectKind::Reverb));
        Self {
            routing: RoutingConfig::default(),
            endpoints: vec![
                AudioEndpoint::source(1, "capture").with_device("default"),
                AudioEndpoint::sink(2, "playback").with_device("default"),
                AudioEndpoint::sink(3, "monitor"),
            ],
            routes: vec![
                RouteConfig::processed(1, 2, chain),
                RouteConfig {
                    route_type: RouteType::Mixed,
                    priority: Some(200),
                    ..RouteConfig::direct(1, 3)
                },
            ],
            modules: vec![
                ModuleConfig::new("builtin:chain").with_config("channels=2; effect=equalizer"),
            ],
        }
    }

    /// The rule a route entry describes, with endpoints resolved.
    ///
    /// Returns `None` if an endpoint is not declared.
    pub fn route_rule(&self, route: &RouteConfig) -> Option<RouteRule> {
        let find = |id: EndpointId| self.endpoints.iter().find(|e| e.id == id).cloned();
        let priority = route
            .priority
            .map_or(self.routing.route_priority(), |p| u8::try_from(p).unwrap_or(u8::MAX));
        let mut rule = RouteRule::new(find(route.source)?, find(route.sink)?, route.route_type)
            .with_priority(priority);
        rule.enabled = route.enabled;
        rule.chain = route.chain.clone();
        Some(rule)
    }

    /// Validate, then build a routing table with every endpoint registered
    /// and every route added.
    pub fn build_routing_table(&self) -> Result<RoutingTable, ConfigError> {
        self.validate()?;
        let table = RoutingTable::new(self.routing)?;
        for endpoint in &self.endpoints {
            table.register_endpoint(endpoint.clone())?;
        }
        for route in &self.routes {
            // validation guarantees both endpoints exist
            let Some(mut rule) = self.route_rule(route) else {
                continue;
            };
            // auto-routing may already have joined this pair
            match table.find_route(route.source, route.sink) {
                Some(existing) => {
                    rule.id = existing.id;
                    table.update_route(rule)?;
                }
                None => {
                    table.add_route(rule)?;
                }
            }
        }
        Ok(table)
    }

    /// Load every configured module into `loader`.
    ///
    /// A module that fails to load is logged and skipped; the failures are
    /// returned with the configured path.
    pub fn load_modules(&self, loader: &mut ModuleLoader) -> Vec<(String, ModuleError)> {
        let mut failures = Vec::new();
        for module in &self.modules {
            let path = resolve_module_path(&module.path);
            if let Err(e) = loader.load(&path, &module.config) {
                tracing::warn!(path = %module.path, error = %e, "config: module skipped");
                failures.push((module.path.clone(), e));
            }
        }
        failures
    }
}
