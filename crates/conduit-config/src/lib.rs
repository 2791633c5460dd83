//! Configuration for the conduit framework.
//!
//! A conduit process is described by one TOML file: routing table settings,
//! the endpoints it knows about, the routes between them (with their effect
//! chains), and the modules to load at startup.
//!
//! ```toml
//! [routing]
//! max_routes = 32
//! default_priority = 128
//!
//! [[endpoints]]
//! id = 1
//! direction = "source"
//! name = "capture"
//!
//! [[endpoints]]
//! id = 2
//! direction = "sink"
//! name = "playback"
//!
//! [[routes]]
//! source = 1
//! sink = 2
//! type = "processed"
//! [routes.chain]
//! sample_rate = 48000
//! channels = 2
//! [[routes.chain.nodes]]
//! effect = "compressor"
//! threshold = -18.0
//!
//! [[modules]]
//! path = "builtin:chain"
//! config = "effect=reverb"
//! ```
//!
//! # Features
//!
//! - **Load/Save**: [`FrameworkConfig::load`], [`FrameworkConfig::save`]
//! - **Validation**: [`validate_config`] collects every problem in a file
//! - **Assembly**: [`FrameworkConfig::build_routing_table`], [`FrameworkConfig::load_modules`]
//! - **Paths**: platform config and module directories

mod error;
mod framework;

/// Platform-specific paths for configuration and modules.
pub mod paths;

/// Framework configuration validation.
pub mod validation;

pub use error::{ConfigError, FileAction};
pub use framework::{FrameworkConfig, ModuleConfig, RouteConfig};
pub use paths::{
    CONFIG_FILE_NAME, default_config_file, ensure_user_config_dir, find_config,
    resolve_module_path, system_modules_dir, user_config_dir, user_modules_dir,
};
pub use validation::{ValidationError, ValidationResult, validate_config};
