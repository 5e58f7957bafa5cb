//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! router.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → threaded through App at startup
//!
//! .env, .env.local, .env.<mode>, .env.<mode>.local
//!     → env.rs (VITE_* variables, process env wins)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the route table
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use env::EnvVars;
pub use loader::ConfigError;
pub use schema::{
    ApiConfig, AppConfig, DevServerConfig, DeviceConfig, HmrConfig, ObservabilityConfig,
    RouteConfig, ViewsConfig, WatchConfig,
};
