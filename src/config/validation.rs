//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Unique route names and paths, home path present
//! - Keep routes off the dev server's own endpoints
//! - Validate value ranges (ports, intervals, thresholds)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::env::PUBLIC_PREFIX;
use crate::config::schema::{AppConfig, RouteConfig};
use crate::views::ViewId;

/// Path every route table must contain.
pub const HOME_PATH: &str = "/";

/// Route listing served by the dev server.
pub const ROUTES_PATH: &str = "/__routes";

/// Hot-reload websocket served by the dev server.
pub const HMR_PATH: &str = "/__hmr";

/// Paths the dev server answers itself.
pub const RESERVED_PATHS: [&str; 2] = [ROUTES_PATH, HMR_PATH];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("duplicate route name '{0}'")]
    DuplicateName(String),

    #[error("duplicate route path '{0}'")]
    DuplicatePath(String),

    #[error("route '{name}' has path '{path}' which does not start with '/'")]
    RelativePath { name: String, path: String },

    #[error("route '{0}' has an empty view id")]
    EmptyView(String),

    #[error("route '{name}' uses the reserved path '{path}'")]
    ReservedPath { name: String, path: String },

    #[error("no route for the home path '/'")]
    MissingHome,

    #[error("not_found_view '{0}' is not a valid view id")]
    InvalidNotFoundView(String),

    #[error("api.base_url_env '{0}' must start with '{prefix}'", prefix = PUBLIC_PREFIX)]
    PrivateEnvVar(String),

    #[error("dev_server.port must be non-zero")]
    ZeroPort,

    #[error("dev_server.watch.interval_ms must be non-zero")]
    ZeroPollInterval,

    #[error("device.max_mobile_width must be non-zero")]
    ZeroMobileWidth,
}

/// Render a list of errors as one line.
pub fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check the route list and fallback view. Shared with `RouteTable` construction.
pub fn validate_routes(routes: &[RouteConfig], not_found_view: Option<&str>) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();
    let mut paths = HashSet::new();

    for route in routes {
        if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateName(route.name.clone()));
        }
        if !paths.insert(route.path.as_str()) {
            errors.push(ValidationError::DuplicatePath(route.path.clone()));
        }
        if !route.path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                name: route.name.clone(),
                path: route.path.clone(),
            });
        }
        if RESERVED_PATHS.contains(&route.path.as_str()) {
            errors.push(ValidationError::ReservedPath {
                name: route.name.clone(),
                path: route.path.clone(),
            });
        }
        if route.view.trim().is_empty() || route.mobile_view.as_deref().is_some_and(|v| v.trim().is_empty()) {
            errors.push(ValidationError::EmptyView(route.name.clone()));
        }
    }

    if !paths.contains(HOME_PATH) {
        errors.push(ValidationError::MissingHome);
    }
    if let Some(id) = not_found_view {
        if !ViewId::new(id).is_safe() {
            errors.push(ValidationError::InvalidNotFoundView(id.to_string()));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate a whole configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = match validate_routes(&config.routes, config.not_found_view.as_deref()) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    if config.dev_server.port == 0 || config.dev_server.hmr.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.dev_server.watch.interval_ms == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }
    if config.device.max_mobile_width == 0 {
        errors.push(ValidationError::ZeroMobileWidth);
    }
    // Only public variables survive env loading.
    if !config.api.base_url_env.starts_with(PUBLIC_PREFIX) {
        errors.push(ValidationError::PrivateEnvVar(config.api.base_url_env.clone()));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
