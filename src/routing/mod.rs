//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → table.rs (validate, keep declaration order)
//!     → Freeze as immutable RouteTable
//!
//! Router construction (once per client):
//!     RouteTable + DeviceClass + preloaded views
//!     → router.rs (pick variant per route)
//!
//! Navigation:
//!     path → matcher.rs (exact match) → first matching Route
//!          → Ready(view) | Loading(future) | NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact string matching only
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod router;
pub mod table;

use thiserror::Error;

use crate::config::validation::{join_errors, ValidationError};
use crate::views::ViewId;

pub use router::{Navigation, Resolution, Router, ViewSource};
pub use table::{Route, RouteTable};

/// Errors raised while building or querying routes.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Nothing in the table matches the path.
    #[error("no route matches '{path}'")]
    NotFound { path: String },

    /// Route definitions violate table invariants.
    #[error("invalid route table: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    /// An eagerly loaded view was not available at router construction.
    #[error("view '{0}' is not lazy and was not preloaded")]
    MissingPreload(ViewId),
}
