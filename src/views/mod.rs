//! View loading subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     eager view ids → preload() → PreloadedViews (Direct routes)
//!
//! Navigation to a lazy route:
//!     ViewId → CachingLoader (shared in-flight load)
//!            → DirectoryLoader (<views dir>/<id>.html)
//!            → ViewReference
//! ```

pub mod cache;
pub mod loader;

use std::collections::HashMap;

pub use cache::CachingLoader;
pub use loader::{
    preload, DirectoryLoader, LoadError, StaticLoader, ViewFuture, ViewId, ViewLoader,
    ViewReference,
};

/// Views loaded at startup, keyed by id.
pub type PreloadedViews = HashMap<ViewId, ViewReference>;
