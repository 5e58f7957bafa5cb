//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Preload views → Build API client → App
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Close HMR sockets → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then views, then listener
//! - App is built once and passed by reference/Arc, never global

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{App, RouteSnapshot, StartupError};
