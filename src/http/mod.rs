//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound API calls:
//!     ApiConfig + VITE_API_URL → client.rs (reqwest, JSON defaults)
//!
//! Dev server:
//!     TCP listener (strict port)
//!     → server.rs (Axum setup, per-device router, page render)
//!     → hmr.rs (websocket fan-out of reload messages)
//! ```

pub mod client;
pub mod hmr;
pub mod server;

pub use client::{ApiClient, ApiError};
pub use hmr::{HmrHub, HmrMessage};
pub use server::{bind_hmr_listener, bind_listener, DevServer, ServerError};
