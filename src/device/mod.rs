//! Device classification.
//!
//! # Data Flow
//! ```text
//! User-Agent header / viewport width hint
//!     → DeviceEnvironment
//!     → DeviceClassifier::classify
//!     → DeviceClass (fixed for the lifetime of a Router)
//! ```
//!
//! # Design Decisions
//! - Token match over the user agent, no regex
//! - Case-insensitive, substring semantics
//! - Missing signals never classify as mobile

pub mod classifier;

pub use classifier::{DeviceClass, DeviceClassifier, DeviceEnvironment};
