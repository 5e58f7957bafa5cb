//! Device-aware view router library

pub mod config;
pub mod device;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod views;

pub use config::schema::AppConfig;
pub use device::{DeviceClass, DeviceClassifier, DeviceEnvironment};
pub use http::{ApiClient, DevServer};
pub use lifecycle::{App, Shutdown};
pub use routing::{Resolution, RouteTable, Router};
pub use views::{ViewId, ViewLoader, ViewReference};
