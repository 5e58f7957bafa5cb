//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the app.
//! All types derive Serde traits for deserialization from config files.
//! Defaults reproduce the stock setup: a home route with a mobile variant,
//! a lazily loaded `/donate` page, and a dev server on `0.0.0.0:5173`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::validation::HMR_PATH;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Route definitions, matched in order.
    pub routes: Vec<RouteConfig>,

    /// View shown when no route matches.
    pub not_found_view: Option<String>,

    /// Where view modules are loaded from.
    pub views: ViewsConfig,

    /// Device classification policy.
    pub device: DeviceConfig,

    /// HTTP client defaults.
    pub api: ApiConfig,

    /// Dev server settings.
    pub dev_server: DevServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            routes: vec![
                RouteConfig {
                    path: "/".to_string(),
                    name: "home".to_string(),
                    view: "HomeView".to_string(),
                    mobile_view: Some("MobileHomeView".to_string()),
                    lazy: false,
                },
                RouteConfig {
                    path: "/donate".to_string(),
                    name: "donate".to_string(),
                    view: "DonateView".to_string(),
                    mobile_view: None,
                    lazy: true,
                },
            ],
            not_found_view: None,
            views: ViewsConfig::default(),
            device: DeviceConfig::default(),
            api: ApiConfig::default(),
            dev_server: DevServerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// A single navigable route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Exact path to match (e.g. "/donate").
    pub path: String,

    /// Unique route identifier.
    pub name: String,

    /// Default view rendered for this route.
    pub view: String,

    /// Variant rendered instead of `view` on mobile devices. Always lazy.
    #[serde(default)]
    pub mobile_view: Option<String>,

    /// Load `view` on first navigation rather than at startup.
    #[serde(default)]
    pub lazy: bool,
}

/// View module source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewsConfig {
    /// Directory holding `<ViewId>.html` files.
    pub dir: String,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            dir: "views".to_string(),
        }
    }
}

impl ViewsConfig {
    /// Anchor a relative `dir` at `base`.
    pub fn resolve_against(&mut self, base: &Path) {
        if base.as_os_str().is_empty() || Path::new(&self.dir).is_absolute() {
            return;
        }
        self.dir = base.join(&self.dir).to_string_lossy().into_owned();
    }
}

/// Device classification policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Viewports at or below this width are mobile.
    pub max_mobile_width: u32,

    /// User-agent tokens that mark a mobile device (case-insensitive).
    pub mobile_tokens: Vec<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            max_mobile_width: 768,
            mobile_tokens: [
                "Android",
                "webOS",
                "iPhone",
                "iPad",
                "iPod",
                "BlackBerry",
                "IEMobile",
                "Opera Mini",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
        }
    }
}

/// API client defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Explicit base URL. Takes precedence over the environment.
    pub base_url: Option<String>,

    /// Environment variable holding the base URL.
    pub base_url_env: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            base_url_env: "VITE_API_URL".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Dev server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevServerConfig {
    /// Bind host.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Fail when the port is taken instead of trying the next one.
    pub strict_port: bool,

    /// Hot-reload endpoint advertised to clients.
    pub hmr: HmrConfig,

    /// File watching.
    pub watch: WatchConfig,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5173,
            strict_port: true,
            hmr: HmrConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl DevServerConfig {
    /// `host:port` bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Change the bind port. A shared HMR port moves with it.
    pub fn set_port(&mut self, port: u16) {
        if self.hmr_shares_port() {
            self.hmr.port = port;
        }
        self.port = port;
    }

    /// True when hot reload is served by the page server itself.
    pub fn hmr_shares_port(&self) -> bool {
        self.hmr.port == self.port
    }

    /// Websocket URL advertised to pages once the server is bound to `bound_port`.
    ///
    /// A shared HMR port follows the bound port, which may differ from
    /// `port` after a loose-port fallback or an ephemeral bind.
    pub fn hmr_client_url(&self, bound_port: u16) -> String {
        let port = if self.hmr_shares_port() { bound_port } else { self.hmr.port };
        self.hmr.url_for_port(port)
    }
}

/// Hot-reload client settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HmrConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HmrConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5173,
        }
    }
}

impl HmrConfig {
    /// Websocket URL clients connect to.
    pub fn client_url(&self) -> String {
        self.url_for_port(self.port)
    }

    fn url_for_port(&self, port: u16) -> String {
        format!("ws://{}:{}{}", self.host, port, HMR_PATH)
    }
}

/// File watch settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Poll the filesystem instead of relying on native events.
    pub use_polling: bool,

    /// Polling interval in milliseconds.
    pub interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            use_polling: true,
            interval_ms: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
