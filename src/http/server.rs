//! Dev server setup.
//!
//! # Responsibilities
//! - Bind the configured host/port, honoring strict-port semantics
//! - Resolve every page request through a router for the caller's device
//! - Expose the route table and the hot-reload websocket
//! - Graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{State, WebSocketUpgrade},
    http::{header::HeaderName, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::validation::{HMR_PATH, ROUTES_PATH};
use crate::config::DevServerConfig;
use crate::device::DeviceEnvironment;
use crate::http::hmr::{self, HmrHub};
use crate::lifecycle::{App, Shutdown};
use crate::routing::Route;

/// How many ports are tried when the port is not strict.
pub const MAX_PORT_ATTEMPTS: u16 = 10;

/// Response header naming the matched route.
pub const X_ROUTE_NAME: &str = "x-route-name";

/// Response header carrying the device class used.
pub const X_DEVICE_CLASS: &str = "x-device-class";

/// Dev server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Port {port} is already in use on {host}")]
    PortInUse { host: String, port: u16 },

    #[error("No free port on {host} in {first}..={last}")]
    NoFreePort { host: String, first: u16, last: u16 },

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<App>,
    pub hmr: HmrHub,
    pub hmr_url: String,
    pub shutdown: Shutdown,
}

/// Route listing served at [`ROUTES_PATH`].
#[derive(Debug, Serialize)]
struct RoutesResponse {
    routes: Vec<Route>,
    not_found_view: Option<String>,
    hmr: String,
}

/// HTTP dev server.
pub struct DevServer {
    state: AppState,
}

impl DevServer {
    /// `bound` is the page listener's address; a shared HMR port follows it.
    pub fn new(app: Arc<App>, hmr: HmrHub, shutdown: Shutdown, bound: SocketAddr) -> Self {
        let hmr_url = app.config().dev_server.hmr_client_url(bound.port());
        Self {
            state: AppState {
                app,
                hmr,
                hmr_url,
                shutdown,
            },
        }
    }

    /// Websocket URL embedded in served pages.
    pub fn hmr_url(&self) -> &str {
        &self.state.hmr_url
    }

    fn page_router(&self) -> Router {
        Router::new()
            .route(ROUTES_PATH, get(routes_handler))
            .route(HMR_PATH, get(hmr_handler))
            .fallback(page_handler)
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    fn hmr_router(&self) -> Router {
        Router::new()
            .route(HMR_PATH, get(hmr_handler))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until `shutdown` fires.
    ///
    /// `hmr_listener` carries the websocket when it has its own port.
    pub async fn run(
        self,
        listener: TcpListener,
        hmr_listener: Option<TcpListener>,
        shutdown: Shutdown,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, hmr = %self.state.hmr_url, "Dev server starting");

        let hmr_task = match hmr_listener {
            Some(hmr_listener) => {
                tracing::info!(address = %hmr_listener.local_addr()?, "HMR listener starting");
                let router = self.hmr_router();
                let mut signal = shutdown.subscribe();
                Some(tokio::spawn(async move {
                    axum::serve(hmr_listener, router)
                        .with_graceful_shutdown(async move {
                            let _ = signal.recv().await;
                        })
                        .await
                }))
            }
            None => None,
        };

        let mut signal = shutdown.subscribe();
        axum::serve(listener, self.page_router())
            .with_graceful_shutdown(async move {
                let _ = signal.recv().await;
            })
            .await?;

        if let Some(task) = hmr_task {
            match task.await {
                Ok(result) => result?,
                Err(e) => tracing::error!(error = %e, "HMR listener task failed"),
            }
        }

        tracing::info!("Dev server stopped");
        Ok(())
    }
}

/// Bind the dev server listener.
///
/// With `strict_port` an occupied port is an error; otherwise up to
/// [`MAX_PORT_ATTEMPTS`] consecutive ports are tried.
pub async fn bind_listener(config: &DevServerConfig) -> Result<TcpListener, ServerError> {
    bind_port(&config.host, config.port, config.strict_port).await
}

/// Bind the separate HMR listener, if the HMR port is not the page port.
///
/// Clients are told the exact HMR port, so it is always strict.
pub async fn bind_hmr_listener(config: &DevServerConfig) -> Result<Option<TcpListener>, ServerError> {
    if config.hmr_shares_port() {
        return Ok(None);
    }
    bind_port(&config.host, config.hmr.port, true).await.map(Some)
}

async fn bind_port(host: &str, first: u16, strict: bool) -> Result<TcpListener, ServerError> {
    let attempts = if strict { 1 } else { MAX_PORT_ATTEMPTS };
    let mut port = first;

    for attempt in 0..attempts {
        let address = format!("{}:{}", host, port);
        match TcpListener::bind(&address).await {
            Ok(listener) => {
                if attempt > 0 {
                    tracing::warn!(requested = first, actual = port, "Requested port busy, using another one");
                }
                return Ok(listener);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                if strict {
                    return Err(ServerError::PortInUse {
                        host: host.to_string(),
                        port,
                    });
                }
                tracing::info!(port, "Port is in use, trying another one...");
                port = match port.checked_add(1) {
                    Some(next) => next,
                    None => break,
                };
            }
            Err(source) => return Err(ServerError::Bind { address, source }),
        }
    }

    Err(ServerError::NoFreePort {
        host: host.to_string(),
        first,
        last: port.saturating_sub(1).max(first),
    })
}

async fn routes_handler(State(state): State<AppState>) -> Json<RoutesResponse> {
    let table = state.app.table();
    Json(RoutesResponse {
        routes: table.routes().to_vec(),
        not_found_view: table.not_found_view().map(ToString::to_string),
        hmr: state.hmr_url.clone(),
    })
}

async fn hmr_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let updates = state.hmr.subscribe();
    let shutdown = state.shutdown.subscribe();
    ws.on_upgrade(move |socket| hmr::serve_socket(socket, updates, shutdown))
}

/// Resolve a page for the requesting device.
async fn page_handler(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    let start = Instant::now();
    let path = uri.path().to_string();
    let env = DeviceEnvironment::from_headers(&headers);

    let router = match state.app.router_for_env(&env) {
        Ok(router) => router,
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Failed to build router");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Router unavailable").into_response();
        }
    };
    let device = router.device();

    let navigation = router.navigate(&path);
    let status = if navigation.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    let route = navigation.route.clone();

    let view = match navigation.resolution.await {
        Ok(view) => view,
        Err(e) => {
            tracing::error!(path = %path, error = %e, "View failed to load");
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to load view: {}", e)).into_response();
        }
    };

    tracing::debug!(
        path = %path,
        route = ?route,
        device = %device,
        view = %view.id(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Page served"
    );

    let body = format!("{}{}", view.markup(), hmr::client_script(&state.hmr_url));
    let mut response = (status, Html(body)).into_response();

    let response_headers = response.headers_mut();
    if let Some(name) = route.as_deref().and_then(|r| HeaderValue::from_str(r).ok()) {
        response_headers.insert(HeaderName::from_static(X_ROUTE_NAME), name);
    }
    response_headers.insert(
        HeaderName::from_static(X_DEVICE_CLASS),
        HeaderValue::from_static(if device.is_mobile() { "mobile" } else { "desktop" }),
    );
    response
}
