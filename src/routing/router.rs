//! Route lookup and view resolution.
//!
//! # Responsibilities
//! - Fix the variant of every route for one device class at construction
//! - Look up the route for a navigation path (first match wins)
//! - Return the view directly or a pending lazy load
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Device class is never re-evaluated; build a new Router instead
//! - Explicit NotFound rather than silent default

use std::future::IntoFuture;
use std::sync::Arc;

use futures_util::future::{self, FutureExt};

use crate::device::DeviceClass;
use crate::routing::table::{Route, RouteTable};
use crate::routing::RouteError;
use crate::views::{LoadError, PreloadedViews, ViewFuture, ViewId, ViewLoader, ViewReference};

/// Markup served when nothing matches and no fallback view is configured.
pub const DEFAULT_NOT_FOUND_MARKUP: &str = "<h1>404</h1><p>Page not found</p>";

/// Id of the built-in not-found view.
pub const DEFAULT_NOT_FOUND_ID: &str = "NotFound";

/// How a route's view is obtained for this router's device class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSource {
    /// Already loaded.
    Direct(ViewReference),
    /// Loaded on navigation.
    Lazy(ViewId),
}

/// Outcome of resolving a path. Awaiting it yields the view either way.
pub enum Resolution {
    Ready(ViewReference),
    Loading(ViewFuture),
}

impl Resolution {
    pub fn is_ready(&self) -> bool {
        matches!(self, Resolution::Ready(_))
    }

    pub async fn into_view(self) -> Result<ViewReference, LoadError> {
        self.await
    }
}

impl IntoFuture for Resolution {
    type Output = Result<ViewReference, LoadError>;
    type IntoFuture = ViewFuture;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Resolution::Ready(view) => future::ready(Ok(view)).boxed(),
            Resolution::Loading(fut) => fut,
        }
    }
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Ready(view) => f.debug_tuple("Ready").field(view.id()).finish(),
            Resolution::Loading(_) => f.write_str("Loading"),
        }
    }
}

/// Result of a navigation that always produces something to render.
#[derive(Debug)]
pub struct Navigation {
    /// Name of the matched route, `None` for the not-found fallback.
    pub route: Option<String>,
    pub resolution: Resolution,
}

impl Navigation {
    pub fn is_not_found(&self) -> bool {
        self.route.is_none()
    }
}

/// Route resolver bound to one device class.
pub struct Router {
    table: Arc<RouteTable>,
    device: DeviceClass,
    /// One entry per route, same order as the table.
    sources: Vec<ViewSource>,
    fallback: ViewSource,
    loader: Arc<dyn ViewLoader>,
}

impl Router {
    /// Compile the table for `device`.
    ///
    /// Non-lazy views must be present in `preloaded`.
    pub fn new(
        table: Arc<RouteTable>,
        device: DeviceClass,
        preloaded: &PreloadedViews,
        loader: Arc<dyn ViewLoader>,
    ) -> Result<Self, RouteError> {
        let sources = table
            .routes()
            .iter()
            .map(|route| compile_source(route, device, preloaded))
            .collect::<Result<Vec<_>, _>>()?;

        let fallback = match table.not_found_view() {
            Some(id) => preloaded
                .get(id)
                .cloned()
                .map(ViewSource::Direct)
                .unwrap_or_else(|| ViewSource::Lazy(id.clone())),
            None => ViewSource::Direct(default_not_found()),
        };

        tracing::debug!(device = %device, routes = sources.len(), "Router built");

        Ok(Self {
            table,
            device,
            sources,
            fallback,
            loader,
        })
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// How `route_name` is served on this router.
    pub fn source(&self, route_name: &str) -> Option<&ViewSource> {
        self.table
            .routes()
            .iter()
            .position(|r| r.name == route_name)
            .map(|idx| &self.sources[idx])
    }

    /// Resolve a navigation path.
    pub fn resolve(&self, path: &str) -> Result<Resolution, RouteError> {
        let (idx, route) = self.table.find(path).ok_or_else(|| RouteError::NotFound {
            path: path.to_string(),
        })?;

        tracing::debug!(path = %path, route = %route.name, device = %self.device, "Route matched");
        Ok(self.materialize(&self.sources[idx]))
    }

    /// Resolve a path, falling back to the not-found view.
    pub fn navigate(&self, path: &str) -> Navigation {
        match self.table.find(path) {
            Some((idx, route)) => Navigation {
                route: Some(route.name.clone()),
                resolution: self.materialize(&self.sources[idx]),
            },
            None => {
                tracing::debug!(path = %path, "No route matched, using fallback view");
                Navigation {
                    route: None,
                    resolution: self.materialize(&self.fallback),
                }
            }
        }
    }

    fn materialize(&self, source: &ViewSource) -> Resolution {
        match source {
            ViewSource::Direct(view) => Resolution::Ready(view.clone()),
            ViewSource::Lazy(id) => Resolution::Loading(self.loader.load_view(id)),
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("device", &self.device)
            .field("sources", &self.sources)
            .finish()
    }
}

fn compile_source(route: &Route, device: DeviceClass, preloaded: &PreloadedViews) -> Result<ViewSource, RouteError> {
    if let (Some(mobile), DeviceClass::Mobile) = (&route.mobile_view, device) {
        return Ok(ViewSource::Lazy(mobile.clone()));
    }
    if route.lazy {
        return Ok(ViewSource::Lazy(route.view.clone()));
    }
    preloaded
        .get(&route.view)
        .cloned()
        .map(ViewSource::Direct)
        .ok_or_else(|| RouteError::MissingPreload(route.view.clone()))
}

/// Built-in view for unmatched paths.
pub fn default_not_found() -> ViewReference {
    ViewReference::new(ViewId::new(DEFAULT_NOT_FOUND_ID), DEFAULT_NOT_FOUND_MARKUP)
}
