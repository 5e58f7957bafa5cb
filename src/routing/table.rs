//! Ordered route table compiled from configuration.

use serde::Serialize;

use crate::config::validation::validate_routes;
use crate::config::RouteConfig;
use crate::routing::matcher::PathMatcher;
use crate::routing::RouteError;
use crate::views::ViewId;

/// A navigable path mapped to a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    #[serde(skip)]
    matcher: PathMatcher,
    pub path: String,
    pub name: String,
    pub view: ViewId,
    pub mobile_view: Option<ViewId>,
    pub lazy: bool,
}

impl Route {
    pub fn from_config(config: &RouteConfig) -> Self {
        Self {
            matcher: PathMatcher::new(config.path.clone()),
            path: config.path.clone(),
            name: config.name.clone(),
            view: ViewId::new(config.view.clone()),
            mobile_view: config.mobile_view.clone().map(ViewId::new),
            lazy: config.lazy,
        }
    }

    pub fn matches(&self, requested: &str) -> bool {
        self.matcher.matches(requested)
    }
}

/// Routes in declaration order. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct RouteTable {
    routes: Vec<Route>,
    not_found_view: Option<ViewId>,
}

impl RouteTable {
    /// Build a table, rejecting duplicate names/paths and a missing home route.
    pub fn from_config(routes: &[RouteConfig], not_found_view: Option<&str>) -> Result<Self, RouteError> {
        validate_routes(routes, not_found_view).map_err(RouteError::Invalid)?;

        let routes: Vec<Route> = routes.iter().map(Route::from_config).collect();
        tracing::debug!(
            routes = routes.len(),
            names = ?routes.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            "Route table built"
        );

        Ok(Self {
            routes,
            not_found_view: not_found_view.map(ViewId::new),
        })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// First route whose path matches, with its index.
    pub fn find(&self, requested: &str) -> Option<(usize, &Route)> {
        self.routes.iter().enumerate().find(|(_, r)| r.matches(requested))
    }

    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    pub fn not_found_view(&self) -> Option<&ViewId> {
        self.not_found_view.as_ref()
    }

    /// Views that must be loaded before any router is built.
    ///
    /// Includes the fallback view, so a missing one fails at startup.
    pub fn eager_views(&self) -> Vec<ViewId> {
        let mut ids: Vec<ViewId> = Vec::new();
        let eager = self.routes.iter().filter(|r| !r.lazy).map(|r| &r.view);
        for id in eager.chain(self.not_found_view.as_ref()) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }
}
