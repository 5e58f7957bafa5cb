//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the route table and preload eager views
//! - Build the API client from config and environment
//! - Hand out per-device routers
//! - Apply hot-reload updates atomically
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - One `App` per process, passed explicitly; no globals
//! - Reloads swap a whole snapshot, never mutate one in place

use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::config::validation::validate_config;
use crate::config::{AppConfig, ConfigError, EnvVars};
use crate::device::{DeviceClass, DeviceClassifier, DeviceEnvironment};
use crate::http::client::{ApiClient, ApiError};
use crate::routing::{RouteError, RouteTable, Router};
use crate::views::{preload, CachingLoader, DirectoryLoader, LoadError, PreloadedViews, ViewId, ViewLoader};

/// Fatal initialization errors.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("failed to preload views: {0}")]
    Load(#[from] LoadError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Everything a router needs, swapped as a unit on reload.
#[derive(Debug)]
pub struct RouteSnapshot {
    pub table: Arc<RouteTable>,
    pub preloaded: PreloadedViews,
    pub classifier: DeviceClassifier,
}

type SharedLoader = CachingLoader<Arc<dyn ViewLoader>>;

/// Application context built once at startup.
pub struct App {
    config: AppConfig,
    api: ApiClient,
    views: Arc<SharedLoader>,
    snapshot: ArcSwap<RouteSnapshot>,
}

impl App {
    /// Initialize with views read from `config.views.dir`.
    pub async fn from_config(config: AppConfig, env: &EnvVars) -> Result<Self, StartupError> {
        let loader: Arc<dyn ViewLoader> = Arc::new(DirectoryLoader::new(config.views.dir.clone()));
        Self::initialize(config, env, loader).await
    }

    /// Initialize with an explicit view loader.
    pub async fn initialize(
        config: AppConfig,
        env: &EnvVars,
        loader: Arc<dyn ViewLoader>,
    ) -> Result<Self, StartupError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let views = Arc::new(CachingLoader::new(loader));
        let snapshot = build_snapshot(&config, views.as_ref()).await?;
        let api = ApiClient::from_config(&config.api, env)?;

        tracing::info!(
            routes = snapshot.table.len(),
            preloaded = snapshot.preloaded.len(),
            api_configured = api.is_configured(),
            "Application initialized"
        );

        Ok(Self {
            config,
            api,
            views,
            snapshot: ArcSwap::from_pointee(snapshot),
        })
    }

    /// Configuration the app started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn snapshot(&self) -> Arc<RouteSnapshot> {
        self.snapshot.load_full()
    }

    pub fn table(&self) -> Arc<RouteTable> {
        Arc::clone(&self.snapshot.load().table)
    }

    pub fn classify(&self, env: &DeviceEnvironment) -> DeviceClass {
        self.snapshot.load().classifier.classify(env)
    }

    /// Router fixed to `device` over the current table.
    pub fn router_for(&self, device: DeviceClass) -> Result<Router, RouteError> {
        let snapshot = self.snapshot.load();
        let loader: Arc<dyn ViewLoader> = self.views.clone();
        Router::new(Arc::clone(&snapshot.table), device, &snapshot.preloaded, loader)
    }

    /// Classify `env` and build its router.
    pub fn router_for_env(&self, env: &DeviceEnvironment) -> Result<Router, RouteError> {
        self.router_for(self.classify(env))
    }

    /// Replace routes and device policy. The old snapshot stays live on error.
    pub async fn reload_routes(&self, config: &AppConfig) -> Result<(), StartupError> {
        let snapshot = build_snapshot(config, self.views.as_ref()).await?;
        tracing::info!(routes = snapshot.table.len(), "Route table reloaded");
        self.snapshot.store(Arc::new(snapshot));
        Ok(())
    }

    /// Drop a changed view from cache, re-preloading it if a route needs it eagerly.
    pub async fn view_changed(&self, id: &ViewId) -> Result<(), LoadError> {
        self.views.invalidate(id);

        let current = self.snapshot.load_full();
        if !current.preloaded.contains_key(id) {
            return Ok(());
        }

        let view = self.views.load_view(id).await?;
        let mut preloaded = current.preloaded.clone();
        preloaded.insert(id.clone(), view);

        self.snapshot.store(Arc::new(RouteSnapshot {
            table: Arc::clone(&current.table),
            preloaded,
            classifier: current.classifier.clone(),
        }));
        tracing::info!(view = %id, "Preloaded view refreshed");
        Ok(())
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("api", &self.api)
            .field("snapshot", &self.snapshot.load_full())
            .finish()
    }
}

async fn build_snapshot(config: &AppConfig, views: &SharedLoader) -> Result<RouteSnapshot, StartupError> {
    let table = RouteTable::from_config(&config.routes, config.not_found_view.as_deref())?;
    let preloaded = preload(views, &table.eager_views()).await?;

    Ok(RouteSnapshot {
        table: Arc::new(table),
        preloaded,
        classifier: DeviceClassifier::from_config(&config.device),
    })
}
