//! Device-aware view router dev server.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────┐
//!                         │                  DEV SERVER                   │
//!                         │                                               │
//!     Page Request        │  ┌─────────┐    ┌────────────┐    ┌────────┐  │
//!     ────────────────────┼─▶│  http   │───▶│   device   │───▶│routing │  │
//!                         │  │ server  │    │ classifier │    │ router │  │
//!                         │  └─────────┘    └────────────┘    └───┬────┘  │
//!                         │                                       │       │
//!                         │                                       ▼       │
//!     HTML Response       │  ┌─────────┐                     ┌────────┐   │
//!     ◀───────────────────┼──│  page   │◀────────────────────│ views  │   │
//!                         │  │+hmr tag │                     │ cache  │   │
//!                         │  └─────────┘                     └────────┘   │
//!                         │                                               │
//!                         │  config (toml, .env) · watcher → hmr socket   │
//!                         │  lifecycle (startup/shutdown) · observability │
//!                         └───────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;

use view_router::config::env::load_env;
use view_router::config::loader::load_config;
use view_router::config::watcher::DevWatcher;
use view_router::config::AppConfig;
use view_router::http::{bind_hmr_listener, bind_listener, hmr, DevServer, HmrHub};
use view_router::lifecycle::{signals, App, Shutdown};
use view_router::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "view-router")]
#[command(about = "Dev server for the device-aware view router", long_about = None)]
struct Args {
    /// Route and server config (TOML). Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Selects `.env.<mode>` files.
    #[arg(short, long, default_value = "development")]
    mode: String,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Disable file watching and hot reload.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(host) = args.host.clone() {
        config.dev_server.host = host;
    }
    if let Some(port) = args.port {
        config.dev_server.set_port(port);
    }

    logging::init(&config.observability);
    tracing::info!(mode = %args.mode, "view-router v{} starting", env!("CARGO_PKG_VERSION"));

    let env_dir = args
        .config
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let env = load_env(&env_dir, &args.mode);

    tracing::info!(
        routes = config.routes.len(),
        views_dir = %config.views.dir,
        env_vars = env.len(),
        "Configuration loaded"
    );

    let views_dir = PathBuf::from(&config.views.dir);
    let watch = config.dev_server.watch.clone();
    let listener = bind_listener(&config.dev_server).await?;
    let hmr_listener = bind_hmr_listener(&config.dev_server).await?;
    let bound = listener.local_addr()?;
    let app = Arc::new(App::from_config(config, &env).await?);

    let shutdown = Shutdown::new();
    let hub = HmrHub::new();

    // Keep the watcher alive for the life of the server.
    let _watcher = if args.no_watch {
        None
    } else {
        let (watcher, events) = DevWatcher::new(args.config.as_deref(), &views_dir, watch);
        let handle = watcher.run()?;
        tokio::spawn(hmr::forward_changes(Arc::clone(&app), hub.clone(), events));
        Some(handle)
    };

    tokio::spawn(signals::trigger_on_signal(shutdown.clone()));

    let server = DevServer::new(app, hub, shutdown.clone(), bound);
    server.run(listener, hmr_listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
