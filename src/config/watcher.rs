//! File watcher for hot reload of the route config and view modules.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::{AppConfig, WatchConfig};
use crate::views::ViewId;

/// Change observed by the watcher.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// Config file changed and the new version validated.
    ConfigReloaded(Box<AppConfig>),
    /// A view module file changed.
    ViewChanged(ViewId),
}

/// What a changed path refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChangeKind {
    Config,
    View(ViewId),
    Other,
}

/// Watches the config file and the views directory.
pub struct DevWatcher {
    config_path: Option<PathBuf>,
    views_dir: PathBuf,
    settings: WatchConfig,
    update_tx: mpsc::UnboundedSender<WatchEvent>,
}

impl DevWatcher {
    /// Create a new watcher.
    ///
    /// Returns the watcher and a receiver for change events.
    pub fn new(
        config_path: Option<&Path>,
        views_dir: &Path,
        settings: WatchConfig,
    ) -> (Self, mpsc::UnboundedReceiver<WatchEvent>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                config_path: config_path.map(Path::to_path_buf),
                views_dir: views_dir.to_path_buf(),
                settings,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<Box<dyn Watcher>, notify::Error> {
        let tx = self.update_tx.clone();
        let config_path = self.config_path.clone();
        let views_dir = self.views_dir.clone();

        let handler = move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !(event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()) {
                    return;
                }
                for path in &event.paths {
                    match classify_change(path, config_path.as_deref(), &views_dir) {
                        ChangeKind::Config => {
                            let Some(config_path) = config_path.as_deref() else { continue };
                            tracing::info!("Config file change detected, reloading...");
                            match load_config(config_path) {
                                Ok(new_config) => {
                                    let _ = tx.send(WatchEvent::ConfigReloaded(Box::new(new_config)));
                                }
                                Err(e) => {
                                    tracing::error!("Failed to reload config: {}. Keeping current configuration.", e);
                                }
                            }
                        }
                        ChangeKind::View(id) => {
                            tracing::debug!(view = %id, "View module changed");
                            let _ = tx.send(WatchEvent::ViewChanged(id));
                        }
                        ChangeKind::Other => {}
                    }
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        };

        let notify_config =
            Config::default().with_poll_interval(Duration::from_millis(self.settings.interval_ms));

        let mut watcher: Box<dyn Watcher> = if self.settings.use_polling {
            Box::new(PollWatcher::new(handler, notify_config)?)
        } else {
            Box::new(RecommendedWatcher::new(handler, notify_config)?)
        };

        if let Some(path) = &self.config_path {
            watcher.watch(path, RecursiveMode::NonRecursive)?;
        }
        if self.views_dir.exists() {
            watcher.watch(&self.views_dir, RecursiveMode::NonRecursive)?;
        } else {
            tracing::warn!(dir = %self.views_dir.display(), "Views directory missing, not watching it");
        }

        tracing::info!(
            config = ?self.config_path,
            views = %self.views_dir.display(),
            polling = self.settings.use_polling,
            interval_ms = self.settings.interval_ms,
            "File watcher started"
        );
        Ok(watcher)
    }
}

fn classify_change(path: &Path, config_path: Option<&Path>, views_dir: &Path) -> ChangeKind {
    if config_path.is_some_and(|config_path| same_path(path, config_path)) {
        return ChangeKind::Config;
    }

    // `DirectoryLoader` only reads `<views_dir>/<id>.html`.
    let directly_in_views = path.parent().is_some_and(|parent| same_path(parent, views_dir));
    if directly_in_views && path.extension().is_some_and(|ext| ext == "html") {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            return ChangeKind::View(ViewId::new(stem));
        }
    }

    ChangeKind::Other
}

/// Path equality, falling back to canonical forms when both exist.
fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_change() {
        let config = Path::new("/app/router.toml");
        let views = Path::new("/app/views");

        assert_eq!(classify_change(Path::new("/app/router.toml"), Some(config), views), ChangeKind::Config);
        assert_eq!(
            classify_change(Path::new("/app/views/DonateView.html"), Some(config), views),
            ChangeKind::View(ViewId::new("DonateView"))
        );
        assert_eq!(classify_change(Path::new("/app/views/notes.txt"), Some(config), views), ChangeKind::Other);
        assert_eq!(classify_change(Path::new("/app/other.html"), None, views), ChangeKind::Other);
    }

    #[test]
    fn test_classify_change_is_exact() {
        let config = Path::new("/app/router.toml");
        let views = Path::new("/app/views");

        // Same file name elsewhere is not the config.
        assert_eq!(
            classify_change(Path::new("/app/views/router.toml"), Some(config), views),
            ChangeKind::Other
        );
        // Nested files are never loaded as views.
        assert_eq!(
            classify_change(Path::new("/app/views/sub/HomeView.html"), Some(config), views),
            ChangeKind::Other
        );
        // A sibling directory with the same name is not the views dir.
        assert_eq!(
            classify_change(Path::new("/other/views/HomeView.html"), Some(config), views),
            ChangeKind::Other
        );
    }

    #[tokio::test]
    async fn test_polling_watcher_reports_view_change() {
        let dir = tempfile::tempdir().unwrap();
        let views = dir.path().join("views");
        std::fs::create_dir(&views).unwrap();
        std::fs::write(views.join("HomeView.html"), "<p>v1</p>").unwrap();

        let settings = WatchConfig { use_polling: true, interval_ms: 50 };
        let (watcher, mut rx) = DevWatcher::new(None, &views, settings);
        let _handle = watcher.run().unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        std::fs::write(views.join("TipView.html"), "<p>new</p>").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no watch event")
            .unwrap();
        match event {
            WatchEvent::ViewChanged(id) => assert_eq!(id.as_str(), "TipView"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
