//! View identifiers, references and the loading capability.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of a view module (e.g. `HomeView`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Ids double as file stems, so only a conservative charset is allowed.
    pub fn is_safe(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !self.0.starts_with('.')
            && !self.0.contains("..")
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ViewId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A loaded, renderable view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewReference {
    id: ViewId,
    markup: Arc<str>,
}

impl ViewReference {
    pub fn new(id: ViewId, markup: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            markup: markup.into(),
        }
    }

    pub fn id(&self) -> &ViewId {
        &self.id
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }
}

/// Errors that can occur while loading a view.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// No module exists for this id.
    #[error("view '{0}' not found")]
    NotFound(ViewId),

    /// Id cannot be mapped to a module safely.
    #[error("invalid view id '{0}'")]
    InvalidId(ViewId),

    /// Reading the module failed.
    #[error("failed to read view '{id}': {source}")]
    Io {
        id: ViewId,
        #[source]
        source: Arc<std::io::Error>,
    },
}

/// Pending view load.
pub type ViewFuture = BoxFuture<'static, Result<ViewReference, LoadError>>;

/// Deferred view loading.
pub trait ViewLoader: Send + Sync + fmt::Debug {
    /// Start loading a view. Nothing happens until the future is polled.
    fn load_view(&self, id: &ViewId) -> ViewFuture;
}

impl<L: ViewLoader + ?Sized> ViewLoader for Arc<L> {
    fn load_view(&self, id: &ViewId) -> ViewFuture {
        (**self).load_view(id)
    }
}

/// Views held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    views: HashMap<ViewId, Arc<str>>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(mut self, id: impl Into<ViewId>, markup: impl Into<Arc<str>>) -> Self {
        self.insert(id, markup);
        self
    }

    pub fn insert(&mut self, id: impl Into<ViewId>, markup: impl Into<Arc<str>>) {
        self.views.insert(id.into(), markup.into());
    }
}

impl ViewLoader for StaticLoader {
    fn load_view(&self, id: &ViewId) -> ViewFuture {
        let result = self
            .views
            .get(id)
            .map(|markup| ViewReference::new(id.clone(), Arc::clone(markup)))
            .ok_or_else(|| LoadError::NotFound(id.clone()));
        future::ready(result).boxed()
    }
}

/// Views read from `<root>/<id>.html`.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &ViewId) -> PathBuf {
        self.root.join(format!("{}.html", id))
    }
}

impl ViewLoader for DirectoryLoader {
    fn load_view(&self, id: &ViewId) -> ViewFuture {
        let id = id.clone();
        if !id.is_safe() {
            return future::ready(Err(LoadError::InvalidId(id))).boxed();
        }
        let path = self.path_for(&id);

        async move {
            tracing::debug!(view = %id, path = %path.display(), "Loading view");
            match tokio::fs::read_to_string(&path).await {
                Ok(markup) => Ok(ViewReference::new(id, markup)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LoadError::NotFound(id)),
                Err(e) => Err(LoadError::Io {
                    id,
                    source: Arc::new(e),
                }),
            }
        }
        .boxed()
    }
}

/// Load every view in `ids`, failing on the first error.
pub async fn preload<L>(loader: &L, ids: &[ViewId]) -> Result<HashMap<ViewId, ViewReference>, LoadError>
where
    L: ViewLoader + ?Sized,
{
    let views = future::try_join_all(ids.iter().map(|id| loader.load_view(id))).await?;
    tracing::debug!(count = views.len(), "Preloaded views");
    Ok(views.into_iter().map(|v| (v.id().clone(), v)).collect())
}
