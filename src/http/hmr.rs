//! Hot-reload notifications.
//!
//! # Data Flow
//! ```text
//! DevWatcher → WatchEvent
//!     → forward_changes (apply to App)
//!     → HmrHub::notify
//!     → every /__hmr websocket
//! ```

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};

use crate::config::watcher::WatchEvent;
use crate::lifecycle::App;

/// Message pushed to connected clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HmrMessage {
    /// Sent once on connect.
    Connected,
    /// A view changed; clients reload the page.
    FullReload { view: String },
    /// The route table was replaced.
    RoutesUpdated,
}

/// Fan-out of hot-reload messages.
#[derive(Debug, Clone)]
pub struct HmrHub {
    tx: broadcast::Sender<HmrMessage>,
}

impl HmrHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HmrMessage> {
        self.tx.subscribe()
    }

    /// Returns the number of clients reached.
    pub fn notify(&self, message: HmrMessage) -> usize {
        self.tx.send(message).unwrap_or(0)
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for HmrHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply watcher events to the app and tell clients about them.
pub async fn forward_changes(app: Arc<App>, hub: HmrHub, mut events: mpsc::UnboundedReceiver<WatchEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            WatchEvent::ConfigReloaded(config) => match app.reload_routes(&config).await {
                Ok(()) => {
                    hub.notify(HmrMessage::RoutesUpdated);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Rejected route reload, keeping current table");
                }
            },
            WatchEvent::ViewChanged(id) => {
                if let Err(e) = app.view_changed(&id).await {
                    tracing::warn!(view = %id, error = %e, "Changed view failed to load");
                }
                let clients = hub.notify(HmrMessage::FullReload { view: id.to_string() });
                tracing::info!(view = %id, clients, "Hot reload sent");
            }
        }
    }
    tracing::debug!("Watch event stream closed");
}

/// Drive one websocket until the client leaves or shutdown fires.
pub async fn serve_socket(
    mut socket: WebSocket,
    mut updates: broadcast::Receiver<HmrMessage>,
    mut shutdown: broadcast::Receiver<()>,
) {
    if send(&mut socket, &HmrMessage::Connected).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(message) => {
                    if send(&mut socket, &message).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "HMR client lagged, forcing reload");
                    let reload = HmrMessage::FullReload { view: String::new() };
                    if send(&mut socket, &reload).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
            _ = shutdown.recv() => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
        }
    }
    tracing::debug!("HMR client disconnected");
}

async fn send(socket: &mut WebSocket, message: &HmrMessage) -> Result<(), axum::Error> {
    let text = serde_json::to_string(message).unwrap_or_default();
    socket.send(Message::Text(text.into())).await
}

/// Script appended to served pages so they reload on change.
pub fn client_script(url: &str) -> String {
    format!(
        "<script type=\"module\">\
const ws = new WebSocket({url:?});\
ws.addEventListener(\"message\", (e) => {{ const m = JSON.parse(e.data); \
if (m.type === \"full-reload\" || m.type === \"routes-updated\") location.reload(); }});\
</script>"
    )
}
