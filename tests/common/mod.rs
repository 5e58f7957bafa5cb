//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use view_router::config::{AppConfig, EnvVars};
use view_router::http::{DevServer, HmrHub};
use view_router::lifecycle::{App, Shutdown};

pub const IPHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
pub const DESKTOP_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/126.0 Safari/537.36";

/// Running dev server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub app: Arc<App>,
    pub hub: HmrHub,
    pub shutdown: Shutdown,
    pub views: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/__hmr", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Write one `<id>.html` per view into a fresh directory.
pub fn write_views(views: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (id, markup) in views {
        std::fs::write(dir.path().join(format!("{}.html", id)), markup).unwrap();
    }
    dir
}

pub fn default_views() -> TempDir {
    write_views(&[
        ("HomeView", "<h1>Home</h1>"),
        ("MobileHomeView", "<h1>Mobile Home</h1>"),
        ("DonateView", "<h1>Donate</h1>"),
    ])
}

/// Start a dev server over `views` with the given config.
pub async fn start_dev_server_with(mut config: AppConfig, views: TempDir) -> TestServer {
    config.views.dir = views.path().to_string_lossy().into_owned();

    let app = Arc::new(App::from_config(config, &EnvVars::default()).await.unwrap());
    let hub = HmrHub::new();
    let shutdown = Shutdown::new();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = DevServer::new(Arc::clone(&app), hub.clone(), shutdown.clone(), addr);
    let signal = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, None, signal).await;
    });

    TestServer {
        addr,
        app,
        hub,
        shutdown,
        views,
    }
}

pub async fn start_dev_server() -> TestServer {
    start_dev_server_with(AppConfig::default(), default_views()).await
}

/// Start a programmable mock API.
///
/// `f` receives the raw request head and body and returns status and JSON body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let request = String::from_utf8_lossy(&buf[..n]).into_owned();

                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            201 => "201 Created",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
