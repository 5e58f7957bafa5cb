//! End-to-end tests against a running dev server.

use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_tungstenite::connect_async;

use view_router::config::{AppConfig, EnvVars, RouteConfig};
use view_router::http::{DevServer, HmrHub, HmrMessage};
use view_router::lifecycle::{App, Shutdown};
use view_router::views::ViewId;

mod common;

use common::{DESKTOP_UA, IPHONE_UA};

async fn get_page(url: &str, ua: &str, width: Option<u32>) -> reqwest::Response {
    let client = reqwest::Client::new();
    let mut request = client.get(url).header(USER_AGENT, ua);
    if let Some(width) = width {
        request = request.header("sec-ch-viewport-width", width.to_string());
    }
    request.send().await.unwrap()
}

fn header<'a>(res: &'a reqwest::Response, name: &str) -> &'a str {
    res.headers().get(name).and_then(|v| v.to_str().ok()).unwrap_or("")
}

#[tokio::test]
async fn test_phone_gets_mobile_home() {
    let server = common::start_dev_server().await;

    let res = get_page(&server.url("/"), IPHONE_UA, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header(&res, "x-route-name"), "home");
    assert_eq!(header(&res, "x-device-class"), "mobile");
    let body = res.text().await.unwrap();
    assert!(body.contains("<h1>Mobile Home</h1>"));
}

#[tokio::test]
async fn test_pages_point_hmr_at_bound_port() {
    let server = common::start_dev_server().await;
    let expected = format!("ws://localhost:{}/__hmr", server.addr.port());

    let body = get_page(&server.url("/"), DESKTOP_UA, None).await.text().await.unwrap();
    assert!(body.contains(&format!("{:?}", expected)));

    let json: Value = reqwest::get(server.url("/__routes")).await.unwrap().json().await.unwrap();
    assert_eq!(json["hmr"], expected.as_str());
}

#[tokio::test]
async fn test_separate_hmr_port_serves_websocket() {
    let hmr_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let hmr_port = hmr_listener.local_addr().unwrap().port();

    let mut config = AppConfig::default();
    config.dev_server.hmr.host = "127.0.0.1".into();
    config.dev_server.hmr.port = hmr_port;
    let views = common::default_views();
    config.views.dir = views.path().to_string_lossy().into_owned();

    let app = Arc::new(App::from_config(config, &EnvVars::default()).await.unwrap());
    let hub = HmrHub::new();
    let shutdown = Shutdown::new();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = DevServer::new(app, hub.clone(), shutdown.clone(), addr);
    let expected = format!("ws://127.0.0.1:{}/__hmr", hmr_port);
    assert_eq!(server.hmr_url(), expected);
    tokio::spawn(server.run(listener, Some(hmr_listener), shutdown.clone()));

    let (mut socket, _) = connect_async(expected.as_str()).await.unwrap();
    let hello = socket.next().await.unwrap().unwrap();
    assert!(hello.to_text().unwrap().contains("connected"));

    hub.notify(HmrMessage::RoutesUpdated);
    let update = socket.next().await.unwrap().unwrap();
    assert!(update.to_text().unwrap().contains("routes-updated"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_narrow_desktop_browser_gets_mobile_home() {
    let server = common::start_dev_server().await;

    let res = get_page(&server.url("/"), DESKTOP_UA, Some(768)).await;
    assert_eq!(header(&res, "x-device-class"), "mobile");
    assert!(res.text().await.unwrap().contains("<h1>Mobile Home</h1>"));

    let res = get_page(&server.url("/"), DESKTOP_UA, Some(769)).await;
    assert_eq!(header(&res, "x-device-class"), "desktop");
    assert!(res.text().await.unwrap().contains("<h1>Home</h1>"));
}

#[tokio::test]
async fn test_desktop_gets_home() {
    let server = common::start_dev_server().await;

    let res = get_page(&server.url("/"), DESKTOP_UA, Some(1440)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header(&res, "x-device-class"), "desktop");
    assert!(res.text().await.unwrap().contains("<h1>Home</h1>"));
}

#[tokio::test]
async fn test_donate_is_same_for_every_device() {
    let server = common::start_dev_server().await;

    for (ua, width) in [(IPHONE_UA, Some(390)), (DESKTOP_UA, Some(1920))] {
        let res = get_page(&server.url("/donate?amount=5"), ua, width).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(header(&res, "x-route-name"), "donate");
        assert!(res.text().await.unwrap().contains("<h1>Donate</h1>"));
    }
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let server = common::start_dev_server().await;

    let res = get_page(&server.url("/nope"), DESKTOP_UA, None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.headers().get("x-route-name").is_none());

    // Prefixes are not matches.
    let res = get_page(&server.url("/donate/extra"), DESKTOP_UA, None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_lazy_view_is_server_error() {
    let views = common::write_views(&[("HomeView", "home"), ("MobileHomeView", "mobile")]);
    let server = common::start_dev_server_with(AppConfig::default(), views).await;

    let res = get_page(&server.url("/donate"), DESKTOP_UA, None).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Eager routes are unaffected.
    let res = get_page(&server.url("/"), DESKTOP_UA, None).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_route_listing() {
    let server = common::start_dev_server().await;

    let json: Value = reqwest::get(server.url("/__routes")).await.unwrap().json().await.unwrap();
    let routes = json["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0]["path"], "/");
    assert_eq!(routes[0]["mobile_view"], "MobileHomeView");
    assert_eq!(routes[1]["name"], "donate");
    assert_eq!(routes[1]["lazy"], true);
}

#[tokio::test]
async fn test_reload_replaces_routes() {
    let views = common::write_views(&[
        ("HomeView", "home"),
        ("MobileHomeView", "mobile"),
        ("TipView", "tip"),
    ]);
    let server = common::start_dev_server_with(AppConfig::default(), views).await;

    let mut config = AppConfig::default();
    config.views.dir = server.views.path().to_string_lossy().into_owned();
    config.routes[1] = RouteConfig {
        path: "/tip".into(),
        name: "tip".into(),
        view: "TipView".into(),
        mobile_view: None,
        lazy: true,
    };
    server.app.reload_routes(&config).await.unwrap();

    let res = get_page(&server.url("/tip"), DESKTOP_UA, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header(&res, "x-route-name"), "tip");

    let res = get_page(&server.url("/donate"), DESKTOP_UA, None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_changed_view_is_served_fresh() {
    let server = common::start_dev_server().await;

    let res = get_page(&server.url("/donate"), DESKTOP_UA, None).await;
    assert!(res.text().await.unwrap().contains("<h1>Donate</h1>"));

    std::fs::write(server.views.path().join("DonateView.html"), "<h1>Give</h1>").unwrap();
    server.app.view_changed(&ViewId::new("DonateView")).await.unwrap();

    let res = get_page(&server.url("/donate"), DESKTOP_UA, None).await;
    assert!(res.text().await.unwrap().contains("<h1>Give</h1>"));
}

#[tokio::test]
async fn test_hmr_socket_receives_reloads() {
    let server = common::start_dev_server().await;

    let (mut socket, _) = connect_async(server.ws_url()).await.unwrap();

    let hello = socket.next().await.unwrap().unwrap();
    let hello: Value = serde_json::from_str(hello.to_text().unwrap()).unwrap();
    assert_eq!(hello["type"], "connected");

    assert_eq!(
        server.hub.notify(HmrMessage::FullReload { view: "HomeView".into() }),
        1
    );
    let update = socket.next().await.unwrap().unwrap();
    let update: Value = serde_json::from_str(update.to_text().unwrap()).unwrap();
    assert_eq!(update["type"], "full-reload");
    assert_eq!(update["view"], "HomeView");
}

#[tokio::test]
async fn test_shutdown_closes_hmr_socket() {
    let server = common::start_dev_server().await;

    let (mut socket, _) = connect_async(server.ws_url()).await.unwrap();
    let _connected = socket.next().await.unwrap().unwrap();

    server.shutdown.trigger();
    let closed = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while let Some(Ok(message)) = socket.next().await {
            if message.is_close() {
                return true;
            }
        }
        true
    })
    .await
    .unwrap();
    assert!(closed);
}
