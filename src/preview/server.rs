// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::model::has_markdown_extension;

use super::hub::{BroadcastHub, OutboundMessage};

const INDEX_HTML: &str = include_str!("assets/index.html");
const PREVIEW_JS: &str = include_str!("assets/preview.js");
const STYLES_CSS: &str = include_str!("assets/styles.css");

/// Pause before the config message so the page can finish wiring its handlers.
pub const CONFIG_DELAY: Duration = Duration::from_millis(100);

/// How long shutdown waits for in-flight connections before aborting the server task.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub fn router(hub: Arc<BroadcastHub>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(websocket))
        .route("/preview.js", get(script))
        .route("/styles.css", get(styles))
        .fallback(document_page)
        .with_state(hub)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript; charset=utf-8")], PREVIEW_JS)
}

async fn styles() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLES_CSS)
}

/// Multi-tab pages live at the document's workspace route.
async fn document_page(uri: Uri) -> Response {
    if has_markdown_extension(Path::new(uri.path())) {
        Html(INDEX_HTML).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn websocket(ws: WebSocketUpgrade, State(hub): State<Arc<BroadcastHub>>) -> Response {
    ws.on_upgrade(move |socket| client_session(socket, hub))
}

async fn client_session(socket: WebSocket, hub: Arc<BroadcastHub>) {
    let config = match hub.config_message() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "failed to encode config message");
            return;
        }
    };

    let (mut sink, mut stream) = socket.split();
    let (sender, mut queue) = mpsc::unbounded_channel::<OutboundMessage>();
    let id = hub.add_client(sender);

    let writer = tokio::spawn(async move {
        tokio::time::sleep(CONFIG_DELAY).await;
        if sink.send(Message::Text(config.to_string().into())).await.is_err() {
            return;
        }
        while let Some(message) = queue.recv().await {
            if let Err(err) = sink.send(Message::Text(message.to_string().into())).await {
                tracing::debug!(client = id, error = %err, "preview client write failed");
                return;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Err(err) = hub.handle_client_message(text.as_str()) {
                    tracing::warn!(client = id, error = %err, "ignoring preview client message");
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(client = id, error = %err, "preview client read failed");
                break;
            }
        }
    }

    hub.remove_client(id);
    let _ = writer.await;
}

/// A running preview endpoint.
#[derive(Debug)]
pub struct PreviewServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// Binds `host:port` (port `0` picks a free one) and serves the preview in the background.
pub async fn start(
    hub: Arc<BroadcastHub>,
    host: IpAddr,
    port: u16,
) -> Result<PreviewServer, std::io::Error> {
    let listener = TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;
    let shutdown = CancellationToken::new();

    let server_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move {
        let serve = axum::serve(listener, router(hub)).with_graceful_shutdown(async move {
            server_shutdown.cancelled().await;
        });
        if let Err(err) = serve.await {
            tracing::error!(error = %err, "preview server error");
        }
    });

    tracing::info!(%addr, "preview server listening");
    Ok(PreviewServer { addr, shutdown, handle })
}

impl PreviewServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Browser URL for a route such as `/` or `/docs/a.md`.
    pub fn url(&self, route: &str) -> String {
        let route = if route.starts_with('/') { route.to_owned() } else { format!("/{route}") };
        format!("http://{}{route}", self.addr)
    }

    /// Stops accepting connections, closes client queues and waits up to `grace` for the
    /// server task before aborting it.
    pub async fn shutdown(self, hub: &BroadcastHub, grace: Duration) {
        self.shutdown.cancel();
        hub.disconnect_all();

        let abort = self.handle.abort_handle();
        if tokio::time::timeout(grace, self.handle).await.is_err() {
            tracing::warn!(?grace, "preview server did not stop in time; aborting");
            abort.abort();
        }
        tracing::info!("preview server stopped");
    }
}
