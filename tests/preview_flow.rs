// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! End-to-end: editor notifications in, websocket events out, link clicks back to the editor.

use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use marksync::browser::BrowserOpener;
use marksync::config::{PreviewConfig, RenderOptions};
use marksync::diagram::{DiagramCache, DiagramError, DiagramFetcher};
use marksync::editor::{
    ContentChange, EditorClient, EditorError, EditorNotification, JsonLinesEditor,
};
use marksync::engine::Engine;
use marksync::model::DocumentUri;
use marksync::preview::{self, BroadcastHub, PreviewEvent};
use marksync::registry::DocumentRegistry;
use marksync::render::MarkdownRenderer;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(5);

struct NoBrowser;

impl BrowserOpener for NoBrowser {
    fn open(&self, _url: &str) -> io::Result<()> {
        Ok(())
    }
}

struct OfflineDiagrams;

#[async_trait]
impl DiagramFetcher for OfflineDiagrams {
    async fn fetch(&self, _payload: &str) -> Result<Vec<u8>, DiagramError> {
        Ok(b"png".to_vec())
    }
}

type ClientSocket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn next_event(socket: &mut ClientSocket) -> PreviewEvent {
    loop {
        let frame = tokio::time::timeout(WAIT, socket.next())
            .await
            .expect("frame in time")
            .expect("stream open")
            .expect("frame");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("event json");
        }
    }
}

fn notification(value: serde_json::Value) -> EditorNotification {
    serde_json::from_value(value).expect("notification")
}

#[tokio::test]
async fn edits_reach_the_browser_and_clicks_reach_the_editor() {
    let workspace = tempfile::tempdir().expect("workspace");
    std::fs::write(workspace.path().join("b.md"), "# B\n").expect("write");
    let a = DocumentUri::from_file_path(&workspace.path().join("a.md"));
    let b = DocumentUri::from_file_path(&workspace.path().join("b.md"));

    let (hub, requests) = BroadcastHub::new(false);
    let server = preview::start(hub.clone(), IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
        .await
        .expect("bind");
    let engine = Arc::new(Engine::new(
        PreviewConfig::default(),
        DocumentRegistry::new(workspace.path()),
        Arc::new(MarkdownRenderer::new(RenderOptions::default())),
        DiagramCache::new(Arc::new(OfflineDiagrams)),
        hub.clone(),
        Arc::new(NoBrowser),
        format!("http://localhost:{}", server.addr().port()),
    ));

    let (editor_out, editor_in) = tokio::io::duplex(4096);
    let editor: Arc<dyn EditorClient> = Arc::new(JsonLinesEditor::new(editor_out));
    let shutdown = CancellationToken::new();
    let request_loop = {
        let engine = engine.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { engine.run_client_requests(requests, editor, shutdown).await })
    };

    let (mut socket, _) =
        tokio_tungstenite::connect_async(format!("ws://{}/ws", server.addr())).await.expect("ws");
    hub.wait_for_clients(WAIT).await.expect("connected");
    assert_eq!(next_event(&mut socket).await, PreviewEvent::Config { enable_tabs: false });

    engine
        .handle_notification(notification(json!({
            "method": "didOpen",
            "params": { "uri": a.as_str(), "text": "# A\n\nSee [b](b.md)." }
        })))
        .await
        .expect("open");
    let PreviewEvent::Update { html, title, .. } = next_event(&mut socket).await else {
        panic!("expected update");
    };
    assert_eq!(title, "a");
    assert!(html.contains(r#"class="internal-link" data-target="/b.md""#));

    engine
        .did_change(a.clone(), &[ContentChange::full("# A\n\nSee [b](b.md) now.")])
        .await
        .expect("change");
    let PreviewEvent::Update { html, .. } = next_event(&mut socket).await else {
        panic!("expected update");
    };
    assert!(html.contains(r#"<p id="marksync-scroll-anchor">"#));

    let click = json!({ "type": "openDocument", "uri": "/b.md", "takeFocus": true, "updatePreview": true });
    socket.send(Message::Text(click.to_string().into())).await.expect("click");

    let mut editor_lines = BufReader::new(editor_in).lines();
    let line = tokio::time::timeout(WAIT, editor_lines.next_line())
        .await
        .expect("editor request in time")
        .expect("read")
        .expect("line");
    let request: serde_json::Value = serde_json::from_str(&line).expect("request json");
    assert_eq!(request["method"], "window/showDocument");
    assert_eq!(request["params"]["uri"], b.as_str());
    assert_eq!(request["params"]["takeFocus"], true);

    let PreviewEvent::Update { html, title, .. } = next_event(&mut socket).await else {
        panic!("expected update");
    };
    assert_eq!(title, "b");
    assert_eq!(html, "<h1>B</h1>\n");

    engine.did_close(b).expect("close");
    engine.did_close(a).expect("close");
    assert_eq!(
        next_event(&mut socket).await,
        PreviewEvent::CloseDocument { document_route: "/b.md".into(), is_last_document: false }
    );
    assert_eq!(
        next_event(&mut socket).await,
        PreviewEvent::CloseDocument { document_route: "/a.md".into(), is_last_document: true }
    );

    shutdown.cancel();
    request_loop.await.expect("request loop");
    server.shutdown(&hub, Duration::from_secs(1)).await;
}
