// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Marksync CLI entrypoint.
//!
//! Serves the preview at `http://localhost:<port>/`, reads editor notifications from stdin
//! (one JSON object per line) and writes `window/showDocument` requests to stdout. Logs go
//! to stderr, filtered by `MARKSYNC_LOG`.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use marksync::browser::SystemBrowser;
use marksync::config::{
    DiagramServerConfig, PreviewConfig, RenderOptions, DEFAULT_PLANTUML_PATH,
    DEFAULT_PLANTUML_SERVER,
};
use marksync::diagram::{DiagramCache, PlantUmlClient};
use marksync::editor::{EditorClient, EditorNotification, JsonLinesEditor};
use marksync::engine::Engine;
use marksync::model::DocumentUri;
use marksync::preview::{self, BroadcastHub, SHUTDOWN_GRACE};
use marksync::registry::{load_document, DocumentRegistry};
use marksync::render::MarkdownRenderer;

const LOG_ENV: &str = "MARKSYNC_LOG";

#[derive(Debug, Parser)]
#[command(name = "marksync", version)]
#[command(about = "Live markdown preview kept in sync with your editor")]
struct Cli {
    /// Workspace root; links and preview routes are relative to it. Defaults to the
    /// current directory.
    #[arg(value_name = "WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Documents to open right away.
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Preview port (0 picks a free one).
    #[arg(long, default_value_t = 0)]
    port: u16,

    /// Browser program used instead of the system default.
    #[arg(long, value_name = "CMD")]
    browser: Option<String>,

    /// One browser tab per document.
    #[arg(long)]
    enable_tabs: bool,

    /// Do not open the browser until the `open-preview` command runs.
    #[arg(long)]
    no_auto: bool,

    #[arg(long, value_name = "HOST", default_value = DEFAULT_PLANTUML_SERVER)]
    plantuml_server: String,

    #[arg(long, value_name = "PATH", default_value = DEFAULT_PLANTUML_PATH)]
    plantuml_path: String,

    /// Talk plain http to the PlantUML server.
    #[arg(long)]
    plantuml_disable_tls: bool,

    #[arg(long)]
    enable_footnotes: bool,

    #[arg(long)]
    enable_wikilinks: bool,

    /// Turn `:shortcode:` names into emoji.
    #[arg(long)]
    enable_emoji: bool,
}

impl Cli {
    fn preview_config(&self) -> PreviewConfig {
        PreviewConfig {
            enable_tabs: self.enable_tabs,
            auto_open: !self.no_auto,
            browser: self.browser.clone(),
            port: self.port,
            ..PreviewConfig::default()
        }
    }

    fn diagram_config(&self) -> DiagramServerConfig {
        DiagramServerConfig {
            server: self.plantuml_server.clone(),
            base_path: self.plantuml_path.clone(),
            disable_tls: self.plantuml_disable_tls,
            ..DiagramServerConfig::default()
        }
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            footnotes: self.enable_footnotes,
            wikilinks: self.enable_wikilinks,
            emoji: self.enable_emoji,
        }
    }
}

fn init_tracing() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| -> Box<dyn Error> { err })
}

fn main() {
    let cli = Cli::parse();

    let result = (|| -> Result<(), Box<dyn Error>> {
        init_tracing()?;
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        runtime.block_on(run(cli))
    })();

    if let Err(err) = result {
        eprintln!("marksync: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let cwd = std::env::current_dir()?;
    let workspace = cli.workspace.as_ref().map_or_else(|| cwd.clone(), |path| cwd.join(path));
    let config = cli.preview_config();

    let (hub, requests) = BroadcastHub::new(config.enable_tabs);
    let server = preview::start(hub.clone(), config.host, config.port).await?;
    let base_url = format!("http://localhost:{}", server.addr().port());
    tracing::info!(workspace = %workspace.display(), url = %base_url, "marksync ready");

    let fetcher = PlantUmlClient::new(&cli.diagram_config())?;
    let engine = Arc::new(Engine::new(
        config.clone(),
        DocumentRegistry::new(&workspace),
        Arc::new(MarkdownRenderer::new(cli.render_options())),
        DiagramCache::new(Arc::new(fetcher)),
        hub.clone(),
        Arc::new(SystemBrowser::new(config.browser.clone())),
        base_url,
    ));

    let editor: Arc<dyn EditorClient> = Arc::new(JsonLinesEditor::new(tokio::io::stdout()));
    let shutdown = CancellationToken::new();
    let request_loop = {
        let engine = engine.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { engine.run_client_requests(requests, editor, shutdown).await })
    };

    for file in &cli.files {
        let uri = DocumentUri::from_file_path(&cwd.join(file));
        let opened = match load_document(&uri) {
            Ok(text) => engine.did_open(uri, text).await.map_err(Box::<dyn Error>::from),
            Err(err) => Err(err.into()),
        };
        if let Err(err) = opened {
            tracing::warn!(file = %file.display(), error = %err, "could not open file");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => handle_line(&engine, &line).await,
                None => {
                    tracing::info!("editor closed the notification stream");
                    break;
                }
            },
            signal = &mut ctrl_c => {
                signal?;
                tracing::info!("interrupted");
                break;
            }
        }
    }

    shutdown.cancel();
    let _ = request_loop.await;
    server.shutdown(&hub, SHUTDOWN_GRACE).await;
    Ok(())
}

async fn handle_line(engine: &Engine, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match serde_json::from_str::<EditorNotification>(line) {
        Ok(notification) => {
            if let Err(err) = engine.handle_notification(notification).await {
                tracing::warn!(error = %err, "notification failed");
            }
        }
        Err(err) => tracing::warn!(error = %err, "ignoring malformed notification"),
    }
}
