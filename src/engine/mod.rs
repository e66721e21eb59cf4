// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editor events in, preview updates out.
//!
//! Every render pass runs the same pipeline: parse, mark the scroll anchor, embed local
//! images, write HTML with internal links tagged, swap in diagrams, store the result in the
//! registry, push it to the hub. Browser requests travel the other way, from the hub's request channel to the editor.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::browser::BrowserOpener;
use crate::config::PreviewConfig;
use crate::diagram::DiagramCache;
use crate::editor::{ContentChange, EditorClient, EditorError, EditorNotification};
use crate::links::LinkResolver;
use crate::model::{DiagramCacheEntry, DocumentState, DocumentUri, RenderOutput};
use crate::preview::{BroadcastHub, ClientRequest, HubError};
use crate::registry::{load_document, DocumentError, DocumentRegistry};
use crate::render::{write_html, ImageInliner, ParsedDocument, Renderer};
use crate::scroll::ScrollAnchorDiffer;

/// Editor command that opens the preview on demand.
pub const OPEN_PREVIEW_COMMAND: &str = "open-preview";

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Hub(#[from] HubError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("failed to open browser at {url}: {source}")]
    Browser { url: String, source: std::io::Error },
    #[error("no preview client connected within {timeout:?}")]
    ClientTimeout { timeout: Duration },
    #[error("unknown command {command:?}")]
    UnknownCommand { command: String },
}

/// How long to wait for a browser to connect after opening it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientWaits {
    /// Single-page auto-open on `didOpen`. Expiry is not an error.
    pub auto_open: Duration,
    /// The `open-preview` command. Expiry is [`EngineError::ClientTimeout`].
    pub open_preview: Duration,
}

impl Default for ClientWaits {
    fn default() -> Self {
        Self { auto_open: Duration::from_secs(2), open_preview: Duration::from_secs(10) }
    }
}

pub struct Engine {
    config: PreviewConfig,
    base_url: String,
    waits: ClientWaits,
    registry: DocumentRegistry,
    renderer: Arc<dyn Renderer>,
    differ: ScrollAnchorDiffer,
    links: LinkResolver,
    images: ImageInliner,
    diagrams: DiagramCache,
    hub: Arc<BroadcastHub>,
    browser: Arc<dyn BrowserOpener>,
    focused: Mutex<Option<DocumentUri>>,
}

impl Engine {
    /// `base_url` is the preview origin, e.g. `http://localhost:8123`.
    pub fn new(
        config: PreviewConfig,
        registry: DocumentRegistry,
        renderer: Arc<dyn Renderer>,
        diagrams: DiagramCache,
        hub: Arc<BroadcastHub>,
        browser: Arc<dyn BrowserOpener>,
        base_url: impl Into<String>,
    ) -> Self {
        let links = LinkResolver::new(registry.workspace_root());
        let images = ImageInliner::new(registry.workspace_root());
        Self {
            config,
            base_url: base_url.into(),
            waits: ClientWaits::default(),
            registry,
            renderer,
            differ: ScrollAnchorDiffer::new(),
            links,
            images,
            diagrams,
            hub,
            browser,
            focused: Mutex::new(None),
        }
    }

    pub fn with_client_waits(mut self, waits: ClientWaits) -> Self {
        self.waits = waits;
        self
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    pub fn focused(&self) -> Option<DocumentUri> {
        self.focused.lock().clone()
    }

    pub async fn handle_notification(
        &self,
        notification: EditorNotification,
    ) -> Result<(), EngineError> {
        match notification {
            EditorNotification::DidOpen { uri, text } => self.did_open(uri, text).await,
            EditorNotification::DidChange { uri, content_changes } => {
                self.did_change(uri, &content_changes).await
            }
            EditorNotification::DidSave { uri, text } => self.did_save(uri, text).await,
            EditorNotification::DidClose { uri } => self.did_close(uri),
            EditorNotification::DidChangeFocus { uri } => self.did_change_focus(uri).await,
            EditorNotification::ExecuteCommand { command } => self.execute_command(&command).await,
        }
    }

    pub async fn did_open(&self, uri: DocumentUri, text: String) -> Result<(), EngineError> {
        if !uri.is_markdown() {
            return Ok(());
        }
        tracing::info!(%uri, "document opened");

        let output = self.render(&uri, &text, true, &[]).await;
        self.registry.register(uri.clone(), DocumentState::new(uri.clone(), text).with_render(output));
        self.set_focused(&uri);

        if !self.should_auto_open() {
            return Ok(());
        }

        if self.config.enable_tabs {
            let route = self.route_of(&uri);
            if let Err(err) = self.open_browser(&route) {
                tracing::warn!(error = %err, "auto-open failed");
            }
            return Ok(());
        }

        if self.hub.client_count() == 0 {
            if let Err(err) = self.open_browser("/") {
                tracing::warn!(error = %err, "auto-open failed");
            }
            if let Err(err) = self.hub.wait_for_clients(self.waits.auto_open).await {
                tracing::debug!(error = %err, "preview not connected yet; skipping first push");
                return Ok(());
            }
        }
        self.push_document(&uri)
    }

    /// Applies editor edits; a document the registry has never seen is first loaded from disk.
    pub async fn did_change(
        &self,
        uri: DocumentUri,
        changes: &[ContentChange],
    ) -> Result<(), EngineError> {
        if !uri.is_markdown() {
            return Ok(());
        }
        self.ensure_loaded(&uri)?;
        if self.registry.apply_changes(&uri, changes).is_none() {
            return Ok(());
        }
        self.set_focused(&uri);

        if self.refresh(&uri, false).await {
            self.push_document(&uri)?;
        }
        Ok(())
    }

    /// Re-renders with diagram generation, using `text` when the editor sent it and the
    /// file on disk otherwise.
    pub async fn did_save(&self, uri: DocumentUri, text: Option<String>) -> Result<(), EngineError> {
        if !uri.is_markdown() {
            return Ok(());
        }
        let text = match text {
            Some(text) => text,
            None => load_document(&uri)?,
        };
        if !self.registry.update_content(&uri, text.as_str()) {
            self.registry.register(uri.clone(), DocumentState::new(uri.clone(), text));
        }

        if self.refresh(&uri, true).await {
            self.push_document(&uri)?;
        }
        Ok(())
    }

    pub fn did_close(&self, uri: DocumentUri) -> Result<(), EngineError> {
        if !uri.is_markdown() {
            return Ok(());
        }
        let route = self.route_of(&uri);
        match self.registry.remove(&uri) {
            Some(_) => tracing::info!(%uri, remaining = self.registry.len(), "document closed"),
            None => tracing::debug!(%uri, "close for a document that was not open"),
        }
        self.differ.forget(uri.as_str());
        {
            let mut focused = self.focused.lock();
            if focused.as_ref() == Some(&uri) {
                *focused = None;
            }
        }

        self.hub.push_close(&route, self.registry.is_empty())?;
        Ok(())
    }

    /// Switches the single shared page to the newly focused document.
    pub async fn did_change_focus(&self, uri: DocumentUri) -> Result<(), EngineError> {
        if !uri.is_markdown() || self.focused().as_ref() == Some(&uri) {
            return Ok(());
        }
        self.set_focused(&uri);
        if self.config.enable_tabs || !self.should_auto_open() {
            return Ok(());
        }

        self.ensure_loaded(&uri)?;
        if self.refresh(&uri, true).await {
            self.push_document(&uri)?;
        }
        Ok(())
    }

    pub async fn execute_command(&self, command: &str) -> Result<(), EngineError> {
        match command {
            OPEN_PREVIEW_COMMAND => self.open_preview().await,
            other => Err(EngineError::UnknownCommand { command: other.to_owned() }),
        }
    }

    async fn open_preview(&self) -> Result<(), EngineError> {
        let recent = self.registry.most_recent();
        let route = recent.as_ref().map_or_else(|| "/".to_owned(), |state| self.route_of(&state.uri));

        self.open_browser(&route)?;
        let timeout = self.waits.open_preview;
        self.hub.wait_for_clients(timeout).await.map_err(|err| match err {
            HubError::Timeout { timeout } => EngineError::ClientTimeout { timeout },
            other => EngineError::Hub(other),
        })?;
        self.registry.mark_first_preview_shown();

        if let Some(state) = recent {
            self.push_state(&state)?;
        }
        Ok(())
    }

    /// Serves one request from a preview page.
    pub async fn handle_client_request(
        &self,
        request: ClientRequest,
        editor: &dyn EditorClient,
    ) -> Result<(), EngineError> {
        match request {
            ClientRequest::OpenDocument { route, take_focus, refresh_preview } => {
                let uri = self.registry.resolve_uri(without_fragment(&route));
                if !uri.is_markdown() {
                    tracing::debug!(route, "ignoring open request for a non-markdown file");
                    return Ok(());
                }
                if !editor.show_document(&uri, take_focus).await? {
                    tracing::warn!(%uri, "editor declined to show document");
                    return Ok(());
                }
                self.registry.mark_first_preview_shown();

                if refresh_preview && !self.config.enable_tabs {
                    self.ensure_loaded(&uri)?;
                    self.set_focused(&uri);
                    if self.refresh(&uri, true).await {
                        self.push_document(&uri)?;
                    }
                }
                Ok(())
            }
            ClientRequest::SyncDocument { route } => {
                let uri = self.registry.resolve_uri(without_fragment(&route));
                if !uri.is_markdown() {
                    tracing::debug!(route, "ignoring sync request for a non-markdown file");
                    return Ok(());
                }
                match self.registry.get(&uri) {
                    Some(state) => self.push_state(&state),
                    None => {
                        tracing::debug!(route, "sync requested for a document that is not open");
                        Ok(())
                    }
                }
            }
        }
    }

    /// Drains browser requests until the channel closes or `shutdown` fires.
    pub async fn run_client_requests(
        &self,
        mut requests: mpsc::UnboundedReceiver<ClientRequest>,
        editor: Arc<dyn EditorClient>,
        shutdown: CancellationToken,
    ) {
        loop {
            let request = tokio::select! {
                _ = shutdown.cancelled() => break,
                request = requests.recv() => request,
            };
            let Some(request) = request else {
                break;
            };
            if let Err(err) = self.handle_client_request(request, editor.as_ref()).await {
                tracing::warn!(error = %err, "client request failed");
            }
        }
        tracing::debug!("client request loop stopped");
    }

    async fn render(
        &self,
        uri: &DocumentUri,
        source: &str,
        generate: bool,
        prior: &[DiagramCacheEntry],
    ) -> RenderOutput {
        let (html, metadata) = {
            let ParsedDocument { mut tree, metadata } = self.renderer.parse(source, uri);
            self.differ.diff(&mut tree, uri.as_str());
            self.images.inline(&mut tree, &uri.file_path());
            let tag_link = |destination: &str| self.links.internal_target(destination, uri);
            (write_html(&tree, &tag_link), metadata)
        };

        let resolution = self.diagrams.resolve(&html, generate, prior).await;
        if let Some(err) = &resolution.error {
            tracing::warn!(%uri, error = %err, "diagram rendering incomplete");
        }
        RenderOutput { html: resolution.html, metadata, diagrams: resolution.entries }
    }

    /// Re-renders the stored text of `uri`.
    ///
    /// Returns `false` when the document is not open, or when its text changed while the
    /// pass ran; the pass that rendered the newer text pushes instead.
    async fn refresh(&self, uri: &DocumentUri, generate: bool) -> bool {
        let Some(state) = self.registry.get(uri) else {
            return false;
        };
        let output = self.render(uri, &state.content, generate, &state.diagrams).await;
        self.registry.store_render(uri, state.revision, output)
    }

    fn ensure_loaded(&self, uri: &DocumentUri) -> Result<(), EngineError> {
        if !self.registry.contains(uri) {
            let text = load_document(uri)?;
            tracing::info!(%uri, "loaded document from disk");
            self.registry.register(uri.clone(), DocumentState::new(uri.clone(), text));
        }
        Ok(())
    }

    fn push_document(&self, uri: &DocumentUri) -> Result<(), EngineError> {
        match self.registry.get(uri) {
            Some(state) => self.push_state(&state),
            None => Ok(()),
        }
    }

    fn push_state(&self, state: &DocumentState) -> Result<(), EngineError> {
        let route = self.route_of(&state.uri);
        self.hub.push_update(&state.uri.title(), &route, &state.rendered_html, &state.metadata)?;
        Ok(())
    }

    fn route_of(&self, uri: &DocumentUri) -> String {
        self.registry.relative_path(uri).unwrap_or_else(|| "/".to_owned())
    }

    fn set_focused(&self, uri: &DocumentUri) {
        *self.focused.lock() = Some(uri.clone());
    }

    fn should_auto_open(&self) -> bool {
        self.config.auto_open || self.registry.first_preview_shown()
    }

    fn open_browser(&self, route: &str) -> Result<(), EngineError> {
        let url = format!("{}{route}", self.base_url.trim_end_matches('/'));
        self.browser.open(&url).map_err(|source| EngineError::Browser { url, source })
    }
}

fn without_fragment(route: &str) -> &str {
    route.split_once('#').map_or(route, |(path, _fragment)| path)
}
