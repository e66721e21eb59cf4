// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};

use crate::model::Metadata;
use crate::render::meta_table_html;

use super::protocol::{ClientMessage, ClientRequest, PreviewEvent};

/// Hub-assigned identity of one websocket connection.
pub type ClientId = u64;

/// Serialized event, shared between all connection queues.
pub type OutboundMessage = Arc<str>;

#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("no preview client connected within {timeout:?}")]
    Timeout { timeout: Duration },
    #[error("failed to encode preview event: {source}")]
    Encode { source: serde_json::Error },
    #[error("invalid client message: {source}")]
    InvalidMessage { source: serde_json::Error },
}

/// Set of connected preview clients.
///
/// Each client is represented by the sending half of its connection queue. A single writer
/// task per connection drains that queue, so messages reach one client in the order they
/// were broadcast.
#[derive(Debug)]
pub struct BroadcastHub {
    enable_tabs: bool,
    clients: RwLock<HashMap<ClientId, mpsc::UnboundedSender<OutboundMessage>>>,
    client_count: watch::Sender<usize>,
    next_id: AtomicU64,
    requests: mpsc::UnboundedSender<ClientRequest>,
}

impl BroadcastHub {
    /// Creates the hub together with the receiving end of the client request channel.
    pub fn new(enable_tabs: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<ClientRequest>) {
        let (requests, requests_rx) = mpsc::unbounded_channel();
        let hub = Self {
            enable_tabs,
            clients: RwLock::new(HashMap::new()),
            client_count: watch::Sender::new(0),
            next_id: AtomicU64::new(1),
            requests,
        };
        (Arc::new(hub), requests_rx)
    }

    pub fn enable_tabs(&self) -> bool {
        self.enable_tabs
    }

    /// The message every connection receives first.
    pub fn config_message(&self) -> Result<OutboundMessage, HubError> {
        encode(&PreviewEvent::Config { enable_tabs: self.enable_tabs })
    }

    pub fn add_client(&self, sender: mpsc::UnboundedSender<OutboundMessage>) -> ClientId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut clients = self.clients.write();
        clients.insert(id, sender);
        self.client_count.send_replace(clients.len());
        tracing::debug!(client = id, clients = clients.len(), "preview client connected");
        id
    }

    pub fn remove_client(&self, id: ClientId) -> bool {
        let mut clients = self.clients.write();
        let removed = clients.remove(&id).is_some();
        self.client_count.send_replace(clients.len());
        if removed {
            tracing::debug!(client = id, clients = clients.len(), "preview client disconnected");
        }
        removed
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Queues `event` on every connection and returns how many accepted it.
    ///
    /// Senders are snapshotted under the read lock and written without it. Connections
    /// whose queue is closed are removed afterwards under the write lock.
    pub fn broadcast(&self, event: &PreviewEvent) -> Result<usize, HubError> {
        let message = encode(event)?;
        let targets = self
            .clients
            .read()
            .iter()
            .map(|(id, sender)| (*id, sender.clone()))
            .collect::<Vec<_>>();

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, sender) in targets {
            match sender.send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => closed.push(id),
            }
        }

        if !closed.is_empty() {
            let mut clients = self.clients.write();
            for id in &closed {
                clients.remove(id);
            }
            self.client_count.send_replace(clients.len());
            tracing::debug!(pruned = closed.len(), "dropped closed preview clients");
        }

        Ok(delivered)
    }

    /// Sends new content for a document. Outside multi-tab mode the route is blanked so
    /// every page shows the update.
    pub fn push_update(
        &self,
        title: &str,
        route: &str,
        html: &str,
        metadata: &Metadata,
    ) -> Result<usize, HubError> {
        let document_route = if self.enable_tabs { route.to_owned() } else { String::new() };
        self.broadcast(&PreviewEvent::Update {
            html: html.to_owned(),
            title: title.to_owned(),
            meta_table_html: meta_table_html(metadata),
            document_route,
        })
    }

    pub fn push_close(&self, route: &str, is_last_document: bool) -> Result<usize, HubError> {
        self.broadcast(&PreviewEvent::CloseDocument {
            document_route: route.to_owned(),
            is_last_document,
        })
    }

    /// Resolves once at least one client is connected, or fails after `timeout`.
    pub async fn wait_for_clients(&self, timeout: Duration) -> Result<(), HubError> {
        let mut count = self.client_count.subscribe();
        let connected = tokio::time::timeout(timeout, count.wait_for(|&clients| clients > 0))
            .await
            .is_ok_and(|waited| waited.is_ok());
        if connected {
            Ok(())
        } else {
            Err(HubError::Timeout { timeout })
        }
    }

    /// Parses a message read from a connection and forwards it to the request channel.
    pub fn handle_client_message(&self, text: &str) -> Result<(), HubError> {
        let message = serde_json::from_str::<ClientMessage>(text)
            .map_err(|source| HubError::InvalidMessage { source })?;
        tracing::debug!(?message, "preview client request");
        if self.requests.send(message.into()).is_err() {
            tracing::warn!("client request dropped: nobody is handling requests");
        }
        Ok(())
    }

    /// Drops every connection queue; writer tasks finish what is queued and close.
    pub fn disconnect_all(&self) {
        let mut clients = self.clients.write();
        clients.clear();
        self.client_count.send_replace(0);
    }
}

fn encode(event: &PreviewEvent) -> Result<OutboundMessage, HubError> {
    serde_json::to_string(event)
        .map(OutboundMessage::from)
        .map_err(|source| HubError::Encode { source })
}
