// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Browser side of the preview: the client hub, its wire protocol and the HTTP endpoint.

pub mod hub;
pub mod protocol;
pub mod server;

pub use hub::{BroadcastHub, ClientId, HubError, OutboundMessage};
pub use protocol::{ClientMessage, ClientRequest, PreviewEvent};
pub use server::{router, start, PreviewServer, CONFIG_DELAY, SHUTDOWN_GRACE};
