// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runtime settings, filled from the command line by the binary.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

pub const DEFAULT_PLANTUML_SERVER: &str = "www.plantuml.com";
pub const DEFAULT_PLANTUML_PATH: &str = "plantuml";

/// How long a diagram request may take before it is abandoned.
pub const DIAGRAM_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewConfig {
    /// One browser tab per document instead of a single shared page.
    pub enable_tabs: bool,
    /// Open the browser when a document is opened. When off, the browser opens only after
    /// the first explicit `open-preview`.
    pub auto_open: bool,
    /// Browser program to launch instead of the system default.
    pub browser: Option<String>,
    pub host: IpAddr,
    /// `0` picks a free port.
    pub port: u16,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enable_tabs: false,
            auto_open: true,
            browser: None,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramServerConfig {
    pub server: String,
    pub base_path: String,
    pub disable_tls: bool,
    pub timeout: Duration,
}

impl DiagramServerConfig {
    pub fn scheme(&self) -> &'static str {
        if self.disable_tls {
            "http"
        } else {
            "https"
        }
    }
}

impl Default for DiagramServerConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_PLANTUML_SERVER.to_owned(),
            base_path: DEFAULT_PLANTUML_PATH.to_owned(),
            disable_tls: false,
            timeout: DIAGRAM_TIMEOUT,
        }
    }
}

/// Optional markdown extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub footnotes: bool,
    pub wikilinks: bool,
    /// Replace `:shortcode:` names with emoji.
    pub emoji: bool,
}
