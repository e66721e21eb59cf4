// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::io;

/// Launches the preview page in a browser.
pub trait BrowserOpener: Send + Sync {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Opens URLs with the system default browser, or with `program` when set.
#[derive(Debug, Clone, Default)]
pub struct SystemBrowser {
    program: Option<String>,
}

impl SystemBrowser {
    pub fn new(program: Option<String>) -> Self {
        Self { program: program.filter(|program| !program.trim().is_empty()) }
    }

    pub fn program(&self) -> Option<&str> {
        self.program.as_deref()
    }
}

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        tracing::info!(url, browser = self.program().unwrap_or("default"), "opening preview");
        match &self.program {
            Some(program) => open::with_detached(url, program.as_str()),
            None => open::that_detached(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SystemBrowser;

    #[test]
    fn blank_program_means_system_default() {
        assert_eq!(SystemBrowser::new(Some("  ".into())).program(), None);
        assert_eq!(SystemBrowser::new(None).program(), None);
        assert_eq!(SystemBrowser::new(Some("firefox".into())).program(), Some("firefox"));
    }
}
