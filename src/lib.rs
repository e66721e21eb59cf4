// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Marksync: live markdown preview kept in sync with an editor.
//!
//! The editor side feeds notifications into [`engine::Engine`], which renders documents,
//! marks a scroll anchor, swaps in PlantUML diagrams and pushes the result to every browser
//! connected to the [`preview`] server.

pub mod browser;
pub mod config;
pub mod diagram;
pub mod editor;
pub mod engine;
pub mod links;
pub mod model;
pub mod preview;
pub mod registry;
pub mod render;
pub mod scroll;
