// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Beacon server: an authenticated search proxy plus the Discord bot launcher.

pub mod api;
pub mod api_docs;
pub mod auth_middleware;
pub mod bot_launcher;
pub mod error;
pub mod routes;
pub mod session_purge;
pub mod version;

pub use api::{create_app_state, create_router, AppState};
pub use beacon_server_config::ServerConfig;
