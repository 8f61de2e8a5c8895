// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Health HTTP handler.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
	pub status: String,
	pub version: String,
	/// Whether a search base URL is configured.
	pub search_configured: bool,
	/// Whether the Discord bot was launched.
	pub discord_enabled: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is alive", body = HealthResponse)
    ),
    tag = "health"
)]
/// GET /health - Liveness plus which optional components are configured.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	Json(HealthResponse {
		status: "ok".to_string(),
		version: env!("CARGO_PKG_VERSION").to_string(),
		search_configured: state.search.is_some(),
		discord_enabled: state.discord_enabled,
	})
}
