// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! OpenAPI document served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::{
	error::ErrorResponse,
	routes::{
		auth::{CreateSessionRequest, LogoutResponse, SessionResponse},
		health::HealthResponse,
		search::{MessageView, ResultsView},
	},
};

#[derive(OpenApi)]
#[openapi(
	info(
		title = "Beacon Server API",
		description = "Authenticated search proxy"
	),
	paths(
		crate::routes::health::health_check,
		crate::routes::search::search_results,
		crate::routes::auth::create_session,
		crate::routes::auth::logout,
	),
	components(schemas(
		HealthResponse,
		ResultsView,
		MessageView,
		ErrorResponse,
		CreateSessionRequest,
		SessionResponse,
		LogoutResponse
	)),
	tags(
		(name = "health", description = "Liveness"),
		(name = "auth", description = "Session handoff and logout"),
		(name = "search", description = "Search proxy")
	)
)]
pub struct ApiDoc;
