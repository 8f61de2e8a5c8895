// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use std::sync::Arc;

use axum::{
	middleware::from_fn_with_state,
	routing::{get, post},
	Json, Router,
};
use beacon_server_auth::{SessionStore, User};
use beacon_server_config::{AuthConfig, ServerConfig};
use beacon_server_search::{SearchBackend, SearchClient, SearchError};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::{api_docs::ApiDoc, auth_middleware::auth_layer, routes};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	/// `None` when no search base URL is configured.
	pub search: Option<Arc<dyn SearchBackend>>,
	pub session_store: Arc<dyn SessionStore>,
	pub auth_config: AuthConfig,
	/// Set only in dev mode.
	pub dev_user: Option<User>,
	pub discord_enabled: bool,
}

impl AppState {
	pub fn new(auth_config: AuthConfig, session_store: Arc<dyn SessionStore>) -> Self {
		let dev_user = auth_config.dev_mode.then(User::dev);
		Self {
			search: None,
			session_store,
			auth_config,
			dev_user,
			discord_enabled: false,
		}
	}

	pub fn with_search(mut self, backend: Arc<dyn SearchBackend>) -> Self {
		self.search = Some(backend);
		self
	}

	pub fn with_discord_enabled(mut self, enabled: bool) -> Self {
		self.discord_enabled = enabled;
		self
	}
}

/// Build state from resolved configuration.
pub fn create_app_state(
	config: &ServerConfig,
	session_store: Arc<dyn SessionStore>,
) -> Result<AppState, SearchError> {
	let mut state = AppState::new(config.auth.clone(), session_store)
		.with_discord_enabled(config.discord.is_some());

	match &config.search.base_url {
		Some(base_url) => {
			let mut client = SearchClient::new(base_url, config.search.timeout)?;
			if let Some(key) = &config.search.api_key {
				client = client.with_api_key(key.clone());
			}
			tracing::info!(base_url = %base_url, "search API client configured");
			state = state.with_search(Arc::new(client));
		}
		None => tracing::warn!("search API base URL not set; /search/results will answer 501"),
	}

	Ok(state)
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
		.route("/search/results", get(routes::search::search_results))
		.route("/auth/sessions", post(routes::auth::create_session))
		.route("/auth/logout", post(routes::auth::logout))
		.layer(from_fn_with_state(state.clone(), auth_layer))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}
