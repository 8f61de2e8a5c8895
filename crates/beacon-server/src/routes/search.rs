// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Authenticated search proxy HTTP handler.
//!
//! Every outcome renders a JSON view whose `view` field names what was
//! rendered: `results`, `unauthorized`, `upstream_error`,
//! `malformed_response`, `upstream_unavailable` or `search_not_configured`.

use axum::{
	extract::{rejection::QueryRejection, Query, State},
	http::{header::RETRY_AFTER, HeaderValue, StatusCode},
	response::{IntoResponse, Redirect, Response},
	Json,
};
use beacon_common_http::RetryableError;
use beacon_server_auth::CurrentUser;
use beacon_server_search::{SearchBackend, SearchError, SearchQuery, SearchResult};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::{api::AppState, auth_middleware::OptionalAuth, error::ServerError};

/// Seconds clients are asked to wait after a retryable upstream failure.
pub const RETRY_AFTER_SECS: u64 = 30;

/// Rendered on a successful upstream call.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultsView {
	/// Always `results`.
	pub view: String,
	pub query: String,
	/// Upstream records; each has `title` and `description` plus any extra
	/// upstream fields.
	#[schema(value_type = Vec<Object>)]
	pub results: Vec<SearchResult>,
}

/// Rendered for every outcome that carries no results.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageView {
	pub view: String,
	pub message: String,
	/// Status code the upstream answered with, for `upstream_error`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub upstream_status: Option<u16>,
}

impl MessageView {
	fn new(view: &str, message: impl Into<String>) -> Self {
		Self {
			view: view.to_string(),
			message: message.into(),
			upstream_status: None,
		}
	}
}

/// What a search request resolved to.
#[derive(Debug)]
pub enum SearchOutcome {
	LoginRequired { login_url: String },
	Results { query: String, results: Vec<SearchResult> },
	NotConfigured,
	Failed(SearchError),
}

impl SearchOutcome {
	pub fn status(&self) -> StatusCode {
		match self {
			SearchOutcome::LoginRequired { .. } => StatusCode::SEE_OTHER,
			SearchOutcome::Results { .. } => StatusCode::OK,
			SearchOutcome::NotConfigured => StatusCode::NOT_IMPLEMENTED,
			SearchOutcome::Failed(err) => match err {
				SearchError::Unauthorized => StatusCode::UNAUTHORIZED,
				SearchError::UpstreamStatus { .. } | SearchError::InvalidResponse { .. } => {
					StatusCode::BAD_GATEWAY
				}
				SearchError::Timeout | SearchError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
				SearchError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
			},
		}
	}
}

impl IntoResponse for SearchOutcome {
	fn into_response(self) -> Response {
		let status = self.status();
		let retryable = matches!(&self, SearchOutcome::Failed(err) if err.is_retryable());
		let mut response = match self {
			SearchOutcome::LoginRequired { login_url } => Redirect::to(&login_url).into_response(),
			SearchOutcome::Results { query, results } => (
				status,
				Json(ResultsView {
					view: "results".to_string(),
					query,
					results,
				}),
			)
				.into_response(),
			SearchOutcome::NotConfigured => (
				status,
				Json(MessageView::new(
					"search_not_configured",
					"Search is not configured on this server",
				)),
			)
				.into_response(),
			SearchOutcome::Failed(err) => match err {
				SearchError::Unauthorized => (
					status,
					Json(MessageView::new(
						"unauthorized",
						"The search service rejected this request",
					)),
				)
					.into_response(),
				SearchError::UpstreamStatus { status: upstream, .. } => (
					status,
					Json(MessageView {
						upstream_status: Some(upstream),
						..MessageView::new(
							"upstream_error",
							format!("The search service answered with status {upstream}"),
						)
					}),
				)
					.into_response(),
				SearchError::InvalidResponse { .. } => (
					status,
					Json(MessageView::new(
						"malformed_response",
						"The search service returned an unreadable response",
					)),
				)
					.into_response(),
				SearchError::Timeout | SearchError::Network(_) => (
					status,
					Json(MessageView::new(
						"upstream_unavailable",
						"The search service is unavailable, try again later",
					)),
				)
					.into_response(),
				SearchError::Configuration(message) => {
					ServerError::Internal(message).into_response()
				}
			},
		};

		if retryable {
			response
				.headers_mut()
				.insert(RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
		}
		response
	}
}

/// Core search flow: login check, then exactly one upstream call.
pub async fn handle(
	current_user: Option<&CurrentUser>,
	query: SearchQuery,
	backend: Option<&dyn SearchBackend>,
	login_url: &str,
) -> SearchOutcome {
	if current_user.is_none() {
		return SearchOutcome::LoginRequired {
			login_url: login_url.to_string(),
		};
	}

	let Some(backend) = backend else {
		return SearchOutcome::NotConfigured;
	};

	match backend.search(&query).await {
		Ok(results) => SearchOutcome::Results {
			query: query.q,
			results,
		},
		Err(err) => SearchOutcome::Failed(err),
	}
}

#[utoipa::path(
    get,
    path = "/search/results",
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results", body = ResultsView),
        (status = 303, description = "Not signed in; redirect to the login page"),
        (status = 400, description = "Missing q parameter", body = crate::error::ErrorResponse),
        (status = 401, description = "Search service rejected the request", body = MessageView),
        (status = 501, description = "Search is not configured", body = MessageView),
        (status = 502, description = "Upstream error or malformed upstream response", body = MessageView),
        (status = 503, description = "Search service unreachable or timed out", body = MessageView)
    ),
    tag = "search"
)]
/// GET /search/results - Proxy a query to the search service.
#[instrument(
	skip(state, auth, query),
	fields(user_id = tracing::field::Empty, query = tracing::field::Empty)
)]
pub async fn search_results(
	State(state): State<AppState>,
	OptionalAuth(auth): OptionalAuth,
	query: Result<Query<SearchQuery>, QueryRejection>,
) -> Response {
	let span = tracing::Span::current();
	if let Some(user) = &auth {
		span.record("user_id", tracing::field::display(user.id()));
	}

	if auth.is_none() {
		tracing::debug!("search: not signed in, redirecting to login");
		return SearchOutcome::LoginRequired {
			login_url: state.auth_config.login_url.clone(),
		}
		.into_response();
	}

	let Query(query) = match query {
		Ok(query) => query,
		Err(rejection) => {
			tracing::debug!(error = %rejection, "search: invalid query string");
			return ServerError::BadRequest("query parameter `q` is required".to_string())
				.into_response();
		}
	};
	span.record("query", query.q.as_str());

	let outcome = handle(
		auth.as_ref(),
		query,
		state.search.as_deref(),
		&state.auth_config.login_url,
	)
	.await;

	match &outcome {
		SearchOutcome::Results { results, .. } => {
			tracing::info!(results_count = results.len(), "search: returning results");
		}
		SearchOutcome::Failed(err) => {
			tracing::warn!(error = %err, status = outcome.status().as_u16(), "search: upstream failure");
		}
		SearchOutcome::NotConfigured => tracing::warn!("search: search API not configured"),
		SearchOutcome::LoginRequired { .. } => {}
	}

	outcome.into_response()
}
