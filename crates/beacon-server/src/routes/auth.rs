// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Session handoff from the login system, and logout.
//!
//! The login page lives outside this server. Once it has signed a visitor
//! in, it calls `POST /auth/sessions` with the shared issuer secret and
//! hands the returned cookie to the browser.

use axum::{
	extract::State,
	http::{
		header::{AUTHORIZATION, SET_COOKIE},
		HeaderMap, HeaderValue, StatusCode,
	},
	response::{IntoResponse, Response},
	Json,
};
use beacon_server_auth::{extract_session_cookie_with_name, hash_token, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{api::AppState, auth_middleware::OptionalAuth, error::ServerError};

/// Identity the login system vouches for.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
	pub display_name: String,
	#[serde(default)]
	pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
	/// Raw session token. Also set as the session cookie.
	pub token: String,
	pub user_id: String,
	pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponse {
	pub message: String,
}

fn session_cookie(name: &str, token: &str, max_age_secs: u64) -> String {
	format!("{name}={token}; Path=/; Max-Age={max_age_secs}; HttpOnly; Secure; SameSite=Lax")
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
	headers
		.get(AUTHORIZATION)?
		.to_str()
		.ok()?
		.strip_prefix("Bearer ")
		.map(str::trim)
		.filter(|token| !token.is_empty())
}

#[utoipa::path(
    post,
    path = "/auth/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created; cookie set", body = SessionResponse),
        (status = 400, description = "Empty display name", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or wrong issuer secret", body = crate::error::ErrorResponse),
        (status = 501, description = "Session issuing is not configured", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
/// POST /auth/sessions - Issue a session for a user signed in by the login system.
#[tracing::instrument(skip(state, headers, body), fields(user_id = tracing::field::Empty))]
pub async fn create_session(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(body): Json<CreateSessionRequest>,
) -> Result<Response, ServerError> {
	let Some(secret) = &state.auth_config.session_issuer_secret else {
		return Err(ServerError::NotConfigured(
			"session issuing is not configured".to_string(),
		));
	};

	let presented = bearer_token(&headers).ok_or(ServerError::Unauthorized)?;
	if hash_token(presented) != hash_token(secret.expose()) {
		tracing::warn!("session issue rejected: wrong issuer secret");
		return Err(ServerError::Unauthorized);
	}

	let display_name = body.display_name.trim();
	if display_name.is_empty() {
		return Err(ServerError::BadRequest("display_name must not be empty".to_string()));
	}

	let mut user = User::new(display_name);
	if let Some(email) = body.email.filter(|e| !e.trim().is_empty()) {
		user = user.with_email(email);
	}
	let user_id = user.id;
	tracing::Span::current().record("user_id", tracing::field::display(&user_id));

	let ttl = state.auth_config.session_ttl;
	let chrono_ttl = chrono::Duration::from_std(ttl)
		.map_err(|e| ServerError::Internal(format!("session ttl out of range: {e}")))?;
	let issued = state.session_store.create_session(user, chrono_ttl).await;

	let cookie = session_cookie(
		&state.auth_config.session_cookie_name,
		&issued.token,
		ttl.as_secs(),
	);
	let cookie = HeaderValue::from_str(&cookie)
		.map_err(|e| ServerError::Internal(format!("invalid session cookie: {e}")))?;

	tracing::info!(session_id = %issued.id, expires_at = %issued.expires_at, "session issued");

	let mut response = (
		StatusCode::CREATED,
		Json(SessionResponse {
			token: issued.token,
			user_id: user_id.to_string(),
			expires_at: issued.expires_at,
		}),
	)
		.into_response();
	response.headers_mut().insert(SET_COOKIE, cookie);
	Ok(response)
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session revoked and cookie cleared", body = LogoutResponse)
    ),
    tag = "auth"
)]
/// POST /auth/logout - Revoke the current session and clear its cookie.
///
/// Answers 200 even when there was no session to revoke.
#[tracing::instrument(skip(state, auth, headers))]
pub async fn logout(
	State(state): State<AppState>,
	OptionalAuth(auth): OptionalAuth,
	headers: HeaderMap,
) -> Response {
	let cookie_name = &state.auth_config.session_cookie_name;

	match &auth {
		Some(user) if user.is_session_auth() => {
			if let Some(token) = extract_session_cookie_with_name(&headers, cookie_name) {
				let revoked = state.session_store.revoke(&token).await;
				tracing::info!(user_id = %user.id(), revoked, "user logged out");
			}
		}
		Some(user) => tracing::debug!(user_id = %user.id(), "logout without a session"),
		None => tracing::debug!("logout while signed out"),
	}

	let mut response = Json(LogoutResponse {
		message: "Signed out".to_string(),
	})
	.into_response();
	if let Ok(value) = HeaderValue::from_str(&session_cookie(cookie_name, "", 0)) {
		response.headers_mut().insert(SET_COOKIE, value);
	}
	response
}
