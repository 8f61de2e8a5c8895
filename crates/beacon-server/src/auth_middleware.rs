// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Authentication middleware for Axum.
//!
//! [`auth_layer`] resolves the session cookie through the configured
//! [`SessionStore`](beacon_server_auth::SessionStore) and stores an
//! [`AuthContext`] as a request extension. Handlers read it with
//! [`OptionalAuth`].
//!
//! In dev mode (`BEACON_SERVER_AUTH_DEV_MODE=1`) requests without a valid
//! session authenticate as the dev user. Config validation refuses dev mode
//! when `BEACON_SERVER_ENV=production`.

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{request::Parts, Request},
	middleware::Next,
	response::Response,
};
use beacon_server_auth::{extract_session_cookie_with_name, AuthContext, CurrentUser};
use tracing::instrument;

use crate::api::AppState;

/// Store an [`AuthContext`] on every request.
///
/// Session tokens are never logged; only the resolved user id is recorded.
#[instrument(
	name = "auth_layer",
	skip(state, request, next),
	fields(
		auth_method = tracing::field::Empty,
		user_id = tracing::field::Empty,
	)
)]
pub async fn auth_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let span = tracing::Span::current();

	if let Some(token) =
		extract_session_cookie_with_name(request.headers(), &state.auth_config.session_cookie_name)
	{
		match state.session_store.lookup(&token).await {
			Some((session_id, user)) => {
				span.record("auth_method", "session");
				span.record("user_id", tracing::field::display(&user.id));
				request
					.extensions_mut()
					.insert(AuthContext::authenticated(CurrentUser::from_session(
						user, session_id,
					)));
				return next.run(request).await;
			}
			None => tracing::debug!("session cookie did not resolve to a session"),
		}
	}

	if let Some(dev_user) = &state.dev_user {
		span.record("auth_method", "dev_mode");
		span.record("user_id", tracing::field::display(&dev_user.id));
		tracing::warn!("DEV MODE AUTHENTICATION ENABLED - DO NOT USE IN PRODUCTION");
		request
			.extensions_mut()
			.insert(AuthContext::authenticated(CurrentUser::dev(dev_user.clone())));
		return next.run(request).await;
	}

	span.record("auth_method", "none");
	request
		.extensions_mut()
		.insert(AuthContext::unauthenticated());
	next.run(request).await
}

/// Extractor for optional authentication. Always succeeds.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = std::convert::Infallible;

	#[instrument(name = "OptionalAuth::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth_ctx = parts
			.extensions
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_else(AuthContext::unauthenticated);

		if let Some(ref user) = auth_ctx.current_user {
			tracing::debug!(user_id = %user.id(), "Optional auth: authenticated");
		} else {
			tracing::debug!("Optional auth: unauthenticated");
		}

		Ok(OptionalAuth(auth_ctx.current_user))
	}
}
