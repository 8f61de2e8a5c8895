// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request authentication state.
//!
//! The server's auth layer resolves the session cookie into a [`CurrentUser`]
//! and stores an [`AuthContext`] as a request extension. Handlers read it back
//! through extractors; nothing here touches axum directly.
//!
//! Token values are never logged.

use http::header::COOKIE;
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::types::{SessionId, User, UserId};

/// How the current request was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
	Session,
	DevMode,
}

/// The authenticated user for a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
	pub user: User,
	/// Set when authenticated via session cookie.
	pub session_id: Option<SessionId>,
	pub method: AuthMethod,
}

impl CurrentUser {
	pub fn from_session(user: User, session_id: SessionId) -> Self {
		Self {
			user,
			session_id: Some(session_id),
			method: AuthMethod::Session,
		}
	}

	pub fn dev(user: User) -> Self {
		Self {
			user,
			session_id: None,
			method: AuthMethod::DevMode,
		}
	}

	pub fn id(&self) -> &UserId {
		&self.user.id
	}

	pub fn is_session_auth(&self) -> bool {
		self.method == AuthMethod::Session
	}
}

/// Authentication state carried through the request pipeline.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	pub current_user: Option<CurrentUser>,
}

impl AuthContext {
	pub fn unauthenticated() -> Self {
		Self { current_user: None }
	}

	pub fn authenticated(current_user: CurrentUser) -> Self {
		Self {
			current_user: Some(current_user),
		}
	}
}

/// Extract the session token from the cookie named `cookie_name`.
///
/// Empty values are treated as absent.
pub fn extract_session_cookie_with_name(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.find_map(|cookie| {
			let (name, value) = cookie.trim().split_once('=')?;
			(name == cookie_name && !value.is_empty()).then(|| value.to_string())
		})
}
