// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session issuing and lookup.
//!
//! Sessions are keyed by the SHA-256 hash of their token; the raw token is
//! handed to the client once and never kept.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::hash_token;
use crate::types::{SessionId, User};

/// A session handed out by [`SessionStore::create_session`].
#[derive(Debug, Clone)]
pub struct IssuedSession {
	pub id: SessionId,
	/// Raw token for the client. Only its hash is stored.
	pub token: String,
	pub expires_at: DateTime<Utc>,
}

/// Issues, resolves and revokes session tokens.
#[async_trait]
pub trait SessionStore: Send + Sync {
	/// Create a session for `user` that lives for `ttl`.
	async fn create_session(&self, user: User, ttl: Duration) -> IssuedSession;

	/// Returns the session and its user for a raw token, or `None` when the
	/// token is unknown or expired.
	async fn lookup(&self, token: &str) -> Option<(SessionId, User)>;

	/// Remove a session. Returns whether it existed.
	async fn revoke(&self, token: &str) -> bool;

	/// Drop every expired session, returning how many were removed.
	async fn purge_expired(&self) -> usize;
}

#[derive(Debug, Clone)]
struct SessionRecord {
	id: SessionId,
	user: User,
	expires_at: DateTime<Utc>,
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
	sessions: RwLock<HashMap<String, SessionRecord>>,
}

/// Generate a new opaque session token.
pub fn generate_session_token() -> String {
	format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

impl InMemorySessionStore {
	pub fn new() -> Self {
		Self::default()
	}

	async fn insert(&self, token: &str, user: User, ttl: Duration) -> (SessionId, DateTime<Utc>) {
		let id = SessionId::generate();
		let expires_at = Utc::now() + ttl;
		let record = SessionRecord {
			id,
			user,
			expires_at,
		};
		self.sessions.write().await.insert(hash_token(token), record);
		debug!(session_id = %id, "session created");
		(id, expires_at)
	}

	pub async fn len(&self) -> usize {
		self.sessions.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.sessions.read().await.is_empty()
	}
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
	#[instrument(skip(self, user), fields(user_id = %user.id))]
	async fn create_session(&self, user: User, ttl: Duration) -> IssuedSession {
		let token = generate_session_token();
		let (id, expires_at) = self.insert(&token, user, ttl).await;
		IssuedSession {
			id,
			token,
			expires_at,
		}
	}

	async fn lookup(&self, token: &str) -> Option<(SessionId, User)> {
		let sessions = self.sessions.read().await;
		let Some(record) = sessions.get(&hash_token(token)) else {
			debug!("Session not found for token hash");
			return None;
		};

		if record.expires_at <= Utc::now() {
			debug!(session_id = %record.id, "Session expired");
			return None;
		}

		Some((record.id, record.user.clone()))
	}

	async fn revoke(&self, token: &str) -> bool {
		let removed = self.sessions.write().await.remove(&hash_token(token));
		if let Some(record) = &removed {
			debug!(session_id = %record.id, "session revoked");
		}
		removed.is_some()
	}

	async fn purge_expired(&self) -> usize {
		let now = Utc::now();
		let mut sessions = self.sessions.write().await;
		let before = sessions.len();
		sessions.retain(|_, record| record.expires_at > now);
		before - sessions.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn created_session_resolves_to_user() {
		let store = InMemorySessionStore::new();
		let user = User::new("Alice");
		let issued = store.create_session(user.clone(), Duration::hours(1)).await;

		let (id, found) = store.lookup(&issued.token).await.unwrap();
		assert_eq!(id, issued.id);
		assert_eq!(found, user);
		assert!(issued.expires_at > Utc::now());
	}

	#[tokio::test]
	async fn unknown_token_is_none() {
		let store = InMemorySessionStore::new();
		store.create_session(User::new("Alice"), Duration::hours(1)).await;
		assert!(store.lookup("not-a-token").await.is_none());
	}

	#[tokio::test]
	async fn raw_token_is_not_a_key() {
		let store = InMemorySessionStore::new();
		let token = store.create_session(User::new("Alice"), Duration::hours(1)).await.token;
		let sessions = store.sessions.read().await;
		assert!(!sessions.contains_key(&token));
		assert!(sessions.contains_key(&hash_token(&token)));
	}

	#[tokio::test]
	async fn expired_session_is_rejected_and_purged() {
		let store = InMemorySessionStore::new();
		store.insert("old", User::new("Bob"), Duration::seconds(-1)).await;
		store.insert("fresh", User::new("Carol"), Duration::hours(1)).await;

		assert!(store.lookup("old").await.is_none());
		assert!(store.lookup("fresh").await.is_some());
		assert_eq!(store.purge_expired().await, 1);
		assert_eq!(store.len().await, 1);
	}

	#[tokio::test]
	async fn revoke_removes_session() {
		let store = InMemorySessionStore::new();
		let token = store.create_session(User::new("Dan"), Duration::hours(1)).await.token;

		assert!(store.revoke(&token).await);
		assert!(!store.revoke(&token).await);
		assert!(store.lookup(&token).await.is_none());
		assert!(store.is_empty().await);
	}

	#[test]
	fn generated_tokens_are_long_and_unique() {
		let a = generate_session_token();
		let b = generate_session_token();
		assert_eq!(a.len(), 64);
		assert_ne!(a, b);
	}
}
