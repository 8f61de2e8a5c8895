// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity types shared by the auth middleware and the session store.
//!
//! ID types serialize transparently as UUID strings and convert to and from
//! [`uuid::Uuid`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			pub fn into_inner(self) -> Uuid {
				self.0
			}

			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(SessionId, "Unique identifier for a login session.");

/// Fixed ID of the user every request authenticates as in dev mode.
pub const DEV_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

/// A user known to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub display_name: String,
	pub primary_email: Option<String>,
	pub created_at: DateTime<Utc>,
}

impl User {
	pub fn new(display_name: impl Into<String>) -> Self {
		Self {
			id: UserId::generate(),
			display_name: display_name.into(),
			primary_email: None,
			created_at: Utc::now(),
		}
	}

	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.primary_email = Some(email.into());
		self
	}

	/// The dev-mode user. Its ID is stable across restarts.
	pub fn dev() -> Self {
		Self {
			id: UserId::new(DEV_USER_ID),
			display_name: "Dev User".to_string(),
			primary_email: Some("dev@localhost".to_string()),
			created_at: Utc::now(),
		}
	}
}
