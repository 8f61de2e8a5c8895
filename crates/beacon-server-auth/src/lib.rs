// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session authentication for the Beacon server.
//!
//! - [`types`]: ID newtypes and the [`User`] record
//! - [`middleware`]: [`CurrentUser`], [`AuthContext`] and cookie extraction
//! - [`session`]: the [`SessionStore`] trait and an in-memory implementation
//!
//! Session tokens are only ever stored and compared as SHA-256 hashes
//! (see [`hash_token`]).

pub mod middleware;
pub mod session;
pub mod types;

pub use middleware::{extract_session_cookie_with_name, AuthContext, AuthMethod, CurrentUser};
pub use session::{generate_session_token, InMemorySessionStore, IssuedSession, SessionStore};
pub use types::{SessionId, User, UserId};

/// Hash a session token for storage and lookup.
///
/// Returns the lowercase hex SHA-256 digest.
pub fn hash_token(token: &str) -> String {
	use sha2::{Digest, Sha256};
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn hash_token_is_sha256_hex() {
		assert_eq!(
			hash_token("abc"),
			"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
		);
	}

	proptest! {
		#[test]
		fn hash_token_is_deterministic_and_fixed_width(token in ".*") {
			let a = hash_token(&token);
			prop_assert_eq!(a.len(), 64);
			prop_assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
			prop_assert_eq!(a, hash_token(&token));
		}

		#[test]
		fn distinct_tokens_hash_differently(a in "[a-z0-9]{8,32}", b in "[a-z0-9]{8,32}") {
			prop_assume!(a != b);
			prop_assert_ne!(hash_token(&a), hash_token(&b));
		}
	}
}
