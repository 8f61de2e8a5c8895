// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Redacting wrapper for credentials.
//!
//! Bot tokens and upstream API keys are held as [`Secret`] from the moment
//! they are loaded. `Debug`, `Display` and `Serialize` all print
//! [`REDACTED`]; the value is only reachable through [`Secret::expose`], and
//! the memory is zeroed on drop.
//!
//! ```
//! use beacon_common_config::Secret;
//!
//! let token = Secret::new("bot-token".to_string());
//! assert_eq!(format!("{token}"), "[REDACTED]");
//! assert_eq!(token.expose(), "bot-token");
//! ```

use std::fmt;
use zeroize::Zeroize;

/// Placeholder printed in place of any secret value.
pub const REDACTED: &str = "[REDACTED]";

/// A sensitive value that never formats or serializes in plain text.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Access the wrapped value. Every call site is a deliberate disclosure.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self::new(self.inner.clone())
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

#[cfg(feature = "serde")]
mod serde_impl {
	use super::{Secret, REDACTED};
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	impl<T> Serialize for Secret<T>
	where
		T: Serialize + Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_and_display_hide_the_token() {
		let token = Secret::new("MTIz.discord.token".to_string());
		assert_eq!(format!("{token}"), REDACTED);
		assert_eq!(format!("{token:?}"), "Secret(\"[REDACTED]\")");
	}

	#[test]
	fn optional_secret_debug_is_redacted() {
		let key: Option<SecretString> = Some(Secret::new("search-key".to_string()));
		let debug = format!("{key:?}");
		assert!(!debug.contains("search-key"));
		assert!(debug.contains(REDACTED));
	}

	#[test]
	fn clone_keeps_value() {
		let key = Secret::new("search-key".to_string());
		assert_eq!(key.clone(), key);
		assert_eq!(key.clone().expose(), "search-key");
	}

	#[cfg(feature = "serde")]
	#[test]
	fn serializes_redacted_but_deserializes_value() {
		let key = Secret::new("search-key".to_string());
		assert_eq!(serde_json::to_string(&key).unwrap(), "\"[REDACTED]\"");

		let parsed: SecretString = serde_json::from_str("\"search-key\"").unwrap();
		assert_eq!(parsed.expose(), "search-key");
	}

	proptest! {
		#[test]
		fn display_never_leaks(inner in "[a-zA-Z0-9._-]{3,64}") {
			prop_assume!(!REDACTED.contains(&inner));
			let secret = Secret::new(inner.clone());
			let displayed = format!("{secret}");
			let debugged = format!("{secret:?}");
			prop_assert!(!displayed.contains(&inner));
			prop_assert!(!debugged.contains(&inner));
		}
	}
}
