// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Upstream search API configuration.

use std::time::Duration;

use beacon_common_config::SecretString;
use serde::Deserialize;

pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfigLayer {
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub api_key: Option<SecretString>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

impl SearchConfigLayer {
	pub fn merge(&mut self, other: SearchConfigLayer) {
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.api_key.is_some() {
			self.api_key = other.api_key;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
	}

	pub fn finalize(self) -> SearchConfig {
		SearchConfig {
			base_url: self.base_url,
			api_key: self.api_key,
			timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_SEARCH_TIMEOUT_SECS)),
		}
	}
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
	/// Endpoint that receives `GET ?q=...`. Search is disabled when unset.
	pub base_url: Option<String>,
	/// Sent as a bearer token when present.
	pub api_key: Option<SecretString>,
	pub timeout: Duration,
}

impl Default for SearchConfig {
	fn default() -> Self {
		SearchConfigLayer::default().finalize()
	}
}

impl SearchConfig {
	pub fn is_configured(&self) -> bool {
		self.base_url.is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use beacon_common_config::Secret;

	#[test]
	fn default_is_unconfigured_with_five_second_timeout() {
		let config = SearchConfig::default();
		assert!(!config.is_configured());
		assert_eq!(config.timeout, Duration::from_secs(5));
	}

	#[test]
	fn deserialize_from_toml() {
		let layer: SearchConfigLayer = toml::from_str(
			r#"
base_url = "https://search.example.com/v1/search"
api_key = "k-123"
timeout_secs = 2
"#,
		)
		.unwrap();
		let config = layer.finalize();
		assert!(config.is_configured());
		assert_eq!(config.api_key.unwrap().expose(), "k-123");
		assert_eq!(config.timeout, Duration::from_secs(2));
	}

	#[test]
	fn merge_keeps_key_when_overlay_omits_it() {
		let mut base = SearchConfigLayer {
			base_url: Some("https://old.example.com".to_string()),
			api_key: Some(Secret::new("key".to_string())),
			timeout_secs: None,
		};
		base.merge(SearchConfigLayer {
			base_url: Some("https://new.example.com".to_string()),
			..Default::default()
		});
		assert_eq!(base.base_url.as_deref(), Some("https://new.example.com"));
		assert!(base.api_key.is_some());
	}
}
