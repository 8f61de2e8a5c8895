// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Discord command bot configuration.

use beacon_common_config::SecretString;
use serde::Deserialize;

pub const DEFAULT_PREFIX: &str = "/";
pub const DEFAULT_CHANNEL_ID: u64 = 782544143808856106;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscordConfigLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
	#[serde(default)]
	pub token: Option<SecretString>,
	#[serde(default)]
	pub client_id: Option<u64>,
	#[serde(default)]
	pub prefix: Option<String>,
	#[serde(default)]
	pub channel_id: Option<u64>,
	#[serde(default)]
	pub permissions: Option<u64>,
}

impl DiscordConfigLayer {
	pub fn merge(&mut self, other: DiscordConfigLayer) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.token.is_some() {
			self.token = other.token;
		}
		if other.client_id.is_some() {
			self.client_id = other.client_id;
		}
		if other.prefix.is_some() {
			self.prefix = other.prefix;
		}
		if other.channel_id.is_some() {
			self.channel_id = other.channel_id;
		}
		if other.permissions.is_some() {
			self.permissions = other.permissions;
		}
	}

	/// Resolve the section. Returns `None` unless both credentials are present
	/// and the bot has not been explicitly disabled.
	pub fn finalize(self) -> Option<DiscordConfig> {
		if self.enabled == Some(false) {
			return None;
		}

		Some(DiscordConfig {
			token: self.token?,
			client_id: self.client_id?,
			prefix: self
				.prefix
				.filter(|p| !p.is_empty())
				.unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
			channel_id: self.channel_id.unwrap_or(DEFAULT_CHANNEL_ID),
			permissions: self.permissions,
		})
	}
}

#[derive(Debug, Clone)]
pub struct DiscordConfig {
	pub token: SecretString,
	pub client_id: u64,
	pub prefix: String,
	/// Home channel; commands are only accepted here.
	pub channel_id: u64,
	/// Permission bitmask requested by the invite URL.
	pub permissions: Option<u64>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use beacon_common_config::Secret;

	fn credentials() -> DiscordConfigLayer {
		DiscordConfigLayer {
			token: Some(Secret::new("token".to_string())),
			client_id: Some(42),
			..Default::default()
		}
	}

	#[test]
	fn missing_credentials_disable_the_bot() {
		assert!(DiscordConfigLayer::default().finalize().is_none());
		assert!(DiscordConfigLayer {
			client_id: Some(42),
			..Default::default()
		}
		.finalize()
		.is_none());
	}

	#[test]
	fn defaults_fill_prefix_and_channel() {
		let config = credentials().finalize().unwrap();
		assert_eq!(config.prefix, "/");
		assert_eq!(config.channel_id, DEFAULT_CHANNEL_ID);
		assert!(config.permissions.is_none());
	}

	#[test]
	fn empty_prefix_falls_back_to_default() {
		let config = DiscordConfigLayer {
			prefix: Some(String::new()),
			..credentials()
		}
		.finalize()
		.unwrap();
		assert_eq!(config.prefix, "/");
	}

	#[test]
	fn explicit_disable_wins_over_credentials() {
		let layer = DiscordConfigLayer {
			enabled: Some(false),
			..credentials()
		};
		assert!(layer.finalize().is_none());
	}
}
