// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication configuration.

use std::time::Duration;

use beacon_common_config::SecretString;
use serde::Deserialize;

const DEFAULT_LOGIN_URL: &str = "/users/sign_in";
const DEFAULT_SESSION_COOKIE_NAME: &str = "beacon_session";
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_SESSION_TTL_HOURS: u64 = 24;

#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Authenticate every request as the dev user. Forbidden in production.
	pub dev_mode: bool,
	/// Deployment environment name (`development`, `production`, ...).
	pub environment: String,
	/// Where unauthenticated visitors are redirected.
	pub login_url: String,
	pub session_cookie_name: String,
	/// Bearer secret the login system presents to `POST /auth/sessions`.
	/// Session issuing is disabled when unset.
	pub session_issuer_secret: Option<SecretString>,
	pub session_ttl: Duration,
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub dev_mode: Option<bool>,
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub login_url: Option<String>,
	#[serde(default)]
	pub session_cookie_name: Option<String>,
	#[serde(default)]
	pub session_issuer_secret: Option<SecretString>,
	#[serde(default)]
	pub session_ttl_hours: Option<u64>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.dev_mode.is_some() {
			self.dev_mode = other.dev_mode;
		}
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.login_url.is_some() {
			self.login_url = other.login_url;
		}
		if other.session_cookie_name.is_some() {
			self.session_cookie_name = other.session_cookie_name;
		}
		if other.session_issuer_secret.is_some() {
			self.session_issuer_secret = other.session_issuer_secret;
		}
		if other.session_ttl_hours.is_some() {
			self.session_ttl_hours = other.session_ttl_hours;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			dev_mode: self.dev_mode.unwrap_or(false),
			environment: self
				.environment
				.unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
			login_url: self
				.login_url
				.unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string()),
			session_cookie_name: self
				.session_cookie_name
				.unwrap_or_else(|| DEFAULT_SESSION_COOKIE_NAME.to_string()),
			session_issuer_secret: self.session_issuer_secret,
			session_ttl: Duration::from_secs(
				self.session_ttl_hours
					.unwrap_or(DEFAULT_SESSION_TTL_HOURS)
					.saturating_mul(3600),
			),
		}
	}
}

impl AuthConfig {
	pub fn is_production(&self) -> bool {
		self.environment.eq_ignore_ascii_case("production")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = AuthConfig::default();
		assert!(!config.dev_mode);
		assert_eq!(config.login_url, "/users/sign_in");
		assert_eq!(config.session_cookie_name, "beacon_session");
		assert!(config.session_issuer_secret.is_none());
		assert_eq!(config.session_ttl, Duration::from_secs(24 * 3600));
		assert!(!config.is_production());
	}

	#[test]
	fn session_issuing_from_toml() {
		let layer: AuthConfigLayer = toml::from_str(
			r#"
session_issuer_secret = "issuer-secret"
session_ttl_hours = 2
"#,
		)
		.unwrap();
		let config = layer.finalize();
		assert_eq!(
			config.session_issuer_secret.as_ref().map(|s| s.expose().as_str()),
			Some("issuer-secret")
		);
		assert_eq!(config.session_ttl, Duration::from_secs(2 * 3600));
		assert!(!format!("{config:?}").contains("issuer-secret"));
	}

	#[test]
	fn production_is_case_insensitive() {
		let config = AuthConfigLayer {
			environment: Some("Production".to_string()),
			..Default::default()
		}
		.finalize();
		assert!(config.is_production());
	}
}
