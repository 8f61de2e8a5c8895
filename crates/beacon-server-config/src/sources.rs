// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, a TOML file, and the environment.

use std::path::PathBuf;

use beacon_common_config::load_secret_env;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuthConfigLayer, DiscordConfigLayer, HttpConfigLayer, LoggingConfigLayer, SearchConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file source. A missing optional file yields an empty layer; a
/// missing required file is a [`ConfigError::FileRead`].
pub struct TomlSource {
	path: PathBuf,
	required: bool,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: false,
		}
	}

	/// A file the operator named explicitly, e.g. with `--config`.
	pub fn required(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}

	pub fn system() -> Self {
		Self::new("/etc/beacon/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.required && !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `BEACON_SERVER_<SECTION>_<FIELD>`.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			auth: Some(load_auth_from_env()?),
			search: Some(load_search_from_env()?),
			discord: Some(load_discord_from_env()?),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_parse<T: std::str::FromStr>(name: &str, kind: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid {kind} value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_secret(name: &str) -> Result<Option<beacon_common_config::SecretString>, ConfigError> {
	load_secret_env(name).map_err(|e| ConfigError::Secret(e.to_string()))
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("BEACON_SERVER_HOST"),
		port: env_parse("BEACON_SERVER_PORT", "u16")?,
	})
}

fn load_auth_from_env() -> Result<AuthConfigLayer, ConfigError> {
	Ok(AuthConfigLayer {
		dev_mode: env_bool("BEACON_SERVER_AUTH_DEV_MODE"),
		environment: env_var("BEACON_SERVER_ENV"),
		login_url: env_var("BEACON_SERVER_LOGIN_URL"),
		session_cookie_name: env_var("BEACON_SERVER_SESSION_COOKIE_NAME"),
		session_issuer_secret: env_secret("BEACON_SERVER_AUTH_SESSION_ISSUER_SECRET")?,
		session_ttl_hours: env_parse("BEACON_SERVER_SESSION_TTL_HOURS", "u64")?,
	})
}

fn load_search_from_env() -> Result<SearchConfigLayer, ConfigError> {
	Ok(SearchConfigLayer {
		base_url: env_var("BEACON_SERVER_SEARCH_BASE_URL"),
		api_key: env_secret("BEACON_SERVER_SEARCH_API_KEY")?,
		timeout_secs: env_parse("BEACON_SERVER_SEARCH_TIMEOUT_SECS", "u64")?,
	})
}

fn load_discord_from_env() -> Result<DiscordConfigLayer, ConfigError> {
	Ok(DiscordConfigLayer {
		enabled: env_bool("BEACON_SERVER_DISCORD_ENABLED"),
		token: env_secret("BEACON_SERVER_DISCORD_TOKEN")?,
		client_id: env_parse("BEACON_SERVER_DISCORD_CLIENT_ID", "u64")?,
		prefix: env_var("BEACON_SERVER_DISCORD_PREFIX"),
		channel_id: env_parse("BEACON_SERVER_DISCORD_CHANNEL_ID", "u64")?,
		permissions: env_parse("BEACON_SERVER_DISCORD_PERMISSIONS", "u64")?,
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	Ok(LoggingConfigLayer {
		level: env_var("BEACON_SERVER_LOG_LEVEL"),
	})
}
