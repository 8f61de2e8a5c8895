// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Beacon server and its bot launcher.
//!
//! Sources are merged in precedence order (highest wins):
//! 1. Environment variables (`BEACON_SERVER_*`, secrets also via `*_FILE`)
//! 2. Config file (`/etc/beacon/server.toml`, or the path passed to
//!    [`load_config_with_file`])
//! 3. Built-in defaults
//!
//! ```ignore
//! let config = beacon_server_config::load_config()?;
//! println!("listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub auth: AuthConfig,
	pub search: SearchConfig,
	/// `None` when the bot is disabled or its credentials are missing.
	pub discord: Option<DiscordConfig>,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}

	/// Log the resolved configuration without secrets. Call once a tracing
	/// subscriber is installed.
	pub fn log_summary(&self) {
		info!(
			host = %self.http.host,
			port = self.http.port,
			environment = %self.auth.environment,
			dev_mode = self.auth.dev_mode,
			login_url = %self.auth.login_url,
			session_issuing = self.auth.session_issuer_secret.is_some(),
			session_ttl_secs = self.auth.session_ttl.as_secs(),
			search_configured = self.search.is_configured(),
			search_timeout_secs = self.search.timeout.as_secs(),
			discord_configured = self.discord.is_some(),
			log_level = %self.logging.level,
			"Server configuration loaded"
		);
	}
}

/// Load configuration from defaults, the system config file, and the environment.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::required(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize();
	let search = layer.search.unwrap_or_default().finalize();
	let discord = layer.discord.and_then(|l| l.finalize());
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&auth, &search)?;

	Ok(ServerConfig {
		http,
		auth,
		search,
		discord,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(auth: &AuthConfig, search: &SearchConfig) -> Result<(), ConfigError> {
	if auth.dev_mode && auth.is_production() {
		return Err(ConfigError::Validation(
			"BEACON_SERVER_AUTH_DEV_MODE=1 is set while BEACON_SERVER_ENV=production. \
			 Remove BEACON_SERVER_AUTH_DEV_MODE or set BEACON_SERVER_ENV to a non-production value."
				.to_string(),
		));
	}

	if let Some(base_url) = &search.base_url {
		let parsed = url::Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
			key: "search.base_url".to_string(),
			message: format!("'{base_url}' is not a valid URL: {e}"),
		})?;
		if !matches!(parsed.scheme(), "http" | "https") {
			return Err(ConfigError::InvalidValue {
				key: "search.base_url".to_string(),
				message: format!("unsupported scheme '{}'", parsed.scheme()),
			});
		}
	}

	if auth.session_ttl.is_zero() {
		return Err(ConfigError::InvalidValue {
			key: "auth.session_ttl_hours".to_string(),
			message: "sessions must live for at least one hour".to_string(),
		});
	}

	if search.timeout.is_zero() {
		return Err(ConfigError::InvalidValue {
			key: "search.timeout_secs".to_string(),
			message: "timeout must be at least one second".to_string(),
		});
	}

	Ok(())
}
