// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use beacon_common_http::RetryableError;
use thiserror::Error;

/// Errors from the Discord REST API client.
#[derive(Debug, Error)]
pub enum HttpError {
	#[error("Discord API error {status} on {route}: {body}")]
	Api {
		status: u16,
		body: String,
		route: String,
		/// Wait requested by Discord on a 429.
		retry_after: Option<Duration>,
	},

	#[error("HTTP transport error: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("serialization error: {0}")]
	Serde(#[from] serde_json::Error),
}

impl RetryableError for HttpError {
	fn is_retryable(&self) -> bool {
		match self {
			HttpError::Api { status, .. } => *status == 429 || *status >= 500,
			HttpError::Transport(e) => RetryableError::is_retryable(e),
			HttpError::Serde(_) => false,
		}
	}

	fn retry_after(&self) -> Option<Duration> {
		match self {
			HttpError::Api { retry_after, .. } => *retry_after,
			_ => None,
		}
	}
}

/// Top-level bot errors.
#[derive(Debug, Error)]
pub enum BotError {
	#[error("gateway error: {0}")]
	Gateway(String),

	#[error("websocket error: {0}")]
	WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

	#[error(transparent)]
	Http(#[from] HttpError),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("configuration error: {0}")]
	Configuration(String),
}
