// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the upstream search client.

use beacon_common_http::RetryableError;
use thiserror::Error;

/// Failures of a single upstream search call.
#[derive(Debug, Error)]
pub enum SearchError {
	/// Upstream answered 401.
	#[error("search API rejected our credentials")]
	Unauthorized,

	/// Upstream answered with a status other than 200 or 401.
	#[error("search API returned status {status}")]
	UpstreamStatus { status: u16, body: String },

	/// A 200 response whose body is not a JSON array of results.
	#[error("invalid response from search API: {reason}")]
	InvalidResponse { reason: String, body: String },

	#[error("search API request timed out")]
	Timeout,

	/// Connection refused, DNS failure, reset, or a failed body read.
	#[error("network error talking to search API: {0}")]
	Network(#[from] reqwest::Error),

	#[error("invalid search client configuration: {0}")]
	Configuration(String),
}

impl RetryableError for SearchError {
	/// Whether a caller could reasonably try again later. The proxy makes a
	/// single upstream call; `/search/results` sends `Retry-After` when this
	/// holds.
	fn is_retryable(&self) -> bool {
		match self {
			SearchError::Timeout => true,
			SearchError::Network(e) => e.is_retryable() || e.is_request() || e.is_body(),
			SearchError::UpstreamStatus { status, .. } => *status == 429 || *status >= 500,
			SearchError::Unauthorized
			| SearchError::InvalidResponse { .. }
			| SearchError::Configuration(_) => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn timeout_is_retryable() {
		assert!(SearchError::Timeout.is_retryable());
	}

	#[test]
	fn auth_and_shape_errors_are_not_retryable() {
		assert!(!SearchError::Unauthorized.is_retryable());
		assert!(!SearchError::InvalidResponse {
			reason: "expected array".to_string(),
			body: "{}".to_string(),
		}
		.is_retryable());
	}

	#[test]
	fn upstream_server_errors_are_retryable() {
		let err = |status| SearchError::UpstreamStatus {
			status,
			body: String::new(),
		};
		assert!(err(503).is_retryable());
		assert!(err(429).is_retryable());
		assert!(!err(404).is_retryable());
	}
}
