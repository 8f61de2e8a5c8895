// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Upstream search API client.

use std::time::Duration;

use async_trait::async_trait;
use beacon_common_config::SecretString;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, instrument, trace};
use url::Url;

use crate::error::SearchError;
use crate::types::{parse_results, SearchQuery, SearchResult};

/// Anything that can answer a search query. The HTTP handler depends on this
/// rather than on [`SearchClient`] so it can be exercised without a network.
#[async_trait]
pub trait SearchBackend: Send + Sync {
	async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError>;
}

/// Client for the configured upstream search API.
#[derive(Debug, Clone)]
pub struct SearchClient {
	http_client: Client,
	base_url: Url,
	api_key: Option<SecretString>,
}

impl SearchClient {
	/// Creates a client for `base_url`. `timeout` bounds the whole request,
	/// including reading the body.
	pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SearchError> {
		let base_url = Url::parse(base_url)
			.map_err(|e| SearchError::Configuration(format!("invalid base URL '{base_url}': {e}")))?;

		let http_client = beacon_common_http::new_client_with_timeout(timeout)
			.map_err(|e| SearchError::Configuration(format!("failed to build HTTP client: {e}")))?;

		Ok(Self {
			http_client,
			base_url,
			api_key: None,
		})
	}

	/// Sends `key` as a bearer token on every request.
	pub fn with_api_key(mut self, key: SecretString) -> Self {
		self.api_key = Some(key);
		self
	}

	/// Base URL with `q` appended. Query pairs already on the base URL are kept.
	pub fn request_url(&self, query: &SearchQuery) -> Url {
		let mut url = self.base_url.clone();
		url.query_pairs_mut().append_pair("q", &query.q);
		url
	}
}

#[async_trait]
impl SearchBackend for SearchClient {
	/// Performs exactly one GET against the upstream API.
	#[instrument(skip(self), fields(query = %query.q))]
	async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
		let url = self.request_url(query);
		debug!(url = %self.base_url, "Sending search request upstream");

		let mut request = self.http_client.get(url);
		if let Some(key) = &self.api_key {
			request = request.bearer_auth(key.expose());
		}

		let response = request.send().await.map_err(|e| {
			if e.is_timeout() {
				error!("Search request timed out");
				return SearchError::Timeout;
			}
			error!(error = %e, "Network error during search request");
			SearchError::Network(e)
		})?;

		let status = response.status();
		debug!(status = %status, "Received response from search API");

		match status {
			StatusCode::OK => {}
			StatusCode::UNAUTHORIZED => {
				error!(status = status.as_u16(), "Search API rejected credentials");
				return Err(SearchError::Unauthorized);
			}
			_ => {
				let body = response.text().await.unwrap_or_default();
				error!(status = status.as_u16(), body = %body, "Unexpected search API status");
				return Err(SearchError::UpstreamStatus {
					status: status.as_u16(),
					body,
				});
			}
		}

		let body = response.text().await.map_err(|e| {
			if e.is_timeout() {
				error!("Timed out reading search response body");
				return SearchError::Timeout;
			}
			error!(error = %e, "Failed to read search response body");
			SearchError::Network(e)
		})?;

		trace!(body = %body, "Response body");

		let results = parse_results(&body).inspect_err(|e| {
			if let SearchError::InvalidResponse { reason, body } = e {
				error!(reason = %reason, body = %body, "Malformed search response");
			}
		})?;

		debug!(result_count = results.len(), "Search completed");
		Ok(results)
	}
}
