// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Query and result types for the upstream search API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SearchError;

/// The caller's search request. Only presence of `q` is checked; the value
/// is forwarded untrimmed.
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
	/// Search text, passed through to the upstream API as-is.
	pub q: String,
}

impl SearchQuery {
	pub fn new(q: impl Into<String>) -> Self {
		Self { q: q.into() }
	}
}

/// One upstream result. `title` and `description` are required; any other
/// fields the upstream sends are kept in `extra` and rendered back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
	pub title: String,
	pub description: String,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl SearchResult {
	pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			description: description.into(),
			extra: Map::new(),
		}
	}
}

/// Parse a 200 response body. Either every element is a valid result or the
/// whole body is rejected; partial result sets are never returned.
pub fn parse_results(body: &str) -> Result<Vec<SearchResult>, SearchError> {
	serde_json::from_str(body).map_err(|e| SearchError::InvalidResponse {
		reason: e.to_string(),
		body: body.to_string(),
	})
}
