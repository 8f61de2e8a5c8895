// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Client for the upstream search API behind the Beacon search proxy.
//!
//! One call per query: `GET <base_url>?q=<query>`, no retries, no caching.
//! A 200 response must carry a JSON array of objects with string `title` and
//! `description` fields; anything else is reported as a [`SearchError`].

pub mod client;
pub mod error;
pub mod types;

pub use client::{SearchBackend, SearchClient};
pub use error::SearchError;
pub use types::{parse_results, SearchQuery, SearchResult};
