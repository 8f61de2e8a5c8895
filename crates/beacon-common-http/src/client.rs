// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Creates a client builder carrying the standard Beacon User-Agent.
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a client with the standard User-Agent and a whole-request timeout.
///
/// The timeout covers connect, send and body download, so a slow upstream
/// surfaces as a timeout error rather than a hung handler.
pub fn new_client_with_timeout(timeout: Duration) -> Result<Client, reqwest::Error> {
	builder().timeout(timeout).build()
}

/// Returns the standard Beacon User-Agent string: `beacon/{version}`.
pub fn user_agent() -> String {
	format!("beacon/{}", env!("CARGO_PKG_VERSION"))
}
