// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for Beacon.
//!
//! - [`builder`]: reqwest client builder with the Beacon User-Agent
//! - [`retry`]: exponential backoff for callers that opt in (the Discord REST
//!   client does; the search proxy deliberately does not)

mod client;
mod retry;

pub use client::{builder, new_client_with_timeout, user_agent};
pub use retry::{retry, RetryConfig, RetryableError};
