// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections. Each has a `*ConfigLayer` (partial, mergeable) and a
//! resolved `*Config`.

mod auth;
mod discord;
mod http;
mod logging;
mod search;

pub use auth::{AuthConfig, AuthConfigLayer};
pub use discord::{DiscordConfig, DiscordConfigLayer, DEFAULT_CHANNEL_ID, DEFAULT_PREFIX};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use search::{SearchConfig, SearchConfigLayer, DEFAULT_SEARCH_TIMEOUT_SECS};
