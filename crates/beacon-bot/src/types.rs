// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The subset of Discord wire types the bot reads and writes.

use serde::{Deserialize, Serialize};

/// Discord IDs arrive as decimal strings.
pub type Snowflake = String;

/// Raw gateway frame: `{"op": .., "d": .., "s": .., "t": ..}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayPayload {
	pub op: u8,
	#[serde(default)]
	pub d: Option<serde_json::Value>,
	#[serde(default)]
	pub s: Option<u64>,
	#[serde(default)]
	pub t: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DiscordUser {
	pub id: Snowflake,
	pub username: String,
	#[serde(default)]
	pub bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Message {
	pub id: Snowflake,
	pub channel_id: Snowflake,
	#[serde(default)]
	pub guild_id: Option<Snowflake>,
	pub author: DiscordUser,
	#[serde(default)]
	pub content: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReadyEvent {
	pub user: DiscordUser,
	pub session_id: String,
	pub resume_gateway_url: String,
}

/// Body of `POST /channels/{id}/messages`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateMessage {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
}

impl CreateMessage {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn content(mut self, content: impl Into<String>) -> Self {
		self.content = Some(content.into());
		self
	}
}
