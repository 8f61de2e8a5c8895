// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Typed gateway events.
//!
//! The gateway driver turns every [`GatewayPayload`] into a [`GatewayEvent`]
//! so the bot can pattern-match instead of poking at raw JSON.

use tracing::warn;

use crate::types::{GatewayPayload, Message, ReadyEvent};

pub const OP_DISPATCH: u8 = 0;
pub const OP_HEARTBEAT: u8 = 1;
pub const OP_IDENTIFY: u8 = 2;
pub const OP_RESUME: u8 = 6;
pub const OP_RECONNECT: u8 = 7;
pub const OP_INVALID_SESSION: u8 = 9;
pub const OP_HELLO: u8 = 10;
pub const OP_HEARTBEAT_ACK: u8 = 11;

#[derive(Debug, Clone)]
pub enum GatewayEvent {
	Ready(ReadyEvent),
	MessageCreate(Message),
	/// Op 1 from the server: heartbeat immediately.
	HeartbeatRequest,
	HeartbeatAck,
	/// Op 7.
	Reconnect,
	/// Op 9. `true` when the session may be resumed.
	InvalidSession(bool),
	Unknown {
		event_name: Option<String>,
		op: u8,
	},
}

impl GatewayEvent {
	/// Never fails; anything unrecognised or unparseable becomes `Unknown`.
	pub fn from_payload(payload: GatewayPayload) -> Self {
		match payload.op {
			OP_DISPATCH => Self::parse_dispatch(payload.t, payload.d),
			OP_HEARTBEAT => GatewayEvent::HeartbeatRequest,
			OP_RECONNECT => GatewayEvent::Reconnect,
			OP_INVALID_SESSION => GatewayEvent::InvalidSession(
				payload.d.as_ref().and_then(|v| v.as_bool()).unwrap_or(false),
			),
			OP_HEARTBEAT_ACK => GatewayEvent::HeartbeatAck,
			op => GatewayEvent::Unknown {
				event_name: payload.t,
				op,
			},
		}
	}

	fn parse_dispatch(event_name: Option<String>, data: Option<serde_json::Value>) -> Self {
		let unknown = GatewayEvent::Unknown {
			event_name: event_name.clone(),
			op: OP_DISPATCH,
		};

		let (Some(name), Some(d)) = (event_name.as_deref(), data) else {
			return unknown;
		};

		match name {
			"READY" => match serde_json::from_value::<ReadyEvent>(d) {
				Ok(ready) => GatewayEvent::Ready(ready),
				Err(e) => {
					warn!(event = name, error = %e, "failed to parse READY payload");
					unknown
				}
			},
			"MESSAGE_CREATE" => match serde_json::from_value::<Message>(d) {
				Ok(msg) => GatewayEvent::MessageCreate(msg),
				Err(e) => {
					warn!(event = name, error = %e, "failed to parse MESSAGE_CREATE payload");
					unknown
				}
			},
			_ => unknown,
		}
	}
}
