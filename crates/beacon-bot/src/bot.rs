// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The command bot: gateway events in, command replies out.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use beacon_common_config::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace};

use crate::commands::{BotInfo, CommandContext, CommandRegistry};
use crate::error::BotError;
use crate::events::GatewayEvent;
use crate::gateway::{self, GatewayConfig, DEFAULT_GATEWAY_URL, DEFAULT_INTENTS};
use crate::http::DiscordHttpClient;
use crate::invite::invite_url;
use crate::types::Message;

/// Discord rejects message content longer than this many characters.
pub const MAX_MESSAGE_LEN: usize = 2000;

pub const DEFAULT_PREFIX: &str = "/";

#[derive(Debug, Clone)]
pub struct BotConfig {
	pub token: SecretString,
	pub client_id: u64,
	pub prefix: String,
	/// When set, commands are only accepted in this channel.
	pub home_channel_id: Option<u64>,
	/// Permission bitmask for the invite URL.
	pub permissions: Option<u64>,
	pub intents: u32,
	pub gateway_url: String,
}

impl BotConfig {
	pub fn new(token: SecretString, client_id: u64) -> Self {
		Self {
			token,
			client_id,
			prefix: DEFAULT_PREFIX.to_string(),
			home_channel_id: None,
			permissions: None,
			intents: DEFAULT_INTENTS,
			gateway_url: DEFAULT_GATEWAY_URL.to_string(),
		}
	}

	pub fn invite_url(&self) -> String {
		invite_url(self.client_id, self.permissions)
	}
}

/// Where replies go.
#[async_trait]
pub trait MessageSink: Send + Sync {
	async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), BotError>;
}

#[async_trait]
impl MessageSink for DiscordHttpClient {
	async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), BotError> {
		DiscordHttpClient::send_message(self, channel_id, content).await?;
		Ok(())
	}
}

pub struct CommandBot {
	config: BotConfig,
	registry: CommandRegistry,
	sink: Arc<dyn MessageSink>,
	info: BotInfo,
}

impl std::fmt::Debug for CommandBot {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CommandBot")
			.field("config", &self.config)
			.field("commands", &self.registry.len())
			.finish()
	}
}

impl CommandBot {
	/// Build a bot that replies through the Discord REST API, with the
	/// built-in commands registered.
	pub fn new(config: BotConfig) -> Result<Self, BotError> {
		let http = DiscordHttpClient::new(config.token.clone())?;
		Ok(Self::with_sink(config, Arc::new(http)))
	}

	pub fn with_sink(mut config: BotConfig, sink: Arc<dyn MessageSink>) -> Self {
		if config.prefix.is_empty() {
			debug!("empty command prefix, falling back to default");
			config.prefix = DEFAULT_PREFIX.to_string();
		}

		let info = BotInfo {
			prefix: config.prefix.clone(),
			invite_url: config.invite_url(),
			started_at: Instant::now(),
		};

		Self {
			config,
			registry: CommandRegistry::with_builtins(),
			sink,
			info,
		}
	}

	pub fn registry_mut(&mut self) -> &mut CommandRegistry {
		&mut self.registry
	}

	pub fn invite_url(&self) -> &str {
		&self.info.invite_url
	}

	pub fn config(&self) -> &BotConfig {
		&self.config
	}

	/// Connect to the gateway and handle events until `cancel` fires or the
	/// gateway gives up. A gateway that stops on its own (fatal close code,
	/// reconnect attempts exhausted) is returned as an error.
	#[instrument(skip_all, fields(client_id = self.config.client_id))]
	pub async fn run(self, cancel: CancellationToken) -> Result<(), BotError> {
		let gateway_config = GatewayConfig {
			intents: self.config.intents,
			url: self.config.gateway_url.clone(),
			..GatewayConfig::new(self.config.token.clone())
		};
		let mut gateway = gateway::connect(gateway_config, cancel.clone());

		info!(
			prefix = %self.config.prefix,
			commands = self.registry.len(),
			"bot event loop started"
		);

		loop {
			let event = tokio::select! {
				_ = cancel.cancelled() => break,
				event = gateway.events.recv() => event,
			};

			let Some(event) = event else {
				error!("gateway driver stopped");
				break;
			};

			match event {
				GatewayEvent::Ready(ready) => {
					info!(user = %ready.user.username, "bot ready");
				}
				GatewayEvent::MessageCreate(message) => {
					if let Err(e) = self.dispatch(&message).await {
						error!(error = %e, channel_id = %message.channel_id, "failed to send command reply");
					}
				}
				GatewayEvent::Unknown {
					event_name: Some(name),
					..
				} => {
					trace!(event = %name, "unhandled gateway event");
				}
				_ => {}
			}
		}

		cancel.cancel();
		let result = match gateway.driver.await {
			Ok(result) => result,
			Err(e) => Err(BotError::Gateway(format!("gateway driver task failed: {e}"))),
		};
		match &result {
			Ok(()) => info!("bot stopped"),
			Err(e) => error!(error = %e, "bot stopped after gateway failure"),
		}
		result
	}

	/// Handle one message and post the reply, if any.
	pub async fn dispatch(&self, message: &Message) -> Result<bool, BotError> {
		let Some(reply) = self.reply_to(message) else {
			return Ok(false);
		};
		self.sink
			.send_message(&message.channel_id, &truncate_message(&reply))
			.await?;
		Ok(true)
	}

	/// The reply a message should get, without sending it.
	pub fn reply_to(&self, message: &Message) -> Option<String> {
		if message.author.bot {
			return None;
		}

		if let Some(home) = self.config.home_channel_id {
			if message.channel_id != home.to_string() {
				trace!(channel_id = %message.channel_id, "ignoring message outside home channel");
				return None;
			}
		}

		let (name, args) = parse_command(&self.config.prefix, &message.content)?;
		let Some(command) = self.registry.get(name) else {
			debug!(command = name, "unknown command");
			return None;
		};

		debug!(command = name, author = %message.author.id, "running command");
		let ctx = CommandContext {
			message,
			args: &args,
			bot: &self.info,
			registry: &self.registry,
		};
		command.execute(&ctx)
	}
}

/// Split `"<prefix><name> args..."` into the command name and its arguments.
pub fn parse_command<'a>(prefix: &str, content: &'a str) -> Option<(&'a str, Vec<&'a str>)> {
	let rest = content.strip_prefix(prefix)?;
	let mut words = rest.split_whitespace();
	let name = words.next()?;
	// "/ ping" is not a command.
	if !rest.starts_with(name) {
		return None;
	}
	Some((name, words.collect()))
}

/// Cut `content` to Discord's message limit on a character boundary.
pub fn truncate_message(content: &str) -> String {
	match content.char_indices().nth(MAX_MESSAGE_LEN) {
		Some((idx, _)) => content[..idx].to_string(),
		None => content.to_string(),
	}
}
