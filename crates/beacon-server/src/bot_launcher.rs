// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Starts the Discord command bot alongside the HTTP server.

use beacon_bot::{BotConfig, BotError, CommandBot};
use beacon_server_config::DiscordConfig;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Bot settings for a resolved `[discord]` section.
pub fn bot_config(discord: &DiscordConfig) -> BotConfig {
	BotConfig {
		prefix: discord.prefix.clone(),
		home_channel_id: Some(discord.channel_id),
		permissions: discord.permissions,
		..BotConfig::new(discord.token.clone(), discord.client_id)
	}
}

/// Build the bot with its built-in commands, announce the invite URL and run
/// it on its own task until `cancel` fires.
pub fn launch(
	discord: &DiscordConfig,
	cancel: CancellationToken,
) -> Result<JoinHandle<Result<(), BotError>>, BotError> {
	let bot = CommandBot::new(bot_config(discord))?;

	tracing::info!(
		client_id = discord.client_id,
		channel_id = discord.channel_id,
		prefix = %discord.prefix,
		invite_url = %bot.invite_url(),
		"launching Discord bot"
	);
	println!("Invite the bot with: {}", bot.invite_url());

	Ok(tokio::spawn(bot.run(cancel)))
}
