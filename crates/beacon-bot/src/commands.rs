// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Command registry and the built-in commands.
//!
//! Commands are registered explicitly at startup; there is no discovery.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::types::Message;

/// Facts about the running bot that commands may report.
#[derive(Debug, Clone)]
pub struct BotInfo {
	pub prefix: String,
	pub invite_url: String,
	pub started_at: Instant,
}

pub struct CommandContext<'a> {
	pub message: &'a Message,
	/// Whitespace-separated words after the command name.
	pub args: &'a [&'a str],
	pub bot: &'a BotInfo,
	pub registry: &'a CommandRegistry,
}

pub trait Command: Send + Sync {
	fn name(&self) -> &'static str;

	fn description(&self) -> &'static str;

	/// Returns the reply to post, or `None` to stay silent.
	fn execute(&self, ctx: &CommandContext<'_>) -> Option<String>;
}

#[derive(Default)]
pub struct CommandRegistry {
	commands: BTreeMap<&'static str, Box<dyn Command>>,
}

impl CommandRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry holding `ping`, `help`, `invite` and `uptime`.
	pub fn with_builtins() -> Self {
		let mut registry = Self::new();
		registry.register(Ping);
		registry.register(Help);
		registry.register(Invite);
		registry.register(Uptime);
		registry
	}

	/// Add a command, replacing any existing command with the same name.
	pub fn register(&mut self, command: impl Command + 'static) {
		self.commands.insert(command.name(), Box::new(command));
	}

	pub fn get(&self, name: &str) -> Option<&dyn Command> {
		self.commands.get(name).map(|c| c.as_ref())
	}

	/// Registered commands ordered by name.
	pub fn iter(&self) -> impl Iterator<Item = &dyn Command> {
		self.commands.values().map(|c| c.as_ref())
	}

	pub fn len(&self) -> usize {
		self.commands.len()
	}

	pub fn is_empty(&self) -> bool {
		self.commands.is_empty()
	}
}

pub struct Ping;

impl Command for Ping {
	fn name(&self) -> &'static str {
		"ping"
	}

	fn description(&self) -> &'static str {
		"Check that the bot is alive"
	}

	fn execute(&self, _ctx: &CommandContext<'_>) -> Option<String> {
		Some("Pong!".to_string())
	}
}

pub struct Help;

impl Command for Help {
	fn name(&self) -> &'static str {
		"help"
	}

	fn description(&self) -> &'static str {
		"List available commands"
	}

	fn execute(&self, ctx: &CommandContext<'_>) -> Option<String> {
		let mut reply = String::from("Available commands:");
		for command in ctx.registry.iter() {
			reply.push_str(&format!(
				"\n`{}{}` - {}",
				ctx.bot.prefix,
				command.name(),
				command.description()
			));
		}
		Some(reply)
	}
}

pub struct Invite;

impl Command for Invite {
	fn name(&self) -> &'static str {
		"invite"
	}

	fn description(&self) -> &'static str {
		"Get a link to add the bot to your server"
	}

	fn execute(&self, ctx: &CommandContext<'_>) -> Option<String> {
		Some(format!("Invite me with: {}", ctx.bot.invite_url))
	}
}

pub struct Uptime;

impl Command for Uptime {
	fn name(&self) -> &'static str {
		"uptime"
	}

	fn description(&self) -> &'static str {
		"Show how long the bot has been running"
	}

	fn execute(&self, ctx: &CommandContext<'_>) -> Option<String> {
		Some(format!(
			"Up for {}",
			format_duration(ctx.bot.started_at.elapsed())
		))
	}
}

/// `3d 4h 5m 6s`, dropping leading zero units.
pub fn format_duration(duration: Duration) -> String {
	let total = duration.as_secs();
	let units = [
		(total / 86_400, "d"),
		((total % 86_400) / 3_600, "h"),
		((total % 3_600) / 60, "m"),
		(total % 60, "s"),
	];

	let parts: Vec<String> = units
		.iter()
		.skip_while(|(value, unit)| *value == 0 && *unit != "s")
		.map(|(value, unit)| format!("{value}{unit}"))
		.collect();
	parts.join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::DiscordUser;

	fn message() -> Message {
		Message {
			id: "1".to_string(),
			channel_id: "2".to_string(),
			guild_id: None,
			author: DiscordUser {
				id: "3".to_string(),
				username: "ada".to_string(),
				bot: false,
			},
			content: String::new(),
		}
	}

	fn info() -> BotInfo {
		BotInfo {
			prefix: "/".to_string(),
			invite_url: "https://discord.com/oauth2/authorize?client_id=1&scope=bot".to_string(),
			started_at: Instant::now(),
		}
	}

	fn run(registry: &CommandRegistry, name: &str) -> Option<String> {
		let msg = message();
		let bot = info();
		let ctx = CommandContext {
			message: &msg,
			args: &[],
			bot: &bot,
			registry,
		};
		registry.get(name)?.execute(&ctx)
	}

	#[test]
	fn builtins_are_registered() {
		let registry = CommandRegistry::with_builtins();
		let names: Vec<&str> = registry.iter().map(|c| c.name()).collect();
		assert_eq!(names, vec!["help", "invite", "ping", "uptime"]);
	}

	#[test]
	fn ping_replies_pong() {
		let registry = CommandRegistry::with_builtins();
		assert_eq!(run(&registry, "ping").as_deref(), Some("Pong!"));
	}

	#[test]
	fn help_lists_every_command_with_prefix() {
		let registry = CommandRegistry::with_builtins();
		let reply = run(&registry, "help").unwrap();
		for command in registry.iter() {
			assert!(reply.contains(&format!("`/{}`", command.name())));
			assert!(reply.contains(command.description()));
		}
	}

	#[test]
	fn invite_includes_url() {
		let registry = CommandRegistry::with_builtins();
		let reply = run(&registry, "invite").unwrap();
		assert!(reply.contains("client_id=1&scope=bot"));
	}

	#[test]
	fn uptime_reports_duration() {
		let registry = CommandRegistry::with_builtins();
		assert!(run(&registry, "uptime").unwrap().starts_with("Up for "));
	}

	#[test]
	fn unknown_command_is_none() {
		let registry = CommandRegistry::with_builtins();
		assert!(registry.get("nope").is_none());
	}

	#[test]
	fn register_replaces_same_name() {
		struct LoudPing;
		impl Command for LoudPing {
			fn name(&self) -> &'static str {
				"ping"
			}
			fn description(&self) -> &'static str {
				"Loud"
			}
			fn execute(&self, _ctx: &CommandContext<'_>) -> Option<String> {
				Some("PONG!".to_string())
			}
		}

		let mut registry = CommandRegistry::with_builtins();
		registry.register(LoudPing);
		assert_eq!(registry.len(), 4);
		assert_eq!(run(&registry, "ping").as_deref(), Some("PONG!"));
	}

	#[test]
	fn duration_formatting() {
		assert_eq!(format_duration(Duration::from_secs(0)), "0s");
		assert_eq!(format_duration(Duration::from_secs(59)), "59s");
		assert_eq!(format_duration(Duration::from_secs(61)), "1m 1s");
		assert_eq!(format_duration(Duration::from_secs(3_600)), "1h 0m 0s");
		assert_eq!(format_duration(Duration::from_secs(90_061)), "1d 1h 1m 1s");
	}
}
