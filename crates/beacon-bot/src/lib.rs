// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Discord command bot.
//!
//! ```ignore
//! let bot = CommandBot::new(BotConfig::new(token, client_id))?;
//! println!("{}", bot.invite_url());
//! tokio::spawn(bot.run(cancel.child_token()));
//! ```

pub mod bot;
pub mod commands;
pub mod error;
pub mod events;
pub mod gateway;
pub mod http;
pub mod invite;
pub mod types;

pub use bot::{parse_command, truncate_message, BotConfig, CommandBot, MessageSink, MAX_MESSAGE_LEN};
pub use commands::{BotInfo, Command, CommandContext, CommandRegistry};
pub use error::{BotError, HttpError};
pub use events::GatewayEvent;
pub use http::DiscordHttpClient;
pub use invite::invite_url;
