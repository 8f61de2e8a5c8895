// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Beacon server binary.

use std::path::PathBuf;
use std::sync::Arc;

use beacon_server::{bot_launcher, create_app_state, create_router, session_purge, version};
use beacon_server_auth::{InMemorySessionStore, SessionStore};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Beacon server - authenticated search proxy with a Discord command bot.
#[derive(Parser, Debug)]
#[command(name = "beacon-server", about = "Authenticated search proxy server", version)]
struct Args {
	/// Config file to read instead of /etc/beacon/server.toml
	#[arg(long, env = "BEACON_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
	/// Print the Discord bot invite URL and exit
	Invite,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => beacon_server_config::load_config_with_file(path)?,
		None => beacon_server_config::load_config()?,
	};

	if let Some(Command::Invite) = args.command {
		let discord = config
			.discord
			.as_ref()
			.ok_or("Discord is not configured: set BEACON_SERVER_DISCORD_TOKEN and BEACON_SERVER_DISCORD_CLIENT_ID")?;
		println!("{}", bot_launcher::bot_config(discord).invite_url());
		return Ok(());
	}

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	config.log_summary();
	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		dev_mode = config.auth.dev_mode,
		"starting beacon-server"
	);

	let session_store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
	let state = create_app_state(&config, session_store.clone())?;
	if config.auth.session_issuer_secret.is_none() && !config.auth.dev_mode {
		tracing::warn!(
			"BEACON_SERVER_AUTH_SESSION_ISSUER_SECRET not set; no sessions can be issued and every search redirects to login"
		);
	}

	let shutdown = CancellationToken::new();
	let purge_handle = session_purge::spawn_purge_task(
		session_store,
		session_purge::DEFAULT_PURGE_INTERVAL,
		shutdown.child_token(),
	);
	let bot_handle = match &config.discord {
		Some(discord) => Some(bot_launcher::launch(discord, shutdown.child_token())?),
		None => {
			tracing::info!("Discord bot not configured");
			None
		}
	};

	let app = create_router(state).layer(
		CorsLayer::new()
			.allow_origin(Any)
			.allow_methods(Any)
			.allow_headers(Any),
	);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);
	let listener = tokio::net::TcpListener::bind(&addr).await?;

	let server_shutdown = shutdown.clone();
	let result = axum::serve(listener, app)
		.with_graceful_shutdown(async move {
			tokio::select! {
				_ = tokio::signal::ctrl_c() => tracing::info!("Received shutdown signal"),
				_ = server_shutdown.cancelled() => {}
			}
			server_shutdown.cancel();
		})
		.await;
	if let Err(e) = result {
		tracing::error!(error = %e, "Server error");
	}

	shutdown.cancel();
	if let Err(e) = purge_handle.await {
		tracing::error!(error = %e, "session purge task failed");
	}
	if let Some(handle) = bot_handle {
		match handle.await {
			Ok(Ok(())) => {}
			Ok(Err(e)) => tracing::error!(error = %e, "Discord bot stopped with an error"),
			Err(e) => tracing::error!(error = %e, "Discord bot task failed"),
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
