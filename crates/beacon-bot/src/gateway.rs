// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Discord gateway (WebSocket) connection.
//!
//! The driver task owns the connection lifecycle:
//! - connect, read HELLO, then IDENTIFY (or RESUME a known session)
//! - heartbeat on the interval from HELLO, first beat jittered
//! - track the sequence number and session id from READY
//! - reconnect with exponential backoff, resuming where Discord allows it
//! - keep outbound frames under 120 per 60 seconds
//!
//! Consumers only see the [`GatewayEvent`] channel in [`GatewayHandle`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use beacon_common_config::SecretString;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::BotError;
use crate::events::{GatewayEvent, OP_HEARTBEAT, OP_HELLO, OP_IDENTIFY, OP_RESUME};
use crate::types::GatewayPayload;

pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// GUILDS | GUILD_MESSAGES | DIRECT_MESSAGES | MESSAGE_CONTENT
pub const DEFAULT_INTENTS: u32 = 1 | 512 | 4096 | 32768;

const SEND_BUDGET_MAX: u32 = 120;
const SEND_BUDGET_WINDOW: Duration = Duration::from_secs(60);
const HELLO_TIMEOUT: Duration = Duration::from_secs(30);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;
type WsRead = SplitStream<WsStream>;

/// Sliding-window limiter for outbound gateway frames.
struct SendRateLimiter {
	timestamps: Vec<Instant>,
	budget: u32,
	window: Duration,
}

impl SendRateLimiter {
	fn new(budget: u32, window: Duration) -> Self {
		Self {
			timestamps: Vec::with_capacity(budget as usize),
			budget,
			window,
		}
	}

	/// How long to wait before the next send, if at all. Does not record.
	fn delay_at(&self, now: Instant) -> Option<Duration> {
		let in_window: Vec<Instant> = self
			.timestamps
			.iter()
			.copied()
			.filter(|&t| now.duration_since(t) < self.window)
			.collect();

		if (in_window.len() as u32) < self.budget {
			return None;
		}

		let oldest = in_window.into_iter().min()?;
		let expires_at = oldest + self.window;
		(expires_at > now).then(|| expires_at - now)
	}

	fn record_at(&mut self, now: Instant) {
		let window = self.window;
		self.timestamps.retain(|&t| now.duration_since(t) < window);
		self.timestamps.push(now);
	}
}

/// How hard the driver tries to get back to READY before giving up.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
	/// Consecutive failed connections allowed without reaching READY.
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
	fn default() -> Self {
		Self {
			max_attempts: 8,
			base_delay: Duration::from_secs(1),
			max_delay: Duration::from_secs(60),
		}
	}
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
	pub token: SecretString,
	pub intents: u32,
	pub url: String,
	pub reconnect: ReconnectPolicy,
}

impl GatewayConfig {
	pub fn new(token: SecretString) -> Self {
		Self {
			token,
			intents: DEFAULT_INTENTS,
			url: DEFAULT_GATEWAY_URL.to_string(),
			reconnect: ReconnectPolicy::default(),
		}
	}
}

#[derive(Debug, Default)]
struct SessionState {
	session_id: Option<String>,
	resume_gateway_url: Option<String>,
	sequence: Option<u64>,
}

/// A running gateway connection.
pub struct GatewayHandle {
	pub events: mpsc::Receiver<GatewayEvent>,
	/// Resolves to `Err` when Discord closed with a fatal code or the driver
	/// ran out of reconnect attempts.
	pub driver: tokio::task::JoinHandle<Result<(), BotError>>,
}

/// Spawn the gateway driver. It runs until `cancel` fires, the event
/// receiver is dropped, Discord closes with a fatal code, or reconnecting
/// fails `max_attempts` times in a row.
pub fn connect(config: GatewayConfig, cancel: CancellationToken) -> GatewayHandle {
	let (event_tx, event_rx) = mpsc::channel::<GatewayEvent>(256);
	let driver = tokio::spawn(gateway_driver(config, event_tx, cancel));
	GatewayHandle {
		events: event_rx,
		driver,
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisconnectReason {
	ShouldResume,
	ShouldReidentify,
	Fatal(u16),
	Shutdown,
}

async fn gateway_driver(
	config: GatewayConfig,
	event_tx: mpsc::Sender<GatewayEvent>,
	cancel: CancellationToken,
) -> Result<(), BotError> {
	let session = Arc::new(Mutex::new(SessionState::default()));
	let mut reconnect_attempts: u32 = 0;

	loop {
		let url = {
			let s = session.lock().await;
			gateway_url(s.resume_gateway_url.as_deref().unwrap_or(&config.url))
		};

		info!(url = %url, "connecting to Discord gateway");

		let connected = tokio::select! {
			_ = cancel.cancelled() => return Ok(()),
			result = tokio_tungstenite::connect_async(url.as_str()) => result,
		};

		let ws_stream = match connected {
			Ok((stream, _)) => stream,
			Err(e) => {
				error!(error = %e, "failed to connect to gateway");
				if !wait_before_reconnect(&mut reconnect_attempts, &config.reconnect, &cancel).await? {
					return Ok(());
				}
				continue;
			}
		};

		let (ws_write, mut ws_read) = ws_stream.split();
		let ws_write = Arc::new(Mutex::new(ws_write));
		let rate_limiter = Arc::new(Mutex::new(SendRateLimiter::new(
			SEND_BUDGET_MAX,
			SEND_BUDGET_WINDOW,
		)));

		let heartbeat_interval = match read_hello(&mut ws_read).await {
			Ok(interval) => interval,
			Err(e) => {
				error!(error = %e, "failed to read HELLO from gateway");
				if !wait_before_reconnect(&mut reconnect_attempts, &config.reconnect, &cancel).await? {
					return Ok(());
				}
				continue;
			}
		};
		info!(interval_ms = heartbeat_interval, "received HELLO");

		let handshake = {
			let s = session.lock().await;
			match (&s.session_id, s.sequence) {
				(Some(session_id), Some(seq)) => {
					info!("sending RESUME");
					resume_payload(config.token.expose(), session_id, seq)
				}
				_ => {
					info!("sending IDENTIFY");
					identify_payload(config.token.expose(), config.intents)
				}
			}
		};

		if let Err(e) = rate_limited_send(&ws_write, &rate_limiter, &handshake).await {
			error!(error = %e, "failed to send handshake");
			if !wait_before_reconnect(&mut reconnect_attempts, &config.reconnect, &cancel).await? {
				return Ok(());
			}
			continue;
		}

		let heartbeat_cancel = cancel.child_token();
		let heartbeat = tokio::spawn(heartbeat_loop(
			Duration::from_millis(heartbeat_interval),
			Arc::clone(&ws_write),
			Arc::clone(&rate_limiter),
			Arc::clone(&session),
			heartbeat_cancel.clone(),
		));

		let reason = read_loop(
			&mut ws_read,
			&ws_write,
			&rate_limiter,
			&event_tx,
			&session,
			&mut reconnect_attempts,
			&cancel,
		)
		.await;

		heartbeat_cancel.cancel();
		heartbeat.abort();
		{
			let mut w = ws_write.lock().await;
			let _ = w.send(WsMessage::Close(None)).await;
		}

		match reason {
			DisconnectReason::ShouldResume => info!("will attempt RESUME"),
			DisconnectReason::ShouldReidentify => {
				info!("session invalidated, will re-IDENTIFY");
				let mut s = session.lock().await;
				s.session_id = None;
				s.sequence = None;
			}
			DisconnectReason::Fatal(code) => {
				error!(close_code = code, "fatal gateway close, bot stopping");
				return Err(BotError::Gateway(format!(
					"gateway closed with fatal code {code}"
				)));
			}
			DisconnectReason::Shutdown => {
				info!("gateway driver shutting down");
				return Ok(());
			}
		}

		if !wait_before_reconnect(&mut reconnect_attempts, &config.reconnect, &cancel).await? {
			return Ok(());
		}
	}
}

/// Sleep for the next backoff step. Returns `Ok(false)` when cancelled while
/// waiting and an error once the policy's attempts are used up.
async fn wait_before_reconnect(
	attempts: &mut u32,
	policy: &ReconnectPolicy,
	cancel: &CancellationToken,
) -> Result<bool, BotError> {
	*attempts += 1;
	if *attempts > policy.max_attempts {
		error!(max_attempts = policy.max_attempts, "exceeded max reconnect attempts, giving up");
		return Err(BotError::Gateway(format!(
			"no READY after {} reconnect attempts",
			policy.max_attempts
		)));
	}

	let delay = backoff_delay(policy, *attempts);
	warn!(
		delay_ms = delay.as_millis() as u64,
		attempt = *attempts,
		"reconnecting after backoff"
	);

	Ok(tokio::select! {
		_ = cancel.cancelled() => false,
		_ = tokio::time::sleep(delay) => true,
	})
}

async fn heartbeat_loop(
	interval: Duration,
	ws_write: Arc<Mutex<WsSink>>,
	rate_limiter: Arc<Mutex<SendRateLimiter>>,
	session: Arc<Mutex<SessionState>>,
	cancel: CancellationToken,
) {
	// First beat after `interval * jitter`, jitter in [0, 1).
	let first = interval.mul_f64(fastrand::f64());
	tokio::select! {
		_ = cancel.cancelled() => return,
		_ = tokio::time::sleep(first) => {}
	}

	let mut ticker = tokio::time::interval(interval);
	loop {
		tokio::select! {
			_ = cancel.cancelled() => {
				debug!("heartbeat task cancelled");
				return;
			}
			_ = ticker.tick() => {
				let seq = session.lock().await.sequence;
				if let Err(e) = rate_limited_send(&ws_write, &rate_limiter, &heartbeat_payload(seq)).await {
					warn!(error = %e, "heartbeat send failed, stopping heartbeat task");
					return;
				}
				debug!(seq = ?seq, "sent heartbeat");
			}
		}
	}
}

async fn read_loop(
	ws_read: &mut WsRead,
	ws_write: &Arc<Mutex<WsSink>>,
	rate_limiter: &Arc<Mutex<SendRateLimiter>>,
	event_tx: &mpsc::Sender<GatewayEvent>,
	session: &Arc<Mutex<SessionState>>,
	reconnect_attempts: &mut u32,
	cancel: &CancellationToken,
) -> DisconnectReason {
	loop {
		let frame = tokio::select! {
			_ = cancel.cancelled() => return DisconnectReason::Shutdown,
			frame = ws_read.next() => frame,
		};

		let frame = match frame {
			Some(Ok(frame)) => frame,
			Some(Err(e)) => {
				warn!(error = %e, "WebSocket read error");
				return DisconnectReason::ShouldResume;
			}
			None => {
				info!("WebSocket stream ended");
				return DisconnectReason::ShouldResume;
			}
		};

		let text = match frame {
			WsMessage::Text(text) => text,
			WsMessage::Close(close) => {
				let code = close.map(|f| u16::from(f.code));
				warn!(close_code = ?code, "WebSocket closed by server");
				return code
					.map(disconnect_for_close_code)
					.unwrap_or(DisconnectReason::ShouldResume);
			}
			_ => continue,
		};

		let payload: GatewayPayload = match serde_json::from_str(&text) {
			Ok(p) => p,
			Err(e) => {
				warn!(error = %e, "failed to parse gateway payload");
				continue;
			}
		};

		if let Some(seq) = payload.s {
			session.lock().await.sequence = Some(seq);
		}

		let event = GatewayEvent::from_payload(payload);
		match &event {
			GatewayEvent::Ready(ready) => {
				let mut s = session.lock().await;
				s.session_id = Some(ready.session_id.clone());
				s.resume_gateway_url = Some(ready.resume_gateway_url.clone());
				*reconnect_attempts = 0;
				info!(session_id = %ready.session_id, user = %ready.user.username, "gateway READY");
			}
			GatewayEvent::HeartbeatRequest => {
				let seq = session.lock().await.sequence;
				if let Err(e) = rate_limited_send(ws_write, rate_limiter, &heartbeat_payload(seq)).await {
					warn!(error = %e, "failed to send requested heartbeat");
				}
				continue;
			}
			GatewayEvent::HeartbeatAck => {
				debug!("heartbeat acknowledged");
				continue;
			}
			GatewayEvent::Reconnect => {
				info!("gateway requested reconnect");
				return DisconnectReason::ShouldResume;
			}
			GatewayEvent::InvalidSession(resumable) => {
				warn!(resumable, "session invalidated");
				// Discord asks for a 1-5s pause before the next handshake.
				tokio::time::sleep(Duration::from_millis(1000 + fastrand::u64(0..4000))).await;
				return if *resumable {
					DisconnectReason::ShouldResume
				} else {
					DisconnectReason::ShouldReidentify
				};
			}
			_ => {}
		}

		if event_tx.send(event).await.is_err() {
			info!("event channel closed by consumer");
			return DisconnectReason::Shutdown;
		}
	}
}

async fn read_hello(stream: &mut WsRead) -> Result<u64, BotError> {
	let frame = tokio::time::timeout(HELLO_TIMEOUT, stream.next())
		.await
		.map_err(|_| BotError::Gateway("timed out waiting for HELLO".to_string()))?
		.ok_or_else(|| BotError::Gateway("stream ended before HELLO".to_string()))??;

	match frame {
		WsMessage::Text(text) => parse_hello(&text),
		other => Err(BotError::Gateway(format!(
			"expected text frame for HELLO, got {other:?}"
		))),
	}
}

async fn rate_limited_send(
	ws_write: &Arc<Mutex<WsSink>>,
	rate_limiter: &Arc<Mutex<SendRateLimiter>>,
	payload: &Value,
) -> Result<(), BotError> {
	loop {
		let delay = rate_limiter.lock().await.delay_at(Instant::now());
		match delay {
			Some(d) => {
				debug!(delay_ms = d.as_millis() as u64, "gateway send rate-limited, waiting");
				tokio::time::sleep(d).await;
			}
			None => break,
		}
	}
	rate_limiter.lock().await.record_at(Instant::now());

	let text = serde_json::to_string(payload)?;
	ws_write.lock().await.send(WsMessage::Text(text)).await?;
	Ok(())
}

/// Ensure the URL carries the API version and encoding query.
fn gateway_url(base: &str) -> String {
	if base.contains("v=10") {
		base.to_string()
	} else if base.contains('?') {
		format!("{base}&v=10&encoding=json")
	} else {
		format!("{base}/?v=10&encoding=json")
	}
}

fn identify_payload(token: &str, intents: u32) -> Value {
	json!({
		"op": OP_IDENTIFY,
		"d": {
			"token": token,
			"intents": intents,
			"properties": {
				"os": std::env::consts::OS,
				"browser": "beacon",
				"device": "beacon"
			}
		}
	})
}

fn resume_payload(token: &str, session_id: &str, seq: u64) -> Value {
	json!({
		"op": OP_RESUME,
		"d": {
			"token": token,
			"session_id": session_id,
			"seq": seq
		}
	})
}

fn heartbeat_payload(seq: Option<u64>) -> Value {
	json!({"op": OP_HEARTBEAT, "d": seq})
}

fn parse_hello(text: &str) -> Result<u64, BotError> {
	let payload: GatewayPayload = serde_json::from_str(text)?;
	if payload.op != OP_HELLO {
		return Err(BotError::Gateway(format!(
			"expected op {OP_HELLO} (HELLO), got op {}",
			payload.op
		)));
	}

	payload
		.d
		.as_ref()
		.and_then(|d| d.get("heartbeat_interval"))
		.and_then(Value::as_u64)
		.ok_or_else(|| BotError::Gateway("HELLO missing heartbeat_interval".to_string()))
}

fn disconnect_for_close_code(code: u16) -> DisconnectReason {
	match code {
		// Authentication failed, invalid shard, sharding required, invalid
		// API version, invalid or disallowed intents.
		4004 | 4010 | 4011 | 4012 | 4013 | 4014 => DisconnectReason::Fatal(code),
		// Invalid sequence or session timed out.
		4007 | 4009 => DisconnectReason::ShouldReidentify,
		_ => DisconnectReason::ShouldResume,
	}
}

/// Exponential backoff with +/-25% jitter, capped at `policy.max_delay`.
fn backoff_delay(policy: &ReconnectPolicy, attempt: u32) -> Duration {
	let base = policy.base_delay.as_secs_f64() * 2f64.powi(attempt.min(6) as i32);
	let jittered = (fastrand::f64() * 0.5 + 0.75) * base;
	Duration::from_secs_f64(jittered.min(policy.max_delay.as_secs_f64()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn gateway_url_adds_version_once() {
		assert_eq!(gateway_url(DEFAULT_GATEWAY_URL), DEFAULT_GATEWAY_URL);
		assert_eq!(
			gateway_url("wss://resume.discord.gg"),
			"wss://resume.discord.gg/?v=10&encoding=json"
		);
		assert_eq!(
			gateway_url("wss://resume.discord.gg/?compress=false"),
			"wss://resume.discord.gg/?compress=false&v=10&encoding=json"
		);
	}

	#[test]
	fn identify_carries_token_and_intents() {
		let payload = identify_payload("tok", DEFAULT_INTENTS);
		assert_eq!(payload["op"], 2);
		assert_eq!(payload["d"]["token"], "tok");
		assert_eq!(payload["d"]["intents"], DEFAULT_INTENTS);
	}

	#[test]
	fn default_intents_include_message_content() {
		assert_ne!(DEFAULT_INTENTS & 32768, 0);
		assert_ne!(DEFAULT_INTENTS & 512, 0);
	}

	#[test]
	fn resume_carries_session_and_sequence() {
		let payload = resume_payload("tok", "sess", 42);
		assert_eq!(payload["op"], 6);
		assert_eq!(payload["d"]["session_id"], "sess");
		assert_eq!(payload["d"]["seq"], 42);
	}

	#[test]
	fn heartbeat_sends_null_before_first_sequence() {
		assert_eq!(heartbeat_payload(None), json!({"op": 1, "d": null}));
		assert_eq!(heartbeat_payload(Some(7)), json!({"op": 1, "d": 7}));
	}

	#[test]
	fn hello_interval_is_parsed() {
		let interval = parse_hello(r#"{"op":10,"d":{"heartbeat_interval":41250}}"#).unwrap();
		assert_eq!(interval, 41250);
	}

	#[test]
	fn hello_with_wrong_opcode_is_rejected() {
		assert!(parse_hello(r#"{"op":0,"d":{"heartbeat_interval":1}}"#).is_err());
		assert!(parse_hello(r#"{"op":10,"d":{}}"#).is_err());
		assert!(parse_hello("nope").is_err());
	}

	#[test]
	fn close_codes() {
		assert_eq!(disconnect_for_close_code(4004), DisconnectReason::Fatal(4004));
		assert_eq!(disconnect_for_close_code(4014), DisconnectReason::Fatal(4014));
		assert_eq!(disconnect_for_close_code(4009), DisconnectReason::ShouldReidentify);
		assert_eq!(disconnect_for_close_code(1001), DisconnectReason::ShouldResume);
		assert_eq!(disconnect_for_close_code(4000), DisconnectReason::ShouldResume);
	}

	#[test]
	fn rate_limiter_blocks_when_budget_spent() {
		let mut limiter = SendRateLimiter::new(2, Duration::from_secs(60));
		let start = Instant::now();
		assert!(limiter.delay_at(start).is_none());
		limiter.record_at(start);
		limiter.record_at(start);

		let delay = limiter.delay_at(start + Duration::from_secs(10)).unwrap();
		assert_eq!(delay, Duration::from_secs(50));
		assert!(limiter.delay_at(start + Duration::from_secs(61)).is_none());
	}

	proptest! {
		#[test]
		fn backoff_never_exceeds_cap(attempt in 0u32..100) {
			let delay = backoff_delay(&ReconnectPolicy::default(), attempt);
			prop_assert!(delay <= Duration::from_secs(60));
			prop_assert!(delay >= Duration::from_millis(750));
		}
	}

	mod socket {
		use super::*;
		use beacon_common_config::Secret;
		use std::sync::atomic::{AtomicUsize, Ordering};
		use tokio::net::TcpListener;
		use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
		use tokio_tungstenite::tungstenite::protocol::CloseFrame;

		/// A gateway that sends HELLO, reads the handshake, optionally sends
		/// READY, then closes with `close_code`. Returns its URL and a
		/// connection counter.
		async fn scripted_gateway(close_code: u16, send_ready: bool) -> (String, Arc<AtomicUsize>) {
			let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
			let url = format!("ws://{}", listener.local_addr().unwrap());
			let connections = Arc::new(AtomicUsize::new(0));

			let counter = Arc::clone(&connections);
			let resume_url = url.clone();
			tokio::spawn(async move {
				while let Ok((tcp, _)) = listener.accept().await {
					counter.fetch_add(1, Ordering::SeqCst);
					let Ok(mut ws) = tokio_tungstenite::accept_async(tcp).await else {
						continue;
					};
					let hello = json!({"op": 10, "d": {"heartbeat_interval": 45000}});
					let _ = ws.send(WsMessage::Text(hello.to_string())).await;
					let _ = ws.next().await;
					if send_ready {
						let ready = json!({
							"op": 0,
							"t": "READY",
							"s": 1,
							"d": {
								"user": {"id": "1", "username": "beacon", "bot": true},
								"session_id": "abc",
								"resume_gateway_url": resume_url,
							}
						});
						let _ = ws.send(WsMessage::Text(ready.to_string())).await;
					}
					let _ = ws
						.send(WsMessage::Close(Some(CloseFrame {
							code: CloseCode::from(close_code),
							reason: "scripted close".into(),
						})))
						.await;
				}
			});

			(url, connections)
		}

		fn config_for(url: String, max_attempts: u32) -> GatewayConfig {
			GatewayConfig {
				url,
				reconnect: ReconnectPolicy {
					max_attempts,
					base_delay: Duration::from_millis(1),
					max_delay: Duration::from_millis(5),
				},
				..GatewayConfig::new(Secret::new("bad-token".to_string()))
			}
		}

		#[tokio::test]
		async fn authentication_failure_ends_driver_with_error() {
			let (url, connections) = scripted_gateway(4004, false).await;
			let handle = connect(config_for(url, 3), CancellationToken::new());

			let result = tokio::time::timeout(Duration::from_secs(10), handle.driver)
				.await
				.unwrap()
				.unwrap();
			match result {
				Err(BotError::Gateway(message)) => assert!(message.contains("4004")),
				other => panic!("expected gateway error, got {other:?}"),
			}
			assert_eq!(connections.load(Ordering::SeqCst), 1);
		}

		#[tokio::test]
		async fn handshake_without_ready_exhausts_attempts() {
			let (url, connections) = scripted_gateway(1001, false).await;
			let handle = connect(config_for(url, 2), CancellationToken::new());

			let result = tokio::time::timeout(Duration::from_secs(10), handle.driver)
				.await
				.unwrap()
				.unwrap();
			assert!(matches!(result, Err(BotError::Gateway(_))));
			assert_eq!(connections.load(Ordering::SeqCst), 3);
		}

		#[tokio::test]
		async fn ready_resets_attempts() {
			let (url, connections) = scripted_gateway(1001, true).await;
			let cancel = CancellationToken::new();
			let mut handle = connect(config_for(url, 1), cancel.clone());

			let mut ready_count = 0;
			while ready_count < 4 {
				let event = tokio::time::timeout(Duration::from_secs(10), handle.events.recv())
					.await
					.unwrap()
					.unwrap();
				if matches!(event, GatewayEvent::Ready(_)) {
					ready_count += 1;
				}
			}
			cancel.cancel();

			let result = tokio::time::timeout(Duration::from_secs(10), handle.driver)
				.await
				.unwrap()
				.unwrap();
			assert!(result.is_ok());
			assert!(connections.load(Ordering::SeqCst) >= 4);
		}
	}
}
