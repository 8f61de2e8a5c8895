// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Discord REST API client.
//!
//! Every call goes through [`DiscordHttpClient::request`] so the bot
//! authorization header and 429/5xx retry live in one place.

use std::time::Duration;

use beacon_common_config::SecretString;
use beacon_common_http::{retry, RetryConfig};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::HttpError;
use crate::types::{CreateMessage, Message};

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Cheap to clone; the reqwest client is reference counted.
#[derive(Debug, Clone)]
pub struct DiscordHttpClient {
	http_client: Client,
	base_url: String,
	token: SecretString,
	retry_config: RetryConfig,
}

impl DiscordHttpClient {
	pub fn new(token: SecretString) -> Result<Self, HttpError> {
		Ok(Self {
			http_client: beacon_common_http::new_client_with_timeout(REQUEST_TIMEOUT)?,
			base_url: DEFAULT_API_BASE.to_string(),
			token,
			retry_config: RetryConfig::default(),
		})
	}

	/// Point the client at a different API root.
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into().trim_end_matches('/').to_string();
		self
	}

	pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
		self.retry_config = retry_config;
		self
	}

	/// Send a request to `{base_url}/{path}`, retrying on 429 and 5xx.
	///
	/// `route` names the endpoint template for logs and errors, e.g.
	/// `POST /channels/{id}/messages`.
	pub async fn request<T: DeserializeOwned>(
		&self,
		method: Method,
		path: &str,
		route: &str,
		body: Option<&Value>,
	) -> Result<T, HttpError> {
		let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

		let bytes = retry(&self.retry_config, || {
			self.send_once(method.clone(), &url, route, body)
		})
		.await?;

		serde_json::from_slice(&bytes).map_err(HttpError::from)
	}

	async fn send_once(
		&self,
		method: Method,
		url: &str,
		route: &str,
		body: Option<&Value>,
	) -> Result<Vec<u8>, HttpError> {
		let mut request = self
			.http_client
			.request(method, url)
			.header("authorization", format!("Bot {}", self.token.expose()));
		if let Some(json) = body {
			request = request.json(json);
		}

		let response = request.send().await?;
		let status = response.status();
		debug!(route, status = status.as_u16(), "Discord API response");

		if status.is_success() {
			return Ok(response.bytes().await?.to_vec());
		}

		let header_retry_after = response
			.headers()
			.get("retry-after")
			.and_then(|v| v.to_str().ok())
			.and_then(|v| v.parse::<f64>().ok())
			.filter(|s| s.is_finite());
		let body = response.text().await.unwrap_or_default();

		let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
			let seconds = body_retry_after(&body).or(header_retry_after).unwrap_or(1.0);
			warn!(route, retry_after_s = seconds, "rate-limited by Discord");
			Some(Duration::from_secs_f64(seconds.clamp(0.0, 60.0)))
		} else {
			None
		};

		Err(HttpError::Api {
			status: status.as_u16(),
			body,
			route: route.to_string(),
			retry_after,
		})
	}

	/// Post a plain text message to a channel.
	#[instrument(skip(self, content), fields(len = content.len()))]
	pub async fn send_message(&self, channel_id: &str, content: &str) -> Result<Message, HttpError> {
		self.create_message(channel_id, &CreateMessage::new().content(content))
			.await
	}

	pub async fn create_message(
		&self,
		channel_id: &str,
		message: &CreateMessage,
	) -> Result<Message, HttpError> {
		let body = serde_json::to_value(message)?;
		self.request(
			Method::POST,
			&format!("channels/{channel_id}/messages"),
			"POST /channels/{id}/messages",
			Some(&body),
		)
		.await
	}
}

/// 429 bodies carry `retry_after` in (fractional) seconds.
fn body_retry_after(body: &str) -> Option<f64> {
	serde_json::from_str::<Value>(body)
		.ok()?
		.get("retry_after")?
		.as_f64()
		.filter(|s| s.is_finite())
}

#[cfg(test)]
mod tests {
	use super::*;
	use beacon_common_config::Secret;
	use serde_json::json;
	use wiremock::matchers::{body_json, header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn message_json(content: &str) -> Value {
		json!({
			"id": "900",
			"channel_id": "782544143808856106",
			"author": {"id": "1", "username": "beacon", "bot": true},
			"content": content
		})
	}

	fn fast_retry() -> RetryConfig {
		RetryConfig {
			max_attempts: 3,
			base_delay: Duration::from_millis(1),
			max_delay: Duration::from_millis(20),
			backoff_factor: 2.0,
			jitter: false,
		}
	}

	fn client_for(server: &MockServer) -> DiscordHttpClient {
		DiscordHttpClient::new(Secret::new("bot-token".to_string()))
			.unwrap()
			.with_base_url(server.uri())
			.with_retry_config(fast_retry())
	}

	#[tokio::test]
	async fn send_message_posts_content_with_bot_auth() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/channels/782544143808856106/messages"))
			.and(header("authorization", "Bot bot-token"))
			.and(body_json(json!({"content": "Pong!"})))
			.respond_with(ResponseTemplate::new(200).set_body_json(message_json("Pong!")))
			.expect(1)
			.mount(&server)
			.await;

		let msg = client_for(&server)
			.send_message("782544143808856106", "Pong!")
			.await
			.unwrap();
		assert_eq!(msg.content, "Pong!");
	}

	#[tokio::test]
	async fn rate_limit_is_retried() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(
				ResponseTemplate::new(429).set_body_json(json!({"message": "slow down", "retry_after": 0.01})),
			)
			.up_to_n_times(1)
			.expect(1)
			.mount(&server)
			.await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200).set_body_json(message_json("ok")))
			.expect(1)
			.mount(&server)
			.await;

		let msg = client_for(&server).send_message("1", "ok").await.unwrap();
		assert_eq!(msg.content, "ok");
	}

	#[tokio::test]
	async fn forbidden_is_not_retried() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(403).set_body_string("Missing Access"))
			.expect(1)
			.mount(&server)
			.await;

		let err = client_for(&server).send_message("1", "hi").await.unwrap_err();
		match err {
			HttpError::Api { status, body, .. } => {
				assert_eq!(status, 403);
				assert_eq!(body, "Missing Access");
			}
			other => panic!("expected Api error, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn server_errors_exhaust_attempts() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(502))
			.expect(3)
			.mount(&server)
			.await;

		let err = client_for(&server).send_message("1", "hi").await.unwrap_err();
		assert!(matches!(err, HttpError::Api { status: 502, .. }));
	}

	#[tokio::test]
	async fn non_finite_retry_after_header_falls_back_to_default_wait() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(429).insert_header("retry-after", "NaN"))
			.up_to_n_times(1)
			.expect(1)
			.mount(&server)
			.await;
		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(200).set_body_json(message_json("hi")))
			.expect(1)
			.mount(&server)
			.await;

		let client = client_for(&server).with_retry_config(RetryConfig {
			max_delay: Duration::from_millis(5),
			..fast_retry()
		});
		let msg = client.send_message("1", "hi").await.unwrap();
		assert_eq!(msg.content, "hi");
	}

	#[test]
	fn retry_after_is_read_from_body() {
		assert_eq!(body_retry_after(r#"{"retry_after": 1.5}"#), Some(1.5));
		assert_eq!(body_retry_after("not json"), None);
	}

	#[test]
	fn base_url_trailing_slash_is_trimmed() {
		let client = DiscordHttpClient::new(Secret::new("t".to_string()))
			.unwrap()
			.with_base_url("http://localhost:1234/");
		assert_eq!(client.base_url, "http://localhost:1234");
	}
}
