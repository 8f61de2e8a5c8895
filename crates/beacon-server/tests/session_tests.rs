// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Router-level tests for the session handoff and logout routes.

use std::sync::Arc;
use std::time::Duration;

use axum::{
	body::{to_bytes, Body},
	http::{header, Request, StatusCode},
	response::Response,
	Router,
};
use beacon_common_config::Secret;
use beacon_server::{create_router, AppState};
use beacon_server_auth::{InMemorySessionStore, SessionStore};
use beacon_server_config::AuthConfig;
use beacon_server_search::SearchClient;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ISSUER_SECRET: &str = "issuer-secret";

struct Harness {
	router: Router,
	store: Arc<InMemorySessionStore>,
}

impl Harness {
	fn new(auth: AuthConfig, upstream: Option<&MockServer>) -> Self {
		let store = Arc::new(InMemorySessionStore::new());
		let mut state = AppState::new(auth, store.clone());
		if let Some(server) = upstream {
			let client = SearchClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
			state = state.with_search(Arc::new(client));
		}
		Self {
			router: create_router(state),
			store,
		}
	}

	fn issuing(upstream: Option<&MockServer>) -> Self {
		Self::new(
			AuthConfig {
				session_issuer_secret: Some(Secret::new(ISSUER_SECRET.to_string())),
				..AuthConfig::default()
			},
			upstream,
		)
	}

	async fn send(&self, request: Request<Body>) -> Response {
		self.router.clone().oneshot(request).await.unwrap()
	}

	async fn issue(&self, bearer: Option<&str>, body: Value) -> Response {
		let mut request = Request::builder()
			.method("POST")
			.uri("/auth/sessions")
			.header(header::CONTENT_TYPE, "application/json");
		if let Some(bearer) = bearer {
			request = request.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
		}
		self
			.send(request.body(Body::from(body.to_string())).unwrap())
			.await
	}

	async fn issue_token(&self) -> String {
		let response = self
			.issue(Some(ISSUER_SECRET), json!({"display_name": "Searcher"}))
			.await;
		assert_eq!(response.status(), StatusCode::CREATED);
		json_body(response).await["token"]
			.as_str()
			.unwrap()
			.to_string()
	}

	async fn post_with_cookie(&self, uri: &str, token: Option<&str>) -> Response {
		let mut request = Request::builder().method("POST").uri(uri);
		if let Some(token) = token {
			request = request.header(header::COOKIE, format!("beacon_session={token}"));
		}
		self.send(request.body(Body::empty()).unwrap()).await
	}

	async fn search(&self, token: &str) -> Response {
		self
			.send(
				Request::builder()
					.uri("/search/results?q=rust")
					.header(header::COOKIE, format!("beacon_session={token}"))
					.body(Body::empty())
					.unwrap(),
			)
			.await
	}
}

async fn json_body(response: Response) -> Value {
	let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

fn set_cookie(response: &Response) -> String {
	response
		.headers()
		.get(header::SET_COOKIE)
		.unwrap()
		.to_str()
		.unwrap()
		.to_string()
}

#[tokio::test]
async fn issued_session_unlocks_search() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(query_param("q", "rust"))
		.respond_with(
			ResponseTemplate::new(200).set_body_json(json!([{"title": "T", "description": "D"}])),
		)
		.expect(1)
		.mount(&server)
		.await;

	let harness = Harness::issuing(Some(&server));
	let response = harness
		.issue(
			Some(ISSUER_SECRET),
			json!({"display_name": "Searcher", "email": "searcher@example.com"}),
		)
		.await;

	assert_eq!(response.status(), StatusCode::CREATED);
	let cookie = set_cookie(&response);
	let body = json_body(response).await;
	let token = body["token"].as_str().unwrap();
	assert!(body["expires_at"].is_string());
	assert!(body["user_id"].is_string());
	assert!(cookie.starts_with(&format!("beacon_session={token};")));
	assert!(cookie.contains("HttpOnly"));
	assert!(cookie.contains("Max-Age=86400"));

	let response = harness.search(token).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(json_body(response).await["view"], "results");
}

#[tokio::test]
async fn cookie_lifetime_follows_configured_ttl() {
	let harness = Harness::new(
		AuthConfig {
			session_issuer_secret: Some(Secret::new(ISSUER_SECRET.to_string())),
			session_ttl: Duration::from_secs(2 * 3600),
			..AuthConfig::default()
		},
		None,
	);
	let response = harness
		.issue(Some(ISSUER_SECRET), json!({"display_name": "Searcher"}))
		.await;

	assert_eq!(response.status(), StatusCode::CREATED);
	assert!(set_cookie(&response).contains("Max-Age=7200"));
}

#[tokio::test]
async fn wrong_issuer_secret_is_rejected() {
	let harness = Harness::issuing(None);
	let response = harness
		.issue(Some("guess"), json!({"display_name": "Mallory"}))
		.await;

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert!(response.headers().get(header::SET_COOKIE).is_none());
	assert_eq!(json_body(response).await["error"], "unauthorized");
	assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn missing_issuer_secret_is_rejected() {
	let harness = Harness::issuing(None);
	let response = harness.issue(None, json!({"display_name": "Mallory"})).await;

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn issuing_is_disabled_without_configured_secret() {
	let harness = Harness::new(AuthConfig::default(), None);
	let response = harness
		.issue(Some(ISSUER_SECRET), json!({"display_name": "Searcher"}))
		.await;

	assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
	assert_eq!(json_body(response).await["error"], "not_configured");
	assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn blank_display_name_is_rejected() {
	let harness = Harness::issuing(None);
	let response = harness
		.issue(Some(ISSUER_SECRET), json!({"display_name": "   "}))
		.await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn logout_revokes_session_and_clears_cookie() {
	let harness = Harness::issuing(None);
	let token = harness.issue_token().await;
	assert!(harness.store.lookup(&token).await.is_some());

	let response = harness.post_with_cookie("/auth/logout", Some(&token)).await;
	assert_eq!(response.status(), StatusCode::OK);
	let cookie = set_cookie(&response);
	assert!(cookie.starts_with("beacon_session=;"));
	assert!(cookie.contains("Max-Age=0"));

	assert!(harness.store.lookup(&token).await.is_none());
	let response = harness.search(&token).await;
	assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn logout_while_signed_out_still_clears_cookie() {
	let harness = Harness::issuing(None);
	let response = harness.post_with_cookie("/auth/logout", None).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert!(set_cookie(&response).contains("Max-Age=0"));
}
