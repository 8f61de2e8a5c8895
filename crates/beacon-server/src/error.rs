// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("Invalid request: {0}")]
	BadRequest(String),

	#[error("Unauthorized")]
	Unauthorized,

	#[error("Not configured: {0}")]
	NotConfigured(String),

	#[error("Internal error: {0}")]
	Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, body) = match &self {
			ServerError::BadRequest(message) => (
				StatusCode::BAD_REQUEST,
				ErrorResponse {
					error: "bad_request".to_string(),
					message: message.clone(),
				},
			),
			ServerError::Unauthorized => (
				StatusCode::UNAUTHORIZED,
				ErrorResponse {
					error: "unauthorized".to_string(),
					message: "Missing or invalid credentials".to_string(),
				},
			),
			ServerError::NotConfigured(message) => (
				StatusCode::NOT_IMPLEMENTED,
				ErrorResponse {
					error: "not_configured".to_string(),
					message: message.clone(),
				},
			),
			ServerError::Internal(message) => {
				tracing::error!(error = %message, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse {
						error: "internal_error".to_string(),
						message: "An internal error occurred".to_string(),
					},
				)
			}
		};

		(status, Json(body)).into_response()
	}
}
