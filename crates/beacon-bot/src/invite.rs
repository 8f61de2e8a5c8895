// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

const AUTHORIZE_URL: &str = "https://discord.com/oauth2/authorize";

/// OAuth2 URL that adds the bot to a server.
///
/// `permissions` is appended only when set.
pub fn invite_url(client_id: u64, permissions: Option<u64>) -> String {
	let mut url = format!("{AUTHORIZE_URL}?client_id={client_id}&scope=bot");
	if let Some(permissions) = permissions {
		url.push_str(&format!("&permissions={permissions}"));
	}
	url
}
