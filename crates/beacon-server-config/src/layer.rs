// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The partial configuration produced by each source.

use serde::Deserialize;

use crate::sections::{
	AuthConfigLayer, DiscordConfigLayer, HttpConfigLayer, LoggingConfigLayer, SearchConfigLayer,
};

/// One source's view of the configuration. `None` sections were not supplied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub auth: Option<AuthConfigLayer>,
	#[serde(default)]
	pub search: Option<SearchConfigLayer>,
	#[serde(default)]
	pub discord: Option<DiscordConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

fn merge_section<T: Default>(slot: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	if let Some(other) = other {
		merge(slot.get_or_insert_with(T::default), other);
	}
}

impl ServerConfigLayer {
	/// Overlay `other` on top of `self`; fields set in `other` win.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_section(&mut self.auth, other.auth, AuthConfigLayer::merge);
		merge_section(&mut self.search, other.search, SearchConfigLayer::merge);
		merge_section(&mut self.discord, other.discord, DiscordConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}
