// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Background removal of expired sessions.

use std::{sync::Arc, time::Duration};

use beacon_server_auth::SessionStore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Purge expired sessions every `interval` until `cancel` fires.
pub fn spawn_purge_task(
	store: Arc<dyn SessionStore>,
	interval: Duration,
	cancel: CancellationToken,
) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(interval);
		ticker.tick().await;

		loop {
			tokio::select! {
				_ = cancel.cancelled() => {
					tracing::debug!("session purge task stopped");
					return;
				}
				_ = ticker.tick() => {
					let removed = store.purge_expired().await;
					if removed > 0 {
						tracing::info!(removed, "purged expired sessions");
					}
				}
			}
		}
	})
}
