// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration primitives shared by Beacon crates.
//!
//! - [`Secret<T>`]: wrapper that keeps credentials (bot tokens, search API
//!   keys) out of logs and config dumps
//! - [`load_secret_env`]: loads a secret from `VAR` or from the file named by
//!   `VAR_FILE`

pub mod env;
pub mod secret;

pub use env::{load_secret_env, require_secret_env, RequiredSecretError, SecretEnvError};
pub use secret::{Secret, SecretString, REDACTED};
