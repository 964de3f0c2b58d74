//! Signing key and token settings.
//!
//! - `AUTH_KEY_ID`: key-id stamped into every issued token (default: `1`)
//! - `AUTH_PRIVATE_KEY_FILE`: PEM private key used for signing (default: `private.pem`)
//! - `AUTH_PUBLIC_KEY_FILE`: PEM public key for `AUTH_KEY_ID` (default: `public.pem`)
//! - `AUTH_PUBLIC_KEYS`: extra verification keys as `kid=path` pairs separated
//!   by commas, for tokens signed with rotated-out keys
//! - `AUTH_ALGORITHM`: signing algorithm (default: `RS256`)
//! - `AUTH_TOKEN_TTL_SECS`: lifetime of issued tokens (default: 3600)

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::{env_or, env_string};

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub key_id: String,
    pub private_key_file: PathBuf,
    pub public_key_file: PathBuf,
    pub additional_public_keys: Vec<(String, PathBuf)>,
    pub algorithm: String,
    pub token_ttl: Duration,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            key_id: env_string("AUTH_KEY_ID", "1"),
            private_key_file: env_string("AUTH_PRIVATE_KEY_FILE", "private.pem").into(),
            public_key_file: env_string("AUTH_PUBLIC_KEY_FILE", "public.pem").into(),
            additional_public_keys: env::var("AUTH_PUBLIC_KEYS")
                .map(|raw| parse_key_list(&raw))
                .unwrap_or_default(),
            algorithm: env_string("AUTH_ALGORITHM", "RS256"),
            token_ttl: Duration::from_secs(env_or("AUTH_TOKEN_TTL_SECS", 3600)),
        }
    }
}

/// Parses `kid=path,kid=path`. Entries without a `=` or with an empty side are skipped.
pub fn parse_key_list(raw: &str) -> Vec<(String, PathBuf)> {
    raw.split(',')
        .filter_map(|entry| {
            let (kid, path) = entry.split_once('=')?;
            let (kid, path) = (kid.trim(), path.trim());
            if kid.is_empty() || path.is_empty() {
                return None;
            }
            Some((kid.to_string(), PathBuf::from(path)))
        })
        .collect()
}
