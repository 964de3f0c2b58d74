//! The process-wide token signer and verifier.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey};

use stations_config::AuthConfig;

use crate::claims::Claims;
use crate::keys::{PublicKeys, is_rsa};
use crate::roles::Role;
use crate::token::{self, TokenError};

/// Holds the private signing key, the key-id it is published under, and every
/// public key accepted for verification.
///
/// Built once at startup and shared read-only between requests.
pub struct Authenticator {
    signing_key: EncodingKey,
    key_id: String,
    algorithm: Algorithm,
    public_keys: PublicKeys,
    token_ttl: Duration,
}

impl Authenticator {
    /// Creates an authenticator issuing tokens valid for one hour.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Key`] if:
    /// - `key_id` is empty or `algorithm` is not an RSA algorithm
    /// - the private key cannot be parsed
    /// - `public_keys` holds no key for `key_id`
    ///
    /// Returns [`TokenError::Signing`] if the private key cannot sign, or
    /// [`TokenError::Signature`] if the public key registered for `key_id`
    /// does not belong to it.
    pub fn new(
        private_key_pem: &[u8],
        key_id: impl Into<String>,
        algorithm: Algorithm,
        public_keys: PublicKeys,
    ) -> Result<Self, TokenError> {
        let key_id = key_id.into();

        if key_id.trim().is_empty() {
            return Err(TokenError::Key("key id must not be empty".to_string()));
        }
        if !is_rsa(algorithm) {
            return Err(TokenError::Key(format!(
                "algorithm {algorithm:?} is not an RSA algorithm"
            )));
        }
        if !public_keys.contains(&key_id) {
            return Err(TokenError::Key(format!(
                "no public key registered for active key id {key_id:?}"
            )));
        }

        let signing_key = EncodingKey::from_rsa_pem(private_key_pem)
            .map_err(|e| TokenError::Key(format!("parsing private key: {e}")))?;

        let authenticator = Self {
            signing_key,
            key_id,
            algorithm,
            public_keys,
            token_ttl: Duration::hours(1),
        };
        authenticator.self_check()?;

        Ok(authenticator)
    }

    /// Loads key material from the files named in `config`.
    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        let algorithm = Algorithm::from_str(&config.algorithm)
            .map_err(|_| TokenError::Key(format!("unknown algorithm {:?}", config.algorithm)))?;

        let mut public_keys = PublicKeys::new();
        public_keys.insert_pem(&config.key_id, &read_pem(&config.public_key_file)?, algorithm)?;
        for (kid, path) in &config.additional_public_keys {
            public_keys.insert_pem(kid, &read_pem(path)?, algorithm)?;
        }

        let private_key = read_pem(&config.private_key_file)?;
        let token_ttl = Duration::from_std(config.token_ttl)
            .map_err(|e| TokenError::Key(format!("token lifetime out of range: {e}")))?;

        Self::new(&private_key, &config.key_id, algorithm, public_keys)?.with_token_ttl(token_ttl)
    }

    /// Tokens must expire after they are issued, so a lifetime that is not
    /// positive is a [`TokenError::Key`].
    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Result<Self, TokenError> {
        if token_ttl <= Duration::zero() {
            return Err(TokenError::Key(format!(
                "token lifetime must be positive, got {}s",
                token_ttl.num_seconds()
            )));
        }
        self.token_ttl = token_ttl;
        Ok(self)
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub fn public_keys(&self) -> &PublicKeys {
        &self.public_keys
    }

    /// Claims for `subject` valid from `now` for the configured token lifetime.
    pub fn new_claims(
        &self,
        subject: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
        now: DateTime<Utc>,
    ) -> Claims {
        Claims::new(subject, roles, now, self.token_ttl)
    }

    pub fn generate_token(&self, claims: &Claims) -> Result<String, TokenError> {
        token::generate_token(claims, &self.signing_key, &self.key_id, self.algorithm)
    }

    pub fn parse_claims(&self, token: &str) -> Result<Claims, TokenError> {
        token::parse_and_verify(token, &self.public_keys)
    }

    pub fn parse_claims_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        token::parse_and_verify_at(token, &self.public_keys, now)
    }

    // Signs and verifies a throwaway token so a mismatched key pair fails at
    // startup rather than on the first login.
    fn self_check(&self) -> Result<(), TokenError> {
        let now = Utc::now();
        let probe = Claims::new("self-check", [Role::Station], now, Duration::minutes(1));
        let token = self.generate_token(&probe)?;
        self.parse_claims_at(&token, now).map(|_| ())
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .field("public_keys", &self.public_keys)
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, TokenError> {
    fs::read(path).map_err(|e| TokenError::Key(format!("reading {}: {e}", path.display())))
}
