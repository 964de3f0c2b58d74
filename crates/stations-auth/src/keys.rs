//! Public keys used to verify tokens, addressed by key-id.

use std::collections::HashMap;
use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey};

use crate::token::TokenError;

/// A public key together with the only algorithm it may verify.
#[derive(Clone)]
pub struct VerifyingKey {
    pub key: DecodingKey,
    pub algorithm: Algorithm,
}

impl VerifyingKey {
    /// Parses a PEM encoded RSA public key.
    pub fn from_rsa_pem(pem: &[u8], algorithm: Algorithm) -> Result<Self, TokenError> {
        if !is_rsa(algorithm) {
            return Err(TokenError::Key(format!(
                "algorithm {algorithm:?} is not an RSA algorithm"
            )));
        }

        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|e| TokenError::Key(format!("parsing public key: {e}")))?;

        Ok(Self { key, algorithm })
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyingKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

pub(crate) fn is_rsa(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512
    )
}

/// Resolves the key-id in a token header to the key that verifies it.
pub trait KeyLookup: Send + Sync {
    fn lookup(&self, kid: &str) -> Option<VerifyingKey>;
}

impl<F> KeyLookup for F
where
    F: Fn(&str) -> Option<VerifyingKey> + Send + Sync,
{
    fn lookup(&self, kid: &str) -> Option<VerifyingKey> {
        self(kid)
    }
}

/// Every public key the process accepts. Built at startup, read-only afterwards.
#[derive(Clone, Default)]
pub struct PublicKeys {
    keys: HashMap<String, VerifyingKey>,
}

impl PublicKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding exactly one key.
    pub fn single(kid: impl Into<String>, key: VerifyingKey) -> Self {
        let mut keys = Self::new();
        keys.insert(kid, key);
        keys
    }

    pub fn insert(&mut self, kid: impl Into<String>, key: VerifyingKey) {
        self.keys.insert(kid.into(), key);
    }

    pub fn insert_pem(
        &mut self,
        kid: impl Into<String>,
        pem: &[u8],
        algorithm: Algorithm,
    ) -> Result<(), TokenError> {
        let key = VerifyingKey::from_rsa_pem(pem, algorithm)?;
        self.insert(kid, key);
        Ok(())
    }

    pub fn contains(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key-ids in sorted order.
    pub fn kids(&self) -> Vec<&str> {
        let mut kids: Vec<&str> = self.keys.keys().map(String::as_str).collect();
        kids.sort_unstable();
        kids
    }
}

impl KeyLookup for PublicKeys {
    fn lookup(&self, kid: &str) -> Option<VerifyingKey> {
        self.keys.get(kid).cloned()
    }
}

impl fmt::Debug for PublicKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKeys")
            .field("kids", &self.kids())
            .finish()
    }
}
