//! Compact signed token encoding and verification.
//!
//! Tokens are JWS compact strings. The header carries `alg` and `kid`; the
//! payload carries the [`Claims`]. Verification picks the public key named by
//! `kid`, so tokens signed by a rotated-out key keep verifying for as long as
//! its public key stays registered.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, EncodingKey, Header, Validation, decode, decode_header, encode};
use thiserror::Error;

use crate::claims::{Claims, ISSUER};
use crate::keys::KeyLookup;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing token: {0}")]
    Signing(String),
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("no public key registered for key id {0:?}")]
    UnknownKey(String),
    #[error("token signature mismatch")]
    Signature,
    #[error("token expired")]
    Expired,
    #[error("key material: {0}")]
    Key(String),
}

/// Signs `claims` with `key`, stamping `key_id` and `algorithm` into the header.
///
/// # Errors
///
/// Returns [`TokenError::Signing`] when the key cannot sign with `algorithm`.
pub fn generate_token(
    claims: &Claims,
    key: &EncodingKey,
    key_id: &str,
    algorithm: Algorithm,
) -> Result<String, TokenError> {
    let mut header = Header::new(algorithm);
    header.kid = Some(key_id.to_string());

    encode(&header, claims, key).map_err(|e| TokenError::Signing(e.to_string()))
}

/// Verifies `token` against the current time.
pub fn parse_and_verify<L>(token: &str, lookup: &L) -> Result<Claims, TokenError>
where
    L: KeyLookup + ?Sized,
{
    parse_and_verify_at(token, lookup, Utc::now())
}

/// Verifies `token` and decodes its claims, judging expiry against `now`.
///
/// # Errors
///
/// - [`TokenError::Invalid`]: malformed token, missing `kid`, algorithm other than
///   the one registered for the key, wrong issuer, no roles, or an expiry that
///   does not follow the issue time
/// - [`TokenError::UnknownKey`]: no public key for the token's `kid`
/// - [`TokenError::Signature`]: the signature does not match
/// - [`TokenError::Expired`]: `now` is past the token's expiry
pub fn parse_and_verify_at<L>(
    token: &str,
    lookup: &L,
    now: DateTime<Utc>,
) -> Result<Claims, TokenError>
where
    L: KeyLookup + ?Sized,
{
    let header = decode_header(token).map_err(|e| TokenError::Invalid(e.to_string()))?;
    let kid = header
        .kid
        .ok_or_else(|| TokenError::Invalid("missing key id in token header".to_string()))?;

    let verifying = lookup
        .lookup(&kid)
        .ok_or_else(|| TokenError::UnknownKey(kid.clone()))?;

    if header.alg != verifying.algorithm {
        return Err(TokenError::Invalid(format!(
            "expected algorithm {:?}, token uses {:?}",
            verifying.algorithm, header.alg
        )));
    }

    let mut validation = Validation::new(verifying.algorithm);
    // Expiry is judged against the caller's clock below, without leeway.
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);

    let claims = decode::<Claims>(token, &verifying.key, &validation)
        .map(|data| data.claims)
        .map_err(classify)?;

    if claims.exp <= claims.iat {
        return Err(TokenError::Invalid("expiry must follow issue time".to_string()));
    }
    if claims.roles.is_empty() {
        return Err(TokenError::Invalid("token carries no roles".to_string()));
    }

    if claims.is_expired_at(now) {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::Signature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(err.to_string()),
    }
}
