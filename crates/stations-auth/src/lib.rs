//! # Stations Auth
//!
//! Identity and token handling for the Stations API.
//!
//! - [`roles`]: the closed set of roles an account can hold
//! - [`claims`]: the identity carried inside a token
//! - [`keys`]: public verification keys addressed by key-id
//! - [`token`]: signing and verifying compact RS256 tokens
//! - [`authenticator`]: the process-wide signer and verifier
//!
//! Tokens name the key that signed them in their `kid` header, so several
//! public keys can be valid at once while signing keys are rotated.
//!
//! # Example
//!
//! ```ignore
//! use stations_auth::{Authenticator, Claims, Role};
//!
//! let auth = Authenticator::from_config(&AuthConfig::from_env())?;
//! let claims = auth.new_claims(account_id, [Role::Admin], Utc::now());
//! let token = auth.generate_token(&claims)?;
//! assert_eq!(auth.parse_claims(&token)?, claims);
//! ```

pub mod authenticator;
pub mod claims;
pub mod keys;
pub mod roles;
pub mod token;

pub use authenticator::Authenticator;
pub use claims::{Claims, ISSUER};
pub use keys::{KeyLookup, PublicKeys, VerifyingKey};
pub use roles::Role;
pub use token::{TokenError, generate_token, parse_and_verify, parse_and_verify_at};
