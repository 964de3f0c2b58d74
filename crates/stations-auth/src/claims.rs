//! The identity carried inside a signed token.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Issuer stamped into, and required on, every token.
pub const ISSUER: &str = "station-api";

/// Claims for an authenticated account.
///
/// Timestamps are whole Unix seconds so a token round trip yields an equal value.
///
/// # Fields
///
/// - `sub`: account ID
/// - `roles`: roles granted to the account
/// - `iat`: issued-at timestamp
/// - `exp`: expiry timestamp, always after `iat`
/// - `iss`: always [`ISSUER`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub roles: BTreeSet<Role>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    /// Builds claims valid from `issued_at` for `valid_for`.
    pub fn new(
        subject: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
        issued_at: DateTime<Utc>,
        valid_for: Duration,
    ) -> Self {
        let iat = issued_at.timestamp();

        Self {
            sub: subject.into(),
            roles: roles.into_iter().collect(),
            iat,
            exp: iat + valid_for.num_seconds(),
            iss: ISSUER.to_string(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn expiry_is_issue_time_plus_validity() {
        let claims = Claims::new("abc", [Role::Admin], issued_at(), Duration::hours(1));
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn role_membership() {
        let claims = Claims::new("abc", [Role::Station], issued_at(), Duration::hours(1));
        assert!(claims.has_role(Role::Station));
        assert!(!claims.has_role(Role::Admin));
    }

    #[test]
    fn duplicate_roles_collapse() {
        let claims = Claims::new(
            "abc",
            [Role::Admin, Role::Station, Role::Admin],
            issued_at(),
            Duration::hours(1),
        );
        assert_eq!(claims.roles.len(), 2);
    }

    #[test]
    fn expiry_boundary() {
        let now = issued_at();
        let claims = Claims::new("abc", [Role::Admin], now, Duration::hours(1));
        assert!(!claims.is_expired_at(now + Duration::hours(1)));
        assert!(claims.is_expired_at(now + Duration::hours(1) + Duration::seconds(1)));
    }
}
