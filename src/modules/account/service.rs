use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use stations_auth::{Authenticator, Claims};
use stations_core::{AppError, verify_password};
use stations_db::AccountStore;

pub struct AccountService;

impl AccountService {
    /// Checks a name and password pair and builds the claims for a new token.
    ///
    /// An unknown name and a wrong password fail identically with
    /// [`AppError::AuthenticationFailure`]. An unknown name is checked against
    /// the store's timing hash so both cost the same bcrypt work. Accounts
    /// without roles cannot log in.
    #[instrument(skip(store, authenticator, password))]
    pub async fn authenticate(
        store: &dyn AccountStore,
        authenticator: &Authenticator,
        now: DateTime<Utc>,
        name: &str,
        password: &str,
    ) -> Result<Claims, AppError> {
        let Some(account) = store.find_by_name(name).await? else {
            let _ = verify_password(password, store.timing_hash()?);
            debug!("Unknown account name");
            return Err(AppError::AuthenticationFailure);
        };

        if !verify_password(password, &account.password_hash)? {
            debug!(account_id = %account.id, "Password mismatch");
            return Err(AppError::AuthenticationFailure);
        }

        if account.roles.is_empty() {
            warn!(account_id = %account.id, "Account has no roles");
            return Err(AppError::AuthenticationFailure);
        }

        Ok(authenticator.new_claims(account.id.to_string(), account.roles.iter().copied(), now))
    }
}
