//! Account storage.
//!
//! Login only needs to look an account up by name, so the store is a small
//! trait with a PostgreSQL implementation and an in-memory one.

use std::collections::HashMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use stations_core::{AppError, DEFAULT_COST, hash_password_with_cost};
use stations_models::account::{Account, AccountRow, NewAccount};

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Looks an account up by its unique name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Account>, AppError>;

    /// Validates, hashes, and stores a new account.
    async fn create(&self, new_account: NewAccount, now: DateTime<Utc>)
    -> Result<Account, AppError>;

    /// A hash at the same cost as stored passwords. Login compares against it
    /// when the name is unknown, so a miss costs as much as a wrong password.
    fn timing_hash(&self) -> Result<&str, AppError>;
}

const TIMING_PASSWORD: &str = "timing-equalizer";

fn cached_timing_hash(cell: &OnceLock<String>, hash_cost: u32) -> Result<&str, AppError> {
    if let Some(hash) = cell.get() {
        return Ok(hash);
    }
    let hash = hash_password_with_cost(TIMING_PASSWORD, hash_cost)?;
    Ok(cell.get_or_init(|| hash))
}

fn build_account(
    new_account: NewAccount,
    now: DateTime<Utc>,
    hash_cost: u32,
) -> Result<Account, AppError> {
    new_account
        .validate()
        .map_err(|errors| AppError::validation(&errors))?;

    let password_hash = hash_password_with_cost(&new_account.password, hash_cost)?;

    Ok(Account {
        id: Uuid::new_v4(),
        name: new_account.name,
        roles: new_account.roles.into_iter().collect(),
        password_hash,
        date_created: now,
        date_updated: now,
    })
}

fn duplicate_name(name: &str) -> AppError {
    AppError::bad_request(format!("account {name:?} already exists"))
}

#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
    hash_cost: u32,
    timing_hash: OnceLock<String>,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            hash_cost: DEFAULT_COST,
            timing_hash: OnceLock::new(),
        }
    }

    pub fn with_hash_cost(mut self, hash_cost: u32) -> Self {
        self.hash_cost = hash_cost;
        self.timing_hash = OnceLock::new();
        self
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Account>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"SELECT id, name, roles, password_hash, date_created, date_updated
               FROM account
               WHERE name = $1"#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose().map_err(AppError::internal)
    }

    #[instrument(skip(self, new_account), fields(name = %new_account.name))]
    async fn create(
        &self,
        new_account: NewAccount,
        now: DateTime<Utc>,
    ) -> Result<Account, AppError> {
        let account = build_account(new_account, now, self.hash_cost)?;
        let roles: Vec<String> = account.roles.iter().map(|r| r.to_string()).collect();

        sqlx::query(
            r#"INSERT INTO account (id, name, roles, password_hash, date_created, date_updated)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&roles)
        .bind(&account.password_hash)
        .bind(account.date_created)
        .bind(account.date_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return duplicate_name(&account.name);
            }
            AppError::from(e)
        })?;

        Ok(account)
    }

    fn timing_hash(&self) -> Result<&str, AppError> {
        cached_timing_hash(&self.timing_hash, self.hash_cost)
    }
}

/// Keeps accounts in process memory. Used by tests and local tooling.
#[derive(Debug)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
    hash_cost: u32,
    timing_hash: OnceLock<String>,
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            hash_cost: DEFAULT_COST,
            timing_hash: OnceLock::new(),
        }
    }
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hash_cost(mut self, hash_cost: u32) -> Self {
        self.hash_cost = hash_cost;
        self.timing_hash = OnceLock::new();
        self
    }

    /// Stores an already-hashed account, replacing any with the same name.
    pub async fn insert(&self, account: Account) {
        self.accounts
            .write()
            .await
            .insert(account.name.clone(), account);
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Account>, AppError> {
        Ok(self.accounts.read().await.get(name).cloned())
    }

    async fn create(
        &self,
        new_account: NewAccount,
        now: DateTime<Utc>,
    ) -> Result<Account, AppError> {
        let account = build_account(new_account, now, self.hash_cost)?;

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.name) {
            return Err(duplicate_name(&account.name));
        }
        accounts.insert(account.name.clone(), account.clone());

        Ok(account)
    }

    fn timing_hash(&self) -> Result<&str, AppError> {
        cached_timing_hash(&self.timing_hash, self.hash_cost)
    }
}
