use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use stations_auth::Role;
use stations_config::DatabaseConfig;
use stations_db::{AccountStore, PgAccountStore, PgPool, init_db_pool, schema};
use stations_models::account::NewAccount;

#[derive(Parser)]
#[command(name = "stations-admin")]
#[command(about = "Administrative tools for the Stations API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// Load the development station types, stations and accounts
    Seed,
    /// Create a login account
    AccountAdd {
        /// Unique account name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Role to grant; repeat for several
        #[arg(short = 'r', long = "role", default_values = ["ADMIN", "STATION"])]
        roles: Vec<Role>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("\n❌ {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&config)
        .await
        .with_context(|| format!("connecting to {}", config.redacted_url()))?;

    match cli.command {
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::Seed => handle_seed(&pool).await,
        Commands::AccountAdd {
            name,
            password,
            roles,
        } => handle_account_add(pool, name, password, roles).await,
    }
}

async fn handle_migrate(pool: &PgPool) -> anyhow::Result<()> {
    schema::migrate(pool).await.context("running migrations")?;
    println!("✅ Migrations complete");
    Ok(())
}

async fn handle_seed(pool: &PgPool) -> anyhow::Result<()> {
    schema::seed(pool).await.context("loading seed data")?;
    println!("✅ Seed data loaded");
    Ok(())
}

async fn handle_account_add(
    pool: PgPool,
    name: Option<String>,
    password: Option<String>,
    roles: Vec<Role>,
) -> anyhow::Result<()> {
    let name = match name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Account name")
            .interact_text()
            .context("reading account name")?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .context("reading password")?,
    };

    let new_account = NewAccount {
        name,
        roles,
        password_confirm: password.clone(),
        password,
    };

    let store = PgAccountStore::new(pool);
    let account = store
        .create(new_account, Utc::now())
        .await
        .map_err(|e| anyhow::anyhow!("creating account: {e}"))?;

    let roles: Vec<&str> = account.roles.iter().map(Role::as_str).collect();
    println!("\n✅ Account created");
    println!("   ID: {}", account.id);
    println!("   Name: {}", account.name);
    println!("   Roles: {}", roles.join(", "));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_add_defaults_to_both_roles() {
        let cli = Cli::try_parse_from(["stations-admin", "account-add", "--name", "ops"]).unwrap();
        match cli.command {
            Commands::AccountAdd { name, roles, .. } => {
                assert_eq!(name.as_deref(), Some("ops"));
                assert_eq!(roles, vec![Role::Admin, Role::Station]);
            }
            _ => panic!("expected account-add"),
        }
    }

    #[test]
    fn roles_can_be_narrowed() {
        let cli = Cli::try_parse_from(["stations-admin", "account-add", "--role", "station"])
            .unwrap();
        match cli.command {
            Commands::AccountAdd { roles, .. } => assert_eq!(roles, vec![Role::Station]),
            _ => panic!("expected account-add"),
        }
    }

    #[test]
    fn unknown_roles_are_rejected() {
        assert!(Cli::try_parse_from(["stations-admin", "account-add", "--role", "root"]).is_err());
    }
}
