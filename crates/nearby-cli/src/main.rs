//! Nearby CLI - operator tooling
//!
//! Usage:
//!   nearby hash-password <password>
//!   nearby create-admin --username <name> --password <password> [--role <role>]
//!   nearby migrate
//!   nearby issue-token --id <id> --role user|admin --name <name> [--email <email>]
//!
//! Configuration is read the same way the server reads it: `NEARBY_CONFIG`
//! names an optional TOML file, environment variables override it.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use nearby_api::auth::{hash_password, TokenIssuer};
use nearby_core::{
    Admin, AppConfig, IdentityStore, NewAdmin, PgStore, Principal, StorageBackend, User,
};

#[derive(Parser)]
#[command(name = "nearby")]
#[command(about = "Nearby authentication operator CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Argon2id hash of a password
    HashPassword {
        /// Plain-text password
        password: String,
    },
    /// Provision an administrator account
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Administrative sub-role shown to clients
        #[arg(long, default_value = "staff")]
        role: String,
    },
    /// Create the tables if they do not exist
    Migrate,
    /// Mint an access token for debugging
    IssueToken {
        #[arg(long)]
        id: i64,
        #[arg(long, value_enum)]
        role: RoleArg,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    User,
    Admin,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nearby_core=info,warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::HashPassword { password } => {
            let hash = hash_password(&password).context("Failed to hash password")?;
            println!("{hash}");
        }
        Commands::CreateAdmin {
            username,
            password,
            role,
        } => {
            let config = load_config()?;
            require_postgres(&config, "create-admin")?;
            let password_hash = hash_password(&password).context("Failed to hash password")?;
            let admin = NewAdmin {
                username,
                password_hash,
                role,
            };

            let id = connect(&config).await?.create_admin(&admin).await?;
            println!("Created admin {} (id {id})", admin.username);
        }
        Commands::Migrate => {
            let config = load_config()?;
            require_postgres(&config, "migrate")?;
            connect(&config).await?;
            println!("Schema is up to date");
        }
        Commands::IssueToken {
            id,
            role,
            name,
            email,
        } => {
            let config = load_config()?;
            config.validate()?;

            let principal = match role {
                RoleArg::User => Principal::User(User {
                    id,
                    name,
                    email,
                    image: String::new(),
                }),
                RoleArg::Admin => Principal::Admin(Admin {
                    id,
                    username: name,
                    password_hash: String::new(),
                    role: "staff".to_string(),
                }),
            };

            let issuer = TokenIssuer::new(&config.auth);
            let token = issuer.generate_access_token(&principal)?;
            println!("{token}");
            eprintln!("expires in {}s", issuer.ttl_secs());
        }
    }

    Ok(())
}

fn load_config() -> anyhow::Result<AppConfig> {
    let config = match std::env::var("NEARBY_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };
    Ok(config)
}

/// Commands that persist state have nothing to write to in the memory backend
fn require_postgres(config: &AppConfig, command: &str) -> anyhow::Result<()> {
    if config.database.backend != StorageBackend::Postgres {
        bail!("{command} requires STORAGE_BACKEND=postgres");
    }
    Ok(())
}

/// Open the PostgreSQL store and make sure the schema exists
async fn connect(config: &AppConfig) -> anyhow::Result<PgStore> {
    let store = PgStore::new(&config.database.postgres_url, config.database.pool_size)
        .await
        .context("Failed to connect to PostgreSQL")?;
    store.ensure_schema().await.context("Failed to apply schema")?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisting_commands_refuse_memory_backend() {
        let mut config = AppConfig::default();
        config.database.backend = StorageBackend::Memory;

        let err = require_postgres(&config, "create-admin").unwrap_err();
        assert!(err.to_string().contains("create-admin"));

        config.database.backend = StorageBackend::Postgres;
        assert!(require_postgres(&config, "migrate").is_ok());
    }

    #[test]
    fn test_create_admin_arguments() {
        let cli = Cli::try_parse_from([
            "nearby",
            "create-admin",
            "--username",
            "root",
            "--password",
            "hunter2",
        ])
        .unwrap();

        match cli.command {
            Commands::CreateAdmin { username, role, .. } => {
                assert_eq!(username, "root");
                assert_eq!(role, "staff");
            }
            _ => panic!("expected create-admin"),
        }
    }
}
