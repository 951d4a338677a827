//! Academy CLI - Database migrations, demo content and staff accounts.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! academy-cli migrate
//!
//! # Load demo content (safe to re-run)
//! academy-cli seed
//!
//! # Wipe content tables, then load demo content
//! academy-cli seed --reset
//!
//! # Create a staff account
//! academy-cli user create -e admin@example.com -n "Admin Name" -r admin --password '...'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Populate demo services, programs, team, portfolio, posts and translations
//! - `user create` - Create admin or editor accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "academy-cli")]
#[command(author, version, about = "Academy CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo content
    Seed {
        /// Delete all content (not users) before seeding
        #[arg(long)]
        reset: bool,
    },
    /// Manage staff users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new staff user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`admin`, `editor`)
        #[arg(short, long, default_value = "editor")]
        role: String,

        /// Password; falls back to `ACADEMY_SEED_PASSWORD`
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { reset } => commands::seed::run(reset).await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::user::create(&email, &name, &role, password).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_user_create() {
        let cli = Cli::try_parse_from([
            "academy-cli",
            "user",
            "create",
            "-e",
            "a@academy.io",
            "-n",
            "Ada",
            "-r",
            "admin",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        match cli.command {
            Commands::User {
                action:
                    UserAction::Create {
                        email,
                        role,
                        password,
                        ..
                    },
            } => {
                assert_eq!(email, "a@academy.io");
                assert_eq!(role, "admin");
                assert!(password.is_none());
            }
            _ => panic!("expected user create"),
        }
    }

    #[test]
    fn test_parses_seed_reset() {
        let cli = Cli::try_parse_from(["academy-cli", "seed", "--reset"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(cli.command, Commands::Seed { reset: true }));
    }
}
