//! Bookpress CLI - Database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bp-cli migrate
//!
//! # Create a user
//! bp-cli user create -e author@example.com -p s3cretpass -r author
//!
//! # Change a user's role
//! bp-cli user set-role -e author@example.com -r editor
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create a user with a role
//! - `user set-role` - Change an existing user's role

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bp-cli")]
#[command(author, version, about = "Bookpress CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (will be hashed with Argon2)
        #[arg(short, long)]
        password: String,

        /// Role (`author`, `editor`, `publisher`, `reader`)
        #[arg(short, long, default_value = "reader")]
        role: String,

        /// Display name
        #[arg(short = 'n', long)]
        display_name: Option<String>,
    },
    /// Change an existing user's role
    SetRole {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// New role (`author`, `editor`, `publisher`, `reader`)
        #[arg(short, long)]
        role: String,
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
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                role,
                display_name,
            } => {
                commands::user::create(&email, &password, &role, display_name.as_deref()).await?;
            }
            UserAction::SetRole { email, role } => {
                commands::user::set_role(&email, &role).await?;
            }
        },
    }
    Ok(())
}
