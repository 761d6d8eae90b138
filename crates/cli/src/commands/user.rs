//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a user
//! bp-cli user create -e author@example.com -p s3cretpass -r author -n "A. Writer"
//!
//! # Promote a user
//! bp-cli user set-role -e author@example.com -r editor
//! ```
//!
//! Role changes made here reach running servers within the server's
//! profile cache TTL.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use secrecy::ExposeSecret;
use sqlx::PgPool;

use bookpress_core::{Email, Role, UserId};

use super::CliError;

/// Create a new user with the given role.
///
/// Returns the ID of the created user.
pub async fn create(
    email: &str,
    password: &str,
    role: &str,
    display_name: Option<&str>,
) -> Result<UserId, CliError> {
    dotenvy::dotenv().ok();

    let role: Role = role
        .parse()
        .map_err(|_| CliError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|e| CliError::InvalidEmail(e.to_string()))?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| CliError::Hashing)?
        .to_string();

    let database_url = super::database_url()?;

    tracing::info!("Connecting to platform database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let existing: Option<UserId> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(CliError::UserExists(email.as_str().to_owned()));
    }

    let mut tx = pool.begin().await?;

    let user_id: UserId = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id",
    )
    .bind(email.as_str())
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO profiles (user_id, role, display_name) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(role.as_str())
        .bind(display_name)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user_id,
        email,
        role.as_str()
    );

    Ok(user_id)
}

/// Change an existing user's role.
pub async fn set_role(email: &str, role: &str) -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let role: Role = role
        .parse()
        .map_err(|_| CliError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|e| CliError::InvalidEmail(e.to_string()))?;

    let database_url = super::database_url()?;

    tracing::info!("Connecting to platform database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let user_id: Option<UserId> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&pool)
        .await?;

    let Some(user_id) = user_id else {
        return Err(CliError::UserNotFound(email.as_str().to_owned()));
    };

    sqlx::query(
        "INSERT INTO profiles (user_id, role) VALUES ($1, $2) \
         ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role, updated_at = NOW()",
    )
    .bind(user_id)
    .bind(role.as_str())
    .execute(&pool)
    .await?;

    tracing::info!("Role updated: {} is now {}", email, role.as_str());
    Ok(())
}
