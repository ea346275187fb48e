//! Super admin bootstrap.

use anyhow::{Context, bail};
use campusdesk_core::hash_password;
use campusdesk_models::ids::UserId;
use campusdesk_models::UserRole;
use sqlx::PgPool;

/// Inserts a super admin. Fails if the email is already taken.
pub async fn create_super_admin(
    db: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<UserId> {
    if password.len() < 8 {
        bail!("Password must be at least 8 characters");
    }

    let hashed = hash_password(password).map_err(|e| e.error)?;

    let user_id = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (first_name, last_name, email, password, role)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(first_name.trim())
    .bind(last_name.trim())
    .bind(email.trim().to_lowercase())
    .bind(&hashed)
    .bind(UserRole::SuperAdmin)
    .fetch_optional(db)
    .await
    .context("Failed to insert super admin")?;

    match user_id {
        Some(id) => Ok(id),
        None => bail!("A user with email {email} already exists"),
    }
}
