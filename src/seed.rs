use crate::{
    config::AppConfig,
    error::{AppError, Result},
    identity::IdentityStore,
    models::{ADMIN_ROLE, DEFAULT_ROLE},
};

/// seed_defaults
///
/// Ensures the `ADMIN` and `USER` roles exist and registers the bootstrap `admin` and
/// `user` accounts. Safe to run repeatedly: accounts that already exist are left alone.
pub async fn seed_defaults(identity: &dyn IdentityStore, config: &AppConfig) -> Result<()> {
    identity.find_or_create_role(ADMIN_ROLE).await;
    identity.find_or_create_role(DEFAULT_ROLE).await;

    seed_account(identity, "admin", &config.seed_admin_password, ADMIN_ROLE).await?;

    match &config.seed_user_password {
        Some(secret) => seed_account(identity, "user", secret, DEFAULT_ROLE).await?,
        None => tracing::info!("SEED_USER_PASSWORD not set; skipping the 'user' account"),
    }

    Ok(())
}

async fn seed_account(
    identity: &dyn IdentityStore,
    username: &str,
    secret: &str,
    role: &str,
) -> Result<()> {
    match identity.register(username, secret, role).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, "seeded account '{}'", username);
            Ok(())
        }
        Err(AppError::DuplicateUsername(_)) => {
            tracing::info!("account '{}' already exists", username);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
