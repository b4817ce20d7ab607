use chrono::Local;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{core::security::hash_password, model::user::User, repository};

pub async fn create_user(pool: &PgPool, username: &str, password: &str) -> anyhow::Result<User> {
    let mut tx = pool.begin().await?;
    if repository::user::get_user_by_username(&mut tx, username)
        .await?
        .is_some()
    {
        anyhow::bail!("user {} already exists", username);
    }

    let hashed_password = hash_password(password).map_err(|err| anyhow::anyhow!(err))?;
    let now = Local::now().fixed_offset();
    let user = User {
        id: Uuid::now_v7(),
        user_name: username.to_string(),
        password: hashed_password,
        is_active: true,
        created_date: Some(now),
        updated_date: Some(now),
    };
    repository::user::create_user(&mut tx, &user).await?;
    tx.commit().await?;
    tracing::info!(user_id = %user.id, "user created");
    Ok(user)
}

/// Removes the user for good, taking its profile with it.
pub async fn delete_user(pool: &PgPool, username: &str) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    let user = match repository::user::get_user_by_username(&mut tx, username).await? {
        Some(val) => val,
        None => anyhow::bail!("user {} not found", username),
    };
    repository::user::delete_user(&mut tx, &user).await?;
    tx.commit().await?;
    tracing::info!(user_id = %user.id, "user deleted");
    Ok(())
}
