use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::model::user::{User, TABLE_NAME};

pub async fn get_user_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<User>> {
    Ok(
        sqlx::query_as(format!("SELECT * FROM {} WHERE id = $1", TABLE_NAME).as_str())
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?,
    )
}

pub async fn get_user_by_username(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
) -> anyhow::Result<Option<User>> {
    Ok(sqlx::query_as(
        format!("SELECT * FROM {} WHERE user_name = $1", TABLE_NAME).as_str(),
    )
    .bind(username)
    .fetch_optional(&mut **tx)
    .await?)
}

pub async fn create_user(tx: &mut Transaction<'_, Postgres>, user: &User) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, user_name, password, is_active, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user.id)
    .bind(&user.user_name)
    .bind(&user.password)
    .bind(user.is_active)
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Hard delete. The owned profile goes with it through `ON DELETE CASCADE`.
pub async fn delete_user(tx: &mut Transaction<'_, Postgres>, user: &User) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(user.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
