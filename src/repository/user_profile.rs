use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::model::{
    user::TABLE_NAME as USER_TABLE_NAME,
    user_profile::{UserProfile, UserProfileWithOwner, TABLE_NAME},
};

fn select_with_owner(filter: &str) -> String {
    format!(
        r#"SELECT p.id, p.user_id, p.biography, p.age, p.phone, p.address, p.education,
        p.pets_count, u.user_name AS owner_name
        FROM {} p
        JOIN {} u ON u.id = p.user_id
        {}
        ORDER BY p.id ASC"#,
        TABLE_NAME, USER_TABLE_NAME, filter
    )
}

pub async fn get_all_user_profile(
    tx: &mut Transaction<'_, Postgres>,
) -> anyhow::Result<Vec<UserProfileWithOwner>> {
    Ok(sqlx::query_as(select_with_owner("").as_str())
        .fetch_all(&mut **tx)
        .await?)
}

pub async fn get_user_profile_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<UserProfileWithOwner>> {
    Ok(sqlx::query_as(select_with_owner("WHERE p.id = $1").as_str())
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?)
}

pub async fn get_user_profile_by_user_id(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &Uuid,
) -> anyhow::Result<Option<UserProfile>> {
    Ok(
        sqlx::query_as(format!("SELECT * FROM {} WHERE user_id = $1", TABLE_NAME).as_str())
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?,
    )
}

pub async fn create_user_profile(
    tx: &mut Transaction<'_, Postgres>,
    user_profile: &UserProfile,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, user_id, biography, age, phone, address, education, pets_count)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user_profile.id)
    .bind(user_profile.user_id)
    .bind(&user_profile.biography)
    .bind(user_profile.age)
    .bind(&user_profile.phone)
    .bind(&user_profile.address)
    .bind(&user_profile.education)
    .bind(user_profile.pets_count)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Writes every mutable column. The owner (`user_id`) is never updated.
pub async fn update_user_profile(
    tx: &mut Transaction<'_, Postgres>,
    user_profile: &UserProfile,
) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"UPDATE {}
            SET biography = $1, age = $2, phone = $3, address = $4, education = $5,
            pets_count = $6
            WHERE id = $7"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&user_profile.biography)
    .bind(user_profile.age)
    .bind(&user_profile.phone)
    .bind(&user_profile.address)
    .bind(&user_profile.education)
    .bind(user_profile.pets_count)
    .bind(user_profile.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn delete_user_profile(
    tx: &mut Transaction<'_, Postgres>,
    user_profile: &UserProfile,
) -> anyhow::Result<()> {
    sqlx::query(format!("DELETE FROM {} WHERE id = $1", TABLE_NAME).as_str())
        .bind(user_profile.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
