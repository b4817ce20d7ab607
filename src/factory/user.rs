use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::user::User;

pub struct UserFactory<T: Clone> {
    modifier_one: fn(x: &User, ext: T) -> User,
    modifier_many: fn(x: &User, idx: usize, ext: T) -> User,
}

impl<T: Clone> Default for UserFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> UserFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &User, ext: T) -> User) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &User, idx: usize, ext: T) -> User) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<User> {
        let data = UserDummy::generate_one();
        let data = (self.modifier_one)(&data, ext);
        insert_user(db, &data).await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<User>> {
        let mut result: Vec<User> = vec![];
        for (idx, item) in UserDummy::generate_many(num).iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        for item in result.iter() {
            insert_user(db, item).await?;
        }
        Ok(result)
    }
}

async fn insert_user(db: &PgPool, user: &User) -> anyhow::Result<()> {
    sqlx::query(
        r#"
    INSERT INTO public.user (id, user_name, password, is_active, created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5, $6)"#,
    )
    .bind(user.id)
    .bind(&user.user_name)
    .bind(&user.password)
    .bind(user.is_active)
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(db)
    .await?;
    Ok(())
}

#[derive(Debug, Dummy, Clone)]
struct UserDummy {
    pub id: Uuid,
    #[dummy(faker = "fake::faker::internet::en::Username()")]
    pub user_name: String,
    #[dummy(faker = "fake::faker::internet::en::Password(12..24)")]
    pub password: String,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl UserDummy {
    fn into_user(self, idx: usize) -> User {
        User {
            id: self.id,
            // suffix keeps user names unique within one batch
            user_name: format!("{}_{}", self.user_name, idx),
            password: self.password,
            is_active: true,
            created_date: self.created_date,
            updated_date: self.updated_date,
        }
    }

    pub fn generate_one() -> User {
        Faker.fake::<Self>().into_user(0)
    }

    pub fn generate_many(num: u32) -> Vec<User> {
        (0..num as usize)
            .map(|idx| Faker.fake::<Self>().into_user(idx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use crate::{factory::user::UserFactory, model::user::User};

    #[sqlx::test]
    async fn test_generate_one(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = UserFactory::<()>::new();
        factory.generate_one(&pool, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.user"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many_modified(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = UserFactory::<bool>::new();
        factory.modified_many(|data, idx, ext| User {
            id: data.id,
            user_name: format!("user_{}", idx),
            password: data.password.clone(),
            is_active: ext,
            created_date: data.created_date,
            updated_date: data.updated_date,
        });
        factory.generate_many(&pool, 5, false).await?;

        // Expect
        let res: Vec<(String, bool)> =
            sqlx::query_as(r#"SELECT user_name, is_active FROM public.user ORDER BY user_name"#)
                .fetch_all(&pool)
                .await?;
        assert_eq!(res.len(), 5);
        assert_eq!(res[0].0, "user_0".to_string());
        assert!(res.iter().all(|x| !x.1));
        Ok(())
    }
}
