use fake::{
    faker::{
        address::en::StreetName,
        lorem::en::{Sentence, Words},
        number::en::NumberWithFormat,
    },
    Dummy, Fake, Faker,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{model::user_profile::UserProfile, repository};

/// Builds profiles whose field values stay within the column constraints.
///
/// The owner is a required input, so every modifier receives the `ext` value
/// and is expected to set `user_id` from it.
pub struct UserProfileFactory<T: Clone> {
    modifier_one: fn(x: &UserProfile, ext: T) -> UserProfile,
    modifier_many: fn(x: &UserProfile, idx: usize, ext: T) -> UserProfile,
}

impl Default for UserProfileFactory<Uuid> {
    fn default() -> Self {
        Self::new()
    }
}

impl UserProfileFactory<Uuid> {
    /// Factory whose `ext` is the owning user id.
    pub fn new() -> Self {
        Self {
            modifier_one: |x, ext| UserProfile {
                user_id: ext,
                ..x.clone()
            },
            modifier_many: |x, _, ext| UserProfile {
                user_id: ext,
                ..x.clone()
            },
        }
    }
}

impl UserProfileFactory<Vec<Uuid>> {
    /// Factory for batches; profile `idx` is owned by `ext[idx]`.
    pub fn for_users() -> Self {
        Self {
            modifier_one: |x, ext| UserProfile {
                user_id: ext[0],
                ..x.clone()
            },
            modifier_many: |x, idx, ext| UserProfile {
                user_id: ext[idx],
                ..x.clone()
            },
        }
    }
}

impl<T: Clone> UserProfileFactory<T> {
    pub fn modified_one(&mut self, modifier: fn(x: &UserProfile, ext: T) -> UserProfile) {
        self.modifier_one = modifier
    }

    pub fn modified_many(
        &mut self,
        modifier: fn(x: &UserProfile, idx: usize, ext: T) -> UserProfile,
    ) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<UserProfile> {
        let data = UserProfileDummy::generate_one();
        let data = (self.modifier_one)(&data, ext);
        let mut tx = db.begin().await?;
        repository::user_profile::create_user_profile(&mut tx, &data).await?;
        tx.commit().await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<UserProfile>> {
        let mut result: Vec<UserProfile> = vec![];
        for (idx, item) in UserProfileDummy::generate_many(num).iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.iter() {
            repository::user_profile::create_user_profile(&mut tx, item).await?;
        }
        tx.commit().await?;
        Ok(result)
    }
}

#[derive(Debug, Dummy, Clone)]
struct UserProfileDummy {
    #[dummy(faker = "Sentence(3..12)")]
    pub biography: String,
    #[dummy(faker = "0..100")]
    pub age: i32,
    pub has_age: bool,
    #[dummy(faker = "NumberWithFormat(\"+62##########\")")]
    pub phone: String,
    #[dummy(faker = "StreetName()")]
    pub address: String,
    #[dummy(faker = "Words(1..4)")]
    pub education: Vec<String>,
    #[dummy(faker = "0..10")]
    pub pets_count: i32,
}

impl UserProfileDummy {
    fn into_user_profile(self) -> UserProfile {
        UserProfile {
            id: Uuid::now_v7(),
            user_id: Uuid::nil(),
            biography: self.biography,
            age: if self.has_age { Some(self.age) } else { None },
            phone: self.phone,
            address: self.address,
            education: self.education.join(" "),
            pets_count: self.pets_count,
        }
    }

    pub fn generate_one() -> UserProfile {
        Faker.fake::<Self>().into_user_profile()
    }

    pub fn generate_many(num: u32) -> Vec<UserProfile> {
        (0..num)
            .map(|_| Faker.fake::<Self>().into_user_profile())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use uuid::Uuid;

    use crate::{
        factory::{user::UserFactory, user_profile::UserProfileFactory},
        model::user_profile::UserProfile,
    };

    #[sqlx::test]
    async fn test_generate_one(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut user_factory = UserFactory::<()>::new();
        let user = user_factory.generate_one(&pool, ()).await?;
        let mut factory = UserProfileFactory::new();
        let profile = factory.generate_one(&pool, user.id).await?;

        // Expect
        let res: (Uuid, Uuid) = sqlx::query_as(r#"SELECT id, user_id FROM public.user_profile"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(res.0, profile.id);
        assert_eq!(res.1, user.id);
        assert!(profile.phone.chars().count() <= 15);
        assert!(profile.pets_count >= 0);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_one_modified(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut user_factory = UserFactory::<()>::new();
        let user = user_factory.generate_one(&pool, ()).await?;
        let mut factory = UserProfileFactory::new();
        factory.modified_one(|data, ext| UserProfile {
            user_id: ext,
            biography: "hello".to_string(),
            pets_count: 3,
            ..data.clone()
        });
        factory.generate_one(&pool, user.id).await?;

        // Expect
        let res: (Uuid, String, i32) = sqlx::query_as(
            r#"SELECT user_id, biography, pets_count FROM public.user_profile"#,
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(res.0, user.id);
        assert_eq!(res.1, "hello".to_string());
        assert_eq!(res.2, 3);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many_for_users(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut user_factory = UserFactory::<()>::new();
        let users = user_factory.generate_many(&pool, 4, ()).await?;
        let user_ids: Vec<Uuid> = users.iter().map(|x| x.id).collect();
        let mut factory = UserProfileFactory::for_users();
        factory.generate_many(&pool, 4, user_ids.clone()).await?;

        // Expect
        let res: Vec<(Uuid,)> =
            sqlx::query_as(r#"SELECT user_id FROM public.user_profile ORDER BY id"#)
                .fetch_all(&pool)
                .await?;
        let res: Vec<Uuid> = res.into_iter().map(|x| x.0).collect();
        assert_eq!(res, user_ids);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many_is_one_per_user(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let mut user_factory = UserFactory::<()>::new();
        let user = user_factory.generate_one(&pool, ()).await?;

        // When
        let mut factory = UserProfileFactory::new();
        let res = factory.generate_many(&pool, 2, user.id).await;

        // Expect
        assert!(res.is_err());
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.user_profile"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 0);
        Ok(())
    }
}
