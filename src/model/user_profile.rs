use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.user_profile";

/// Extended attributes owned by exactly one [`User`](super::user::User).
#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub biography: String,
    pub age: Option<i32>,
    pub phone: String,
    pub address: String,
    pub education: String,
    pub pets_count: i32,
}

impl UserProfile {
    /// Blank profile for `user_id`, carrying the column defaults.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            biography: String::new(),
            age: None,
            phone: String::new(),
            address: String::new(),
            education: String::new(),
            pets_count: 0,
        }
    }
}

/// A profile row joined with its owner's user name.
#[derive(Clone, Debug, FromRow)]
pub struct UserProfileWithOwner {
    #[sqlx(flatten)]
    pub profile: UserProfile,
    pub owner_name: String,
}
