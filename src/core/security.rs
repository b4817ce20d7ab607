use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{Duration, Local};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use poem::Request;
use poem_openapi::{auth::Bearer, SecurityScheme};
use redis::ConnectionLike;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{model::user::User, repository::user::get_user_by_id, settings::Config};

use super::session::get_session;

/// password hashing
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    // Argon2 with default params (Argon2id v19)
    let argon2 = Argon2::default();

    // Hash password to PHC string ($argon2id$v=19$...)
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

/// password hash verification
pub fn verify_hash_password(
    password: &str,
    password_hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    let verify = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();
    Ok(verify)
}


pub struct Keys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

const ACCESS_TOKEN: &str = "access";
const REFRESH_TOKEN: &str = "refresh";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub user_name: String,
    pub exp: i64,
    pub iat: i64,
    /// Unique per issued token, so two logins in the same second differ.
    pub jti: String,
    pub type_key: String,
}

impl Claims {
    /// Access token claims, valid for `jwt_exp` seconds.
    pub fn new(user_id: &str, user_name: &str, config: &Config) -> Self {
        Self::with_lifetime(user_id, user_name, config.jwt_exp, ACCESS_TOKEN)
    }

    /// Refresh token claims, valid for `jwt_refresh_exp` seconds.
    pub fn new_refresh(user_id: &str, user_name: &str, config: &Config) -> Self {
        Self::with_lifetime(user_id, user_name, config.jwt_refresh_exp, REFRESH_TOKEN)
    }

    fn with_lifetime(user_id: &str, user_name: &str, seconds: u32, type_key: &str) -> Self {
        let now = Local::now();
        Self {
            id: user_id.to_string(),
            user_name: user_name.to_string(),
            exp: (now + Duration::seconds(seconds as i64)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::now_v7().to_string(),
            type_key: type_key.to_string(),
        }
    }
}

/// Generate token
pub fn encode_token(claims: &Claims, jwt_secret: &str) -> anyhow::Result<String> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &keys.encoding)?;
    Ok(token)
}

/// Extract payload and Validate token
pub fn decode_token(token: &str, jwt_secret: &str) -> anyhow::Result<Claims> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &keys.decoding, &Validation::default())?;
    Ok(token_data.claims)
}

pub fn generate_token_from_user(user: &User, config: &Config) -> anyhow::Result<String> {
    let claims = Claims::new(user.id.to_string().as_str(), user.user_name.as_str(), config);
    encode_token(&claims, &config.jwt_secret)
}

pub fn generate_refresh_token_from_user(user: &User, config: &Config) -> anyhow::Result<String> {
    let claims =
        Claims::new_refresh(user.id.to_string().as_str(), user.user_name.as_str(), config);
    encode_token(&claims, &config.jwt_secret)
}

/// Resolves the caller behind a bearer token.
///
/// `None` means the caller is not authenticated: no token, no live session, or the
/// session points at a user that is gone or deactivated.
pub async fn get_user_from_token<C: ConnectionLike>(
    tx: &mut Transaction<'_, Postgres>,
    redis_conn: &mut C,
    jwt_token: Option<String>,
) -> anyhow::Result<Option<User>> {
    let jwt_token = match jwt_token {
        Some(val) => val,
        None => return Ok(None),
    };
    let session = match get_session(redis_conn, jwt_token)? {
        Some(val) => val,
        None => return Ok(None),
    };
    let user_id = Uuid::parse_str(&session.user_id)?;
    let user = get_user_by_id(tx, &user_id).await?;
    Ok(user.filter(|x| x.is_active))
}

/// Resolves the user a refresh token was issued to.
///
/// Invalid, expired or access-typed tokens yield `None` rather than an error.
pub async fn get_user_from_refresh_token(
    tx: &mut Transaction<'_, Postgres>,
    refresh_token: &str,
    config: &Config,
) -> anyhow::Result<Option<User>> {
    let claims = match decode_token(refresh_token, &config.jwt_secret) {
        Ok(val) => val,
        Err(_) => return Ok(None),
    };
    if claims.type_key != REFRESH_TOKEN {
        return Ok(None);
    }
    let user_id = Uuid::parse_str(&claims.id)?;
    let user = get_user_by_id(tx, &user_id).await?;
    Ok(user.filter(|x| x.is_active))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserApiKey {
    pub token: Option<String>,
}

/// ApiKey authorization
#[derive(SecurityScheme)]
#[oai(ty = "bearer", checker = "bearer_checker")]
pub struct BearerAuthorization(pub UserApiKey);

pub async fn bearer_checker(_req: &Request, api_key: Bearer) -> Option<UserApiKey> {
    Some(UserApiKey {
        token: Some(api_key.token),
    })
}
