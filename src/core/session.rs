use redis::ConnectionLike;
use serde::{Deserialize, Serialize};

use crate::{model::user::User, settings::Config};

/// Redis value stored under an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: String,
    pub refresh_token: String,
}

/// Stores the access token session and registers its refresh token.
pub fn add_session<C: ConnectionLike>(
    redis_conn: &mut C,
    user: &User,
    config: &Config,
    token: String,
    refresh_token: String,
) -> anyhow::Result<()> {
    let session_data = SessionData {
        user_id: user.id.to_string(),
        refresh_token: refresh_token.clone(),
    };
    let session_json = serde_json::to_string(&session_data)?;
    redis::Cmd::set_ex(token, session_json, config.jwt_exp as u64).exec(redis_conn)?;
    redis::Cmd::set_ex(
        refresh_token,
        user.id.to_string(),
        config.jwt_refresh_exp as u64,
    )
    .exec(redis_conn)?;
    Ok(())
}

pub fn get_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: String,
) -> anyhow::Result<Option<SessionData>> {
    let res: Option<String> = redis::cmd("GET").arg(token).query(redis_conn)?;
    match res {
        Some(val) => Ok(Some(serde_json::from_str(val.as_str())?)),
        None => Ok(None),
    }
}

/// A refresh token is usable only while its key is alive.
pub fn is_refresh_token_active<C: ConnectionLike>(
    redis_conn: &mut C,
    refresh_token: &str,
) -> anyhow::Result<bool> {
    let res: Option<String> = redis::cmd("GET").arg(refresh_token).query(redis_conn)?;
    Ok(res.is_some())
}

/// Consumes a refresh token so it cannot be replayed.
pub fn remove_refresh_token<C: ConnectionLike>(
    redis_conn: &mut C,
    refresh_token: &str,
) -> anyhow::Result<()> {
    redis::cmd("DEL").arg(refresh_token).exec(redis_conn)?;
    Ok(())
}

/// Drops the session and its refresh token. Returns false if no session existed.
pub fn remove_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: String,
) -> anyhow::Result<bool> {
    let session_data = match get_session(redis_conn, token.clone())? {
        Some(val) => val,
        None => return Ok(false),
    };
    remove_refresh_token(redis_conn, &session_data.refresh_token)?;
    redis::cmd("DEL").arg(token).exec(redis_conn)?;
    Ok(true)
}
