use std::env;

use serde::Deserialize;
use tracing::info;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub env: Option<String>, // file / server
    pub host: String,
    pub port: u16,
    pub prefix: Option<String>,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_exp: u32,
    pub jwt_refresh_exp: u32,
    pub redis_url: String,
    pub log_dir: Option<String>,
    pub log_level: Option<String>,
}

/// `.env` is read unless `ENV=server`.
fn loads_env_file(env_var: Option<&str>) -> bool {
    env_var != Some("server")
}

pub fn get_config() -> anyhow::Result<Config> {
    let env_var = env::var("ENV").ok();
    if loads_env_file(env_var.as_deref()) {
        info!("using .env file as environment variable");
        let _ = dotenvy::dotenv();
    } else {
        info!("using server environment as environment variable");
    }
    Ok(envy::from_env::<Config>()?)
}
