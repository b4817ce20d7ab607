use std::{str::FromStr, sync::Arc};

use poem::listener::TcpListener;
use tracing::Level;
use user_profile_api::{core::db::init_pool, init_openapi_route, settings::get_config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config()?;
    let log_level = match &config.log_level {
        Some(val) => Level::from_str(val)?,
        None => Level::DEBUG,
    };
    // Logging to File
    let log_dir = config.log_dir.clone().unwrap_or("./logs".to_string());
    let file_appender = tracing_appender::rolling::daily(log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(log_level)
        .init();

    tracing::info!(
        host = %config.host,
        port = config.port,
        prefix = ?config.prefix,
        "run with config"
    );

    // Init Database Connection
    tracing::info!("Init Postgres connection");
    let pool = init_pool(&config).await?;
    // Init Redis Connection
    tracing::info!("Init Redis connection on {}", config.redis_url);
    let client = redis::Client::open(config.redis_url.clone())?;
    let redis_pool = r2d2::Pool::builder().build(client)?;
    // Init App State
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
        config: config.clone(),
    });

    let app = init_openapi_route(app_state, &config);
    tracing::info!("run server on {}:{}", config.host, config.port);
    poem::Server::new(TcpListener::bind(format!(
        "{}:{}",
        config.host, config.port
    )))
    .run(app)
    .await?;
    Ok(())
}
