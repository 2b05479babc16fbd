use crate::common::redis_pool::{RedisPool, RedisPoolManager};
use crate::common::state::AppState;
use crate::settings::AppSettings;
use anyhow::anyhow;
use deadpool::Runtime;
use redis::{AsyncConnectionConfig, Commands};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};

pub fn initialize_logging(settings: &AppSettings) {
    tracing_subscriber::fmt()
        .with_max_level(settings.level)
        .with_timer(tracing_subscriber::fmt::time())
        .with_level(true)
        .compact()
        .init();
}

pub async fn initialize_state(settings: &AppSettings) -> anyhow::Result<AppState> {
    let db = initialize_db(settings).await?;
    let (redis_client, redis) = initialize_redis(settings)?;
    Ok(AppState {
        db,
        redis,
        redis_client,
    })
}

pub async fn initialize_db(settings: &AppSettings) -> anyhow::Result<Pool<MySql>> {
    let database_url = settings
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow!("DATABASE_URL is not set"))?;
    let pool = MySqlPoolOptions::new()
        .acquire_timeout(settings.db_wait_timeout)
        .max_connections(settings.db_max_connections as _)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub fn initialize_redis(settings: &AppSettings) -> anyhow::Result<(redis::Client, RedisPool)> {
    let redis_url = settings
        .redis_url
        .as_deref()
        .ok_or_else(|| anyhow!("REDIS_URL is not set"))?;
    let redis_client = redis::Client::open(redis_url)?;
    let mut conn = redis_client.get_connection_with_timeout(settings.redis_wait_timeout)?;
    let _: () = conn.ping()?;
    let redis_cfg = AsyncConnectionConfig::new()
        .set_connection_timeout(settings.redis_connection_timeout)
        .set_response_timeout(settings.redis_response_timeout);

    let redis_manager = RedisPoolManager::new(redis_client.clone(), redis_cfg);
    let redis = RedisPool::builder(redis_manager)
        .max_size(settings.redis_max_connections)
        .wait_timeout(Some(settings.redis_wait_timeout))
        .runtime(Runtime::Tokio1)
        .build()?;
    Ok((redis_client, redis))
}
