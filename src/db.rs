use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::DatabaseConfig;

pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect(&cfg.url)
        .await
        .context("connect to database")?;
    info!(max_connections = cfg.max_connections, "connected to postgres");

    if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
        warn!(error = %e, "migration failed; continuing with existing schema");
    }
    Ok(db)
}
