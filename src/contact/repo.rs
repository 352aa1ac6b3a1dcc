use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::StoreError;

/// Validated contact form, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[async_trait]
pub trait ContactRepo: Send + Sync {
    async fn create(&self, msg: &NewContactMessage) -> Result<i64, StoreError>;
}

#[derive(Clone)]
pub struct PgContactRepo {
    db: PgPool,
}

impl PgContactRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactRepo for PgContactRepo {
    async fn create(&self, msg: &NewContactMessage) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO contact_messages (name, email, message)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&msg.name)
        .bind(&msg.email)
        .bind(&msg.message)
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }
}
