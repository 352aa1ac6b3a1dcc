use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Book record in the database. `price` is display text, not a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub price: String,
    pub description: String,
}

/// Validated writable columns of a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub price: String,
    pub description: String,
}
