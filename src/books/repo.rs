use async_trait::async_trait;
use sqlx::PgPool;

use crate::books::repo_types::{Book, BookFields};
use crate::error::StoreError;

#[async_trait]
pub trait BookRepo: Send + Sync {
    /// Every book, ordered by id.
    async fn list(&self) -> Result<Vec<Book>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Book>, StoreError>;

    /// Case-insensitive substring match on the title, ordered by id.
    async fn search_by_title(&self, fragment: &str) -> Result<Vec<Book>, StoreError>;

    async fn create(&self, book: &BookFields) -> Result<i64, StoreError>;

    /// Returns the number of rows matched.
    async fn update(&self, id: i64, book: &BookFields) -> Result<u64, StoreError>;

    /// Returns the number of rows removed.
    async fn delete(&self, id: i64) -> Result<u64, StoreError>;
}

/// Escape LIKE metacharacters so the user text matches literally.
pub(crate) fn like_pattern(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 2);
    out.push('%');
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[derive(Clone)]
pub struct PgBookRepo {
    db: PgPool,
}

impl PgBookRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepo for PgBookRepo {
    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, price, description
            FROM books
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<Book>, StoreError> {
        let row = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, price, description
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn search_by_title(&self, fragment: &str) -> Result<Vec<Book>, StoreError> {
        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, price, description
            FROM books
            WHERE title ILIKE $1
            ORDER BY id
            "#,
        )
        .bind(like_pattern(fragment))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn create(&self, book: &BookFields) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, price, description)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.price)
        .bind(&book.description)
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }

    async fn update(&self, id: i64, book: &BookFields) -> Result<u64, StoreError> {
        let done = sqlx::query(
            r#"
            UPDATE books
               SET title = $1, price = $2, description = $3
             WHERE id = $4
            "#,
        )
        .bind(&book.title)
        .bind(&book.price)
        .bind(&book.description)
        .bind(id)
        .execute(&self.db)
        .await?;
        Ok(done.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let done = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected())
    }
}
