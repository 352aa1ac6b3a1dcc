use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::books::repo_types::{Book, BookFields};
use crate::error::ApiError;
use crate::validation::{Checks, Field, FieldError};

/// Body of `POST /books` and `PUT /books/:id`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BookRequest {
    pub title: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
}

impl BookRequest {
    /// Missing description becomes "".
    pub fn validate(self) -> Result<BookFields, Vec<FieldError>> {
        let mut checks = Checks::default();
        let title = checks.require(Field::Title, self.title);
        let price = checks.require(Field::Price, self.price);
        checks.finish()?;
        Ok(BookFields {
            title,
            price,
            description: self.description.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Result of listing books: 204 when there are none, else 200 with the rows.
#[derive(Debug)]
pub enum BookListing {
    Empty,
    Found(Vec<Book>),
}

impl From<Vec<Book>> for BookListing {
    fn from(books: Vec<Book>) -> Self {
        if books.is_empty() {
            BookListing::Empty
        } else {
            BookListing::Found(books)
        }
    }
}

impl IntoResponse for BookListing {
    fn into_response(self) -> Response {
        match self {
            BookListing::Empty => StatusCode::NO_CONTENT.into_response(),
            BookListing::Found(books) => (StatusCode::OK, Json(books)).into_response(),
        }
    }
}

/// Parse the `:id` path segment.
///
/// Any numeric text is accepted (`7`, ` 7 `, `7.0`, `7e0`). `Ok(None)` means
/// the value is numeric but can never be a row id, such as `1.5` or `1e30`,
/// and should be answered as "not found".
pub fn parse_book_id(raw: &str) -> Result<Option<i64>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::BadRequest("Book ID is required".into()));
    }
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(Some(id));
    }
    let value = match raw.parse::<f64>() {
        Ok(v) if !v.is_nan() => v,
        _ => return Err(ApiError::BadRequest("Book ID must be a number".into())),
    };
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    if value.is_finite() && value.fract() == 0.0 && in_range {
        Ok(Some(value as i64))
    } else {
        Ok(None)
    }
}
