use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    books::{
        dto::{parse_book_id, BookListing, BookRequest, CreatedResponse, MessageResponse},
        repo_types::Book,
    },
    error::ApiError,
    extract::{JsonBody, PathParam},
    state::AppState,
};

pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/books/search/", get(search_without_title))
        .route("/books/search/:title", get(search_books))
}

fn book_not_found() -> ApiError {
    ApiError::NotFound("Book not found".into())
}

#[instrument(skip(state))]
pub async fn list_books(State(state): State<AppState>) -> Result<BookListing, ApiError> {
    let books = state.books.list().await?;
    Ok(BookListing::from(books))
}

#[instrument(skip(state))]
pub async fn get_book(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<Json<Book>, ApiError> {
    let Some(id) = parse_book_id(&id)? else {
        warn!("numeric id can never match a book");
        return Err(book_not_found());
    };
    match state.books.get(id).await? {
        Some(book) => Ok(Json(book)),
        None => {
            warn!(id, "book not found");
            Err(book_not_found())
        }
    }
}

fn title_required() -> ApiError {
    ApiError::BadRequest("Title is required".into())
}

/// `GET /books/search/` with nothing after the slash.
pub async fn search_without_title() -> ApiError {
    title_required()
}

#[instrument(skip(state))]
pub async fn search_books(
    State(state): State<AppState>,
    PathParam(title): PathParam<String>,
) -> Result<Json<Vec<Book>>, ApiError> {
    if title.is_empty() {
        return Err(title_required());
    }
    let books = state.books.search_by_title(&title).await?;
    if books.is_empty() {
        return Err(ApiError::NotFound("No books found".into()));
    }
    Ok(Json(books))
}

#[instrument(skip(state, payload))]
pub async fn create_book(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<BookRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let fields = payload.validate()?;
    let id = state.books.create(&fields).await?;
    info!(id, title = %fields.title, "book created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Book created successfully".into(),
            id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_book(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
    JsonBody(payload): JsonBody<BookRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_book_id(&id)?;
    let fields = payload
        .validate()
        .map_err(|_| ApiError::BadRequest("Title and price are required".into()))?;

    let Some(id) = id else {
        warn!("numeric id can never match a book");
        return Err(book_not_found());
    };
    if state.books.update(id, &fields).await? == 0 {
        warn!(id, "update matched no book");
        return Err(book_not_found());
    }
    info!(id, "book updated");
    Ok(Json(MessageResponse {
        message: "Book updated successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_book(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Some(id) = parse_book_id(&id)? else {
        warn!("numeric id can never match a book");
        return Err(book_not_found());
    };
    if state.books.delete(id).await? == 0 {
        warn!(id, "delete matched no book");
        return Err(book_not_found());
    }
    info!(id, "book deleted");
    Ok(Json(MessageResponse {
        message: "Book deleted successfully".into(),
    }))
}
