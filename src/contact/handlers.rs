use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{info, instrument};

use crate::{
    books::dto::CreatedResponse, contact::dto::ContactRequest, error::ApiError,
    extract::JsonBody, state::AppState,
};

pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/contact", post(submit_contact))
}

#[instrument(skip(state, payload))]
pub async fn submit_contact(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ContactRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let msg = payload.validate()?;
    let id = state.contact.create(&msg).await?;
    info!(id, "contact message stored");
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Message sent successfully".into(),
            id,
        }),
    ))
}
