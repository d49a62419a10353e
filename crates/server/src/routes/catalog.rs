use axum::{
    extract::{Path, State},
    Json,
};
use models::CatalogDocument;

use crate::errors::JsonApiError;
use crate::state::ServerState;

pub async fn list_categories(State(state): State<ServerState>) -> Result<Json<Vec<String>>, JsonApiError> {
    Ok(Json(state.reviews.list_categories().await?))
}

pub async fn qa_pairs(
    State(state): State<ServerState>,
    Path(category): Path<String>,
) -> Result<Json<CatalogDocument>, JsonApiError> {
    Ok(Json(state.reviews.qa_pairs(&category).await?))
}
