use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::AppError;
use crate::models::category::CategoryRequest;
use crate::services::AppState;

pub async fn add_category(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(request) = payload?;

    let category = state
        .categories
        .create(request.name.as_deref(), request.parent)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Category added successfully", "category": category })),
    ))
}

pub async fn get_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let depth = state.config.category_ancestor_depth;
    let categories = state.categories.list_resolved(depth).await?;

    Ok(Json(json!({ "categories": categories })))
}

pub async fn edit_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<String>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;

    let category = state
        .categories
        .update(&category_id, request.name.as_deref(), request.parent)
        .await?;

    Ok(Json(json!({ "message": "Category updated successfully", "category": category })))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.categories.delete(&category_id).await?;

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
