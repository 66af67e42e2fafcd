use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::AppError;
use crate::models::product::ProductDraft;
use crate::services::upload::{PendingImage, UploadForm};
use crate::services::AppState;

fn required_field(form: &UploadForm, name: &str, label: &str) -> Result<String, AppError> {
    form.field(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation(format!("Product {} is required", label)))
}

/// Builds the draft from the text fields. `img` is left empty; the caller
/// fills it in once the image (if any) is on disk.
fn draft_from_form(form: &UploadForm) -> Result<ProductDraft, AppError> {
    let name = required_field(form, "name", "name")?;
    let category = required_field(form, "category", "category")?;
    let price = required_field(form, "price", "price")?
        .parse::<f64>()
        .map_err(|_| AppError::Validation("Product price must be a number".to_string()))?;

    let draft = ProductDraft {
        name,
        category,
        price,
        img: String::new(),
    };
    draft.validate().map_err(AppError::Validation)?;
    Ok(draft)
}

/// Reads and validates the form. The image stays buffered until
/// [`attach_image`] writes it.
async fn read_draft(
    state: &AppState,
    multipart: Multipart,
) -> Result<(ProductDraft, Option<PendingImage>), AppError> {
    let mut form = state.uploader.read_form(multipart).await?;
    let draft = draft_from_form(&form)?;
    Ok((draft, form.image.take()))
}

/// Writes the image and points the draft at it. A store failure after this
/// point leaves the written image on disk.
async fn attach_image(
    state: &AppState,
    mut draft: ProductDraft,
    image: Option<PendingImage>,
) -> Result<ProductDraft, AppError> {
    if let Some(image) = image {
        draft.img = state.uploader.store(image).await?;
    }
    Ok(draft)
}

pub async fn add_product(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let (draft, image) = read_draft(&state, multipart?).await?;
    let draft = attach_image(&state, draft, image).await?;
    let product = state.products.create(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Product added successfully", "product": product })),
    ))
}

/// Full replace. An edit without a new image clears the stored image path.
/// The product must exist before anything is written to disk.
pub async fn edit_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let (draft, image) = read_draft(&state, multipart?).await?;
    state.products.get(&product_id).await?;
    let draft = attach_image(&state, draft, image).await?;
    let product = state.products.update(&product_id, draft).await?;

    Ok(Json(json!({ "message": "Product updated successfully", "product": product })))
}

pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.products.delete(&product_id).await?;

    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

pub async fn get_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let products = state.products.list_all().await?;

    Ok(Json(json!({ "products": products })))
}

pub async fn get_products_by_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let products = state.products.list_by_category(&category_id).await?;

    Ok(Json(json!({ "products": products })))
}
