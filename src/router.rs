use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::handlers::{auth, categories, health, products};
use crate::services::upload::PUBLIC_PREFIX;
use crate::services::AppState;

// Room for the text fields and multipart framing around a maximum-size image.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.uploader.max_size() + MULTIPART_OVERHEAD;
    let images = ServeDir::new(state.uploader.dir());

    let user_routes = Router::new()
        // Users
        .route("/register_user", post(auth::register_user))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        // Categories
        .route("/add_category", post(categories::add_category))
        .route("/get_categories", get(categories::get_categories))
        .route("/edit_category/:id", put(categories::edit_category))
        .route("/delete_category/:id", delete(categories::delete_category))
        // Products
        .route("/add_product", post(products::add_product))
        .route("/edit_product/:id", put(products::edit_product))
        .route("/delete_product/:id", delete(products::delete_product))
        .route("/get_products", get(products::get_products))
        .route("/get_products/:category_id", get(products::get_products_by_category));

    Router::new()
        .route("/", get(health::root))
        .nest("/user", user_routes)
        .nest_service(PUBLIC_PREFIX, images)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
