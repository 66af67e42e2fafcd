//! End-to-end tests against the in-memory router.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{add_category, app, empty_request, json_request, product_form, MultipartBody};

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

#[tokio::test]
async fn root_says_hello() {
    let app = app();
    let (status, body) = app.send_raw(empty_request(Method::GET, "/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Hello World...");
}

#[tokio::test]
async fn category_tree_round_trip() {
    let app = app();

    let (status, created) = app
        .send(json_request(Method::POST, "/user/add_category", json!({ "name": "Electronics" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "Category added successfully");
    assert!(created["category"]["parent"].is_null());
    let electronics = created["category"]["id"].as_str().unwrap().to_string();
    assert!(!electronics.is_empty());

    add_category(&app, "Phones", Some(&electronics)).await;

    let (status, listed) = app.send(empty_request(Method::GET, "/user/get_categories")).await;
    assert_eq!(status, StatusCode::OK);
    let categories = listed["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 2);

    let phones = categories.iter().find(|c| c["name"] == "Phones").unwrap();
    assert_eq!(phones["parent"]["id"], electronics.as_str());
    assert_eq!(phones["parent"]["name"], "Electronics");
    assert!(phones["parent"]["parent"].is_null());
}

#[tokio::test]
async fn get_categories_stops_after_three_ancestors() {
    let app = app();
    let mut parent: Option<String> = None;
    let mut ids = Vec::new();
    for name in ["l0", "l1", "l2", "l3", "l4"] {
        let id = add_category(&app, name, parent.as_deref()).await;
        ids.push(id.clone());
        parent = Some(id);
    }

    let (_, listed) = app.send(empty_request(Method::GET, "/user/get_categories")).await;
    let deepest = listed["categories"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "l4")
        .unwrap()
        .clone();

    let third = &deepest["parent"]["parent"]["parent"];
    assert_eq!(third["name"], "l1");
    assert_eq!(third["parent"], ids[0].as_str());
}

#[tokio::test]
async fn add_category_without_name_is_rejected() {
    let app = app();
    let (status, body) = app
        .send(json_request(Method::POST, "/user/add_category", json!({ "name": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Category name is required");

    let (status, _) = app
        .send(json_request(Method::POST, "/user/add_category", json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app();
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/user/add_category")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn edit_and_delete_category() {
    let app = app();
    let root = add_category(&app, "Root", None).await;
    let child = add_category(&app, "Child", None).await;

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            &format!("/user/edit_category/{}", child),
            json!({ "name": "Renamed", "parent": root }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category updated successfully");
    assert_eq!(body["category"]["name"], "Renamed");
    assert_eq!(body["category"]["parent"], root.as_str());

    let (status, body) = app
        .send(empty_request(Method::DELETE, &format!("/user/delete_category/{}", child)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deleted successfully");

    let (status, _) = app
        .send(empty_request(Method::DELETE, &format!("/user/delete_category/{}", child)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_missing_category_is_not_found() {
    let app = app();
    let (status, body) = app
        .send(json_request(
            Method::PUT,
            "/user/edit_category/does-not-exist",
            json!({ "name": "x" }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");
}

#[tokio::test]
async fn edit_category_rejects_cycle() {
    let app = app();
    let root = add_category(&app, "Root", None).await;
    let child = add_category(&app, "Child", Some(&root)).await;

    let (status, _) = app
        .send(json_request(
            Method::PUT,
            &format!("/user/edit_category/{}", root),
            json!({ "name": "Root", "parent": child }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_then_login() {
    let app = app();
    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/user/register_user",
            json!({ "username": "sam", "email": "sam@example.com", "password": "pw" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User Added Successfully...");
    assert_eq!(body["user"]["email"], "sam@example.com");

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/user/login",
            json!({ "email": "sam@example.com", "password": "pw" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login Success.....");

    let (status, _) = app
        .send(json_request(
            Method::POST,
            "/user/login",
            json!({ "email": "sam@example.com", "password": "wrong" }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/user/login",
            json!({ "email": "nobody@example.com", "password": "pw" }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn register_requires_fields() {
    let app = app();
    let (status, _) = app
        .send(json_request(
            Method::POST,
            "/user/register_user",
            json!({ "username": "sam", "password": "pw" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_is_stateless() {
    let app = app();
    let (status, body) = app.send(empty_request(Method::POST, "/user/logout")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
}

#[tokio::test]
async fn add_product_with_image_and_serve_it() {
    let app = app();
    let category = add_category(&app, "Phones", None).await;

    let request = product_form("Pixel", &category, "499.5")
        .file("img", "photo.jpg", "image/jpeg", JPEG)
        .into_request(Method::POST, "/user/add_product");
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["message"], "Product added successfully");
    assert_eq!(body["product"]["price"], 499.5);
    assert_eq!(body["product"]["category"], category.as_str());

    let img = body["product"]["img"].as_str().unwrap().to_string();
    assert!(img.starts_with("/images/") && img.ends_with(".jpg"), "{}", img);
    assert_eq!(app.stored_files(), 1);

    let (status, served) = app.send_raw(empty_request(Method::GET, &img)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, JPEG);
}

#[tokio::test]
async fn add_product_without_image_has_empty_img() {
    let app = app();
    let request = product_form("Cable", "cat-1", "5")
        .into_request(Method::POST, "/user/add_product");
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product"]["img"], "");
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn png_upload_is_rejected_without_writing() {
    let app = app();
    let request = product_form("Pixel", "cat-1", "10")
        .file("img", "photo.png", "image/jpeg", JPEG)
        .into_request(Method::POST, "/user/add_product");
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Images only"));
    assert_eq!(app.stored_files(), 0);

    let (_, listed) = app.send(empty_request(Method::GET, "/user/get_products")).await;
    assert!(listed["products"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_upload_is_rejected_without_writing() {
    let app = app();
    let data = vec![0u8; 10 * 1024 * 1024 + 1];
    let request = product_form("Huge", "cat-1", "10")
        .file("img", "huge.jpg", "image/jpeg", &data)
        .into_request(Method::POST, "/user/add_product");
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "File size too large");
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn second_file_is_rejected() {
    let app = app();
    let request = product_form("Pixel", "cat-1", "10")
        .file("img", "a.jpg", "image/jpeg", JPEG)
        .file("img", "b.jpg", "image/jpeg", JPEG)
        .into_request(Method::POST, "/user/add_product");
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn missing_product_fields_do_not_store_image() {
    let app = app();
    let request = MultipartBody::new()
        .text("name", "Pixel")
        .file("img", "photo.jpg", "image/jpeg", JPEG)
        .into_request(Method::POST, "/user/add_product");
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product category is required");
    assert_eq!(app.stored_files(), 0);

    let request = product_form("Pixel", "cat-1", "cheap")

        .into_request(Method::POST, "/user/add_product");
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product price must be a number");
}

#[tokio::test]
async fn edit_product_without_image_clears_it() {
    let app = app();
    let request = product_form("Pixel", "cat-1", "10")
        .file("img", "photo.jpg", "image/jpeg", JPEG)
        .into_request(Method::POST, "/user/add_product");
    let (_, created) = app.send(request).await;
    let id = created["product"]["id"].as_str().unwrap().to_string();
    assert_ne!(created["product"]["img"], "");

    let request = product_form("Pixel 2", "cat-2", "12")
        .into_request(Method::PUT, &format!("/user/edit_product/{}", id));
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product updated successfully");
    assert_eq!(body["product"]["name"], "Pixel 2");
    assert_eq!(body["product"]["category"], "cat-2");
    assert_eq!(body["product"]["price"], 12.0);
    assert_eq!(body["product"]["img"], "");
}

#[tokio::test]
async fn edit_product_with_new_image_replaces_it() {
    let app = app();
    let request = product_form("Pixel", "cat-1", "10")
        .into_request(Method::POST, "/user/add_product");
    let (_, created) = app.send(request).await;
    let id = created["product"]["id"].as_str().unwrap().to_string();

    let request = product_form("Pixel", "cat-1", "10")
        .file("img", "new.jpg", "image/jpeg", JPEG)
        .into_request(Method::PUT, &format!("/user/edit_product/{}", id));
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["product"]["img"].as_str().unwrap().starts_with("/images/"));
}

#[tokio::test]
async fn edit_and_delete_missing_product_is_not_found() {
    let app = app();
    let request = product_form("Pixel", "cat-1", "10")
        .into_request(Method::PUT, "/user/edit_product/nope");
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");

    let (status, _) = app.send(empty_request(Method::DELETE, "/user/delete_product/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_missing_product_with_image_writes_nothing() {
    let app = app();
    let request = product_form("Pixel", "cat-1", "10")
        .file("img", "a.jpg", "image/jpeg", JPEG)
        .into_request(Method::PUT, "/user/edit_product/does-not-exist");
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
    assert_eq!(app.stored_files(), 0);
}

#[tokio::test]
async fn products_by_category_is_exact_match() {
    let app = app();
    let parent = add_category(&app, "Electronics", None).await;
    let child = add_category(&app, "Phones", Some(&parent)).await;

    for (name, category) in [("TV", &parent), ("Pixel", &child), ("iPhone", &child)] {
        let request = product_form(name, category, "1")
            .into_request(Method::POST, "/user/add_product");
        let (status, _) = app.send(request).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .send(empty_request(Method::GET, &format!("/user/get_products/{}", parent)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "TV");

    let (_, body) = app.send(empty_request(Method::GET, "/user/get_products")).await;
    assert_eq!(body["products"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn deleting_category_leaves_products_dangling() {
    let app = app();
    let category = add_category(&app, "Doomed", None).await;
    let request = product_form("Orphan", &category, "3")
        .into_request(Method::POST, "/user/add_product");
    let (_, created) = app.send(request).await;
    let product_id = created["product"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(empty_request(Method::DELETE, &format!("/user/delete_category/{}", category)))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.send(empty_request(Method::GET, "/user/get_products")).await;
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], product_id.as_str());
    assert_eq!(products[0]["category"], category.as_str());

    let (status, _) = app
        .send(empty_request(Method::DELETE, &format!("/user/delete_product/{}", product_id)))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn non_multipart_product_request_is_rejected() {
    let app = app();
    let (status, body) = app
        .send(json_request(Method::POST, "/user/add_product", json!({ "name": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}
