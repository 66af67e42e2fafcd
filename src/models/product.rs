use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    /// `/images/<file>`, or empty when the product has no image.
    pub img: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(draft: ProductDraft) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            category: draft.category,
            price: draft.price,
            img: draft.img,
            created_at: Utc::now(),
        }
    }
}

/// The replaceable fields of a product, as used by create and by the full
/// replace on edit.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub img: String,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("Product category is required".to_string());
        }
        if !self.price.is_finite() {
            return Err("Product price must be a number".to_string());
        }
        Ok(())
    }
}
