//! Persistence for users, categories and products.
//!
//! Each store is a trait with a small set of backend primitives plus
//! provided methods that carry the validation and lookup rules, so the
//! Postgres and in-memory backends behave identically.

pub mod category_repo;
pub mod memory;
pub mod product_repo;
pub mod user_repo;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::category::{
    creates_cycle, normalize_parent, resolve_ancestors, Category, CategoryNode,
};
use crate::models::product::{Product, ProductDraft};
use crate::models::user::User;

pub use category_repo::PgCategoryRepository;
pub use memory::{MemoryCategoryRepository, MemoryProductRepository, MemoryUserRepository};
pub use product_repo::PgProductRepository;
pub use user_repo::PgUserRepository;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    fn not_found(entity: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

fn required(value: Option<&str>, message: &str) -> StoreResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(StoreError::Validation(message.to_string())),
    }
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn insert(&self, category: &Category) -> StoreResult<()>;

    /// All categories ordered by creation time.
    async fn find_all(&self) -> StoreResult<Vec<Category>>;

    /// Overwrites name and parent; `None` if no category has this id.
    async fn replace(
        &self,
        id: &str,
        name: &str,
        parent: Option<&str>,
    ) -> StoreResult<Option<Category>>;

    /// Returns whether a category was removed.
    async fn remove(&self, id: &str) -> StoreResult<bool>;

    async fn create(&self, name: Option<&str>, parent: Option<String>) -> StoreResult<Category> {
        let name = required(name, "Category name is required")?;
        let category = Category::new(&name, normalize_parent(parent));
        self.insert(&category).await?;
        tracing::debug!(id = %category.id, "category created");
        Ok(category)
    }

    /// Every category with its ancestor chain expanded `depth` levels.
    async fn list_resolved(&self, depth: usize) -> StoreResult<Vec<CategoryNode>> {
        let categories = self.find_all().await?;
        Ok(resolve_ancestors(&categories, depth))
    }

    async fn update(
        &self,
        id: &str,
        name: Option<&str>,
        parent: Option<String>,
    ) -> StoreResult<Category> {
        let name = required(name, "Category name is required")?;
        let parent = normalize_parent(parent);

        let categories = self.find_all().await?;
        if !categories.iter().any(|c| c.id == id) {
            return Err(StoreError::not_found("Category", id));
        }
        if creates_cycle(&categories, id, parent.as_deref()) {
            return Err(StoreError::Validation(
                "A category cannot be its own ancestor".to_string(),
            ));
        }

        let updated = self
            .replace(id, &name, parent.as_deref())
            .await?
            .ok_or_else(|| StoreError::not_found("Category", id))?;
        tracing::debug!(id = %id, "category updated");
        Ok(updated)
    }

    /// Children and products referencing the category are left untouched.
    async fn delete(&self, id: &str) -> StoreResult<()> {
        if !self.remove(id).await? {
            return Err(StoreError::not_found("Category", id));
        }
        tracing::debug!(id = %id, "category deleted");
        Ok(())
    }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: &Product) -> StoreResult<()>;

    async fn find_all(&self) -> StoreResult<Vec<Product>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>>;

    /// Products whose category is exactly `category_id`.
    async fn find_by_category(&self, category_id: &str) -> StoreResult<Vec<Product>>;

    async fn replace(&self, id: &str, draft: &ProductDraft) -> StoreResult<Option<Product>>;

    async fn remove(&self, id: &str) -> StoreResult<bool>;

    async fn create(&self, draft: ProductDraft) -> StoreResult<Product> {
        draft.validate().map_err(StoreError::Validation)?;
        let product = Product::new(draft);
        self.insert(&product).await?;
        tracing::debug!(id = %product.id, "product created");
        Ok(product)
    }

    async fn get(&self, id: &str) -> StoreResult<Product> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    async fn list_all(&self) -> StoreResult<Vec<Product>> {
        self.find_all().await
    }

    async fn list_by_category(&self, category_id: &str) -> StoreResult<Vec<Product>> {
        self.find_by_category(category_id).await
    }

    /// Replaces all four fields, including `img`.
    async fn update(&self, id: &str, draft: ProductDraft) -> StoreResult<Product> {
        draft.validate().map_err(StoreError::Validation)?;
        let updated = self
            .replace(id, &draft)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", id))?;
        tracing::debug!(id = %id, "product updated");
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        if !self.remove(id).await? {
            return Err(StoreError::not_found("Product", id));
        }
        tracing::debug!(id = %id, "product deleted");
        Ok(())
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> StoreResult<()>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn register(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> StoreResult<User> {
        let username = required(username, "Username is required")?;
        let email = required(email, "Email is required")?;
        let password = match password {
            Some(p) if !p.is_empty() => p,
            _ => return Err(StoreError::Validation("Password is required".to_string())),
        };

        let user = User::new(&username, &email, password);
        self.insert(&user).await?;
        tracing::debug!(id = %user.id, "user registered");
        Ok(user)
    }
}
