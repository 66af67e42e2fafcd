//! In-process stores keyed by id. Used when no database is configured.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{CategoryStore, ProductStore, StoreResult, UserStore};
use crate::models::category::Category;
use crate::models::product::{Product, ProductDraft};
use crate::models::user::User;

fn sorted<T: Clone>(
    map: &DashMap<String, T>,
    key: impl Fn(&T) -> (chrono::DateTime<chrono::Utc>, String),
) -> Vec<T> {
    let mut items: Vec<T> = map.iter().map(|entry| entry.value().clone()).collect();
    items.sort_by_key(|item| key(item));
    items
}

#[derive(Default)]
pub struct MemoryCategoryRepository {
    categories: DashMap<String, Category>,
}

impl MemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryRepository {
    async fn insert(&self, category: &Category) -> StoreResult<()> {
        self.categories.insert(category.id.clone(), category.clone());
        Ok(())
    }

    async fn find_all(&self) -> StoreResult<Vec<Category>> {
        Ok(sorted(&self.categories, |c| (c.created_at, c.id.clone())))
    }

    async fn replace(
        &self,
        id: &str,
        name: &str,
        parent: Option<&str>,
    ) -> StoreResult<Option<Category>> {
        Ok(self.categories.get_mut(id).map(|mut entry| {
            entry.name = name.to_string();
            entry.parent = parent.map(str::to_string);
            entry.clone()
        }))
    }

    async fn remove(&self, id: &str) -> StoreResult<bool> {
        Ok(self.categories.remove(id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryProductRepository {
    products: DashMap<String, Product>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductRepository {
    async fn insert(&self, product: &Product) -> StoreResult<()> {
        self.products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        Ok(sorted(&self.products, |p| (p.created_at, p.id.clone())))
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.products.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_by_category(&self, category_id: &str) -> StoreResult<Vec<Product>> {
        let mut products = self.find_all().await?;
        products.retain(|p| p.category == category_id);
        Ok(products)
    }

    async fn replace(&self, id: &str, draft: &ProductDraft) -> StoreResult<Option<Product>> {
        Ok(self.products.get_mut(id).map(|mut entry| {
            entry.name = draft.name.clone();
            entry.category = draft.category.clone();
            entry.price = draft.price;
            entry.img = draft.img.clone();
            entry.clone()
        }))
    }

    async fn remove(&self, id: &str) -> StoreResult<bool> {
        Ok(self.products.remove(id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: DashMap<String, User>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserRepository {
    async fn insert(&self, user: &User) -> StoreResult<()> {
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    // First registered match wins, as with an unindexed document scan.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(sorted(&self.users, |u| (u.created_at, u.id.clone()))
            .into_iter()
            .find(|u| u.email == email))
    }
}
