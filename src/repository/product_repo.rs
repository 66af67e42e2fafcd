use async_trait::async_trait;
use sqlx::PgPool;

use super::{ProductStore, StoreResult};
use crate::models::product::{Product, ProductDraft};

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    category: String,
    price: f64,
    img: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            category: row.category,
            price: row.price,
            img: row.img,
            created_at: row.created_at,
        }
    }
}

const COLUMNS: &str = "id, name, category, price, img, created_at";

#[async_trait]
impl ProductStore for PgProductRepository {
    async fn insert(&self, product: &Product) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO products (id, name, category, price, img, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(&product.img)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        let sql = format!("SELECT {} FROM products ORDER BY created_at, id", COLUMNS);
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn find_by_category(&self, category_id: &str) -> StoreResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE category = $1 ORDER BY created_at, id",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn replace(&self, id: &str, draft: &ProductDraft) -> StoreResult<Option<Product>> {
        let sql = format!(
            "UPDATE products SET name = $2, category = $3, price = $4, img = $5
             WHERE id = $1 RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.category)
            .bind(draft.price)
            .bind(&draft.img)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn remove(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
