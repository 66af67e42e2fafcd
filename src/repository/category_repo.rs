use async_trait::async_trait;
use sqlx::PgPool;

use super::{CategoryStore, StoreResult};
use crate::models::category::Category;

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    parent: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            parent: row.parent,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryRepository {
    async fn insert(&self, category: &Category) -> StoreResult<()> {
        sqlx::query("INSERT INTO categories (id, name, parent, created_at) VALUES ($1, $2, $3, $4)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.parent)
            .bind(category.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_all(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, parent, created_at FROM categories ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn replace(
        &self,
        id: &str,
        name: &str,
        parent: Option<&str>,
    ) -> StoreResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE categories SET name = $2, parent = $3 WHERE id = $1
             RETURNING id, name, parent, created_at",
        )
        .bind(id)
        .bind(name)
        .bind(parent)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    async fn remove(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
