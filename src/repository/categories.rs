//! Categories repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::CategoryRepository;
use crate::{error::AppResult, models::Category};

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Postgres>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for CategoriesRepository {
    async fn list(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY label")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }
}
