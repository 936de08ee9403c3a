//! Category listing service

use crate::{error::AppResult, models::Category, repository::Repository};

#[derive(Clone)]
pub struct CategoryService {
    repository: Repository,
}

impl CategoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.list().await
    }
}
