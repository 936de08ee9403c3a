//! Business logic services

pub mod auth;
pub mod borrows;
pub mod catalog;
pub mod categories;

use std::sync::Arc;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub identity: Arc<dyn auth::IdentityVerifier>,
    pub catalog: catalog::CatalogService,
    pub borrows: borrows::BorrowService,
    pub categories: categories::CategoryService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository and identity verifier
    pub fn new(repository: Repository, identity: Arc<dyn auth::IdentityVerifier>) -> Self {
        Self {
            identity,
            catalog: catalog::CatalogService::new(repository.clone()),
            borrows: borrows::BorrowService::new(repository.clone()),
            categories: categories::CategoryService::new(repository.clone()),
            repository,
        }
    }
}
