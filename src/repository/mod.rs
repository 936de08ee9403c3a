//! Repository layer for store operations
//!
//! Each collection is reached through a trait so the services run the same
//! way over PostgreSQL and over the in-memory store.

pub mod books;
pub mod borrows;
pub mod categories;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Book, BookSummary, BorrowRecord, BorrowedBook, Category, UpdateBook},
};

pub use memory::MemoryStore;

/// Book collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Public projection of every book, optionally of one category
    async fn list_summaries(&self, category: Option<String>) -> AppResult<Vec<BookSummary>>;
    /// Full documents of the books added by `owner`
    async fn list_by_owner(&self, owner: &str, category: Option<String>) -> AppResult<Vec<Book>>;
    /// Most borrowed books first, ties in insertion order
    async fn list_popular(&self, limit: usize) -> AppResult<Vec<Book>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Book>;
    async fn insert(&self, book: &Book) -> AppResult<()>;
    /// Returns the number of matched books
    async fn update(&self, id: Uuid, data: &UpdateBook) -> AppResult<u64>;
    /// Returns the number of deleted books
    async fn delete(&self, id: Uuid) -> AppResult<u64>;
}

/// Borrow ledger
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<BorrowRecord>;
    async fn list_book_ids(&self, borrower: &str) -> AppResult<Vec<Uuid>>;
    async fn list_borrowed_books(&self, borrower: &str) -> AppResult<Vec<BorrowedBook>>;
    /// Take one copy off the shelf and record the borrow, as one atomic step.
    /// Fails with `NotAvailable` when no copy is left.
    async fn checkout(&self, book_id: Uuid, borrower: &str) -> AppResult<BorrowRecord>;
    /// Delete the record and put the copy back, as one atomic step.
    /// Fails with `NotFound` when the record is already gone.
    async fn check_in(&self, record: &BorrowRecord) -> AppResult<()>;
}

/// Category collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Category>>;
}

/// Main repository struct holding the collection handles
#[derive(Clone)]
pub struct Repository {
    pool: Option<Pool<Postgres>>,
    pub books: Arc<dyn BookRepository>,
    pub borrows: Arc<dyn BorrowRepository>,
    pub categories: Arc<dyn CategoryRepository>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            borrows: Arc::new(borrows::BorrowsRepository::new(pool.clone())),
            categories: Arc::new(categories::CategoriesRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Create a repository backed by an in-process store
    pub fn in_memory(store: MemoryStore) -> Self {
        Self {
            pool: None,
            books: Arc::new(store.clone()),
            borrows: Arc::new(store.clone()),
            categories: Arc::new(store),
        }
    }

    /// Assemble a repository from arbitrary collection handles
    pub fn from_parts(
        books: Arc<dyn BookRepository>,
        borrows: Arc<dyn BorrowRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            pool: None,
            books,
            borrows,
            categories,
        }
    }

    /// Check that the store answers
    pub async fn ping(&self) -> AppResult<()> {
        if let Some(ref pool) = self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }

    /// Release store connections
    pub async fn close(&self) {
        if let Some(ref pool) = self.pool {
            pool.close().await;
        }
    }
}
