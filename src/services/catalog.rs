//! Book catalog service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book::POPULAR_LIMIT, Book, BookSummary, DeleteOutcome, Identity, InsertOutcome, NewBook,
        UpdateBook, UpdateOutcome,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Public listing, optionally restricted to one category
    pub async fn list_books(&self, category: Option<String>) -> AppResult<Vec<BookSummary>> {
        self.repository.books.list_summaries(category).await
    }

    /// Full documents of the books added by `owner`
    pub async fn list_owned_books(&self, owner: &str, category: Option<String>) -> AppResult<Vec<Book>> {
        self.repository.books.list_by_owner(owner, category).await
    }

    /// Most borrowed books
    pub async fn list_popular(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_popular(POPULAR_LIMIT).await
    }

    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a book. A missing `addedBy` falls back to the caller's email.
    pub async fn create_book(&self, caller: &Identity, data: NewBook) -> AppResult<InsertOutcome> {
        data.validate()?;

        let owner = data
            .added_by
            .clone()
            .unwrap_or_else(|| caller.email.clone());
        if owner != caller.email {
            tracing::warn!(
                "Catalog create: {} adds a book on behalf of {}",
                caller.email,
                owner
            );
        }

        let book = Book::from_new(data, owner);
        self.repository.books.insert(&book).await?;

        tracing::info!("Catalog create: book {} added by {}", book.id, book.added_by);
        Ok(InsertOutcome::new(book.id))
    }

    /// Update the fields present in `data`; only the owner may do this
    pub async fn update_book(
        &self,
        caller: &Identity,
        id: Uuid,
        data: UpdateBook,
    ) -> AppResult<UpdateOutcome> {
        let book = self.repository.books.get_by_id(id).await?;
        if let Err(e) = caller.require_owner(&book) {
            tracing::warn!("Catalog update: {} denied on book {}", caller.email, id);
            return Err(e);
        }
        data.validate()?;

        let matched = self.repository.books.update(id, &data).await?;
        tracing::info!("Catalog update: book {} updated by {}", id, caller.email);
        Ok(UpdateOutcome::new(matched, matched))
    }

    /// Delete a book; only the owner may do this
    pub async fn delete_book(&self, caller: &Identity, id: Uuid) -> AppResult<DeleteOutcome> {
        let book = self.repository.books.get_by_id(id).await?;
        if let Err(e) = caller.require_owner(&book) {
            tracing::warn!("Catalog delete: {} denied on book {}", caller.email, id);
            return Err(e);
        }

        let deleted = self.repository.books.delete(id).await?;
        tracing::info!("Catalog delete: book {} removed by {}", id, caller.email);
        Ok(DeleteOutcome::new(deleted))
    }
}
