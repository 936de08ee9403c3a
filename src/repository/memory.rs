//! In-process store used with `memory://` database URLs and by the tests
//!
//! All collections sit behind a single lock, so ledger operations that touch
//! both books and borrow records are atomic just like their SQL
//! counterparts.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BookRepository, BorrowRepository, CategoryRepository};
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookSummary, BorrowRecord, BorrowedBook, Category, UpdateBook},
};

#[derive(Default)]
struct MemoryState {
    // Vec order is insertion order, which stands in for natural store order
    books: Vec<Book>,
    borrows: Vec<BorrowRecord>,
    categories: Vec<Category>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with categories
    pub fn with_categories<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = MemoryState {
            categories: labels.into_iter().map(Category::new).collect(),
            ..MemoryState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Number of borrow records, across all borrowers
    pub async fn borrow_count(&self) -> usize {
        self.state.read().await.borrows.len()
    }
}

fn book_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Book {} not found", id))
}

fn borrow_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Invalid borrow id {}", id))
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn list_summaries(&self, category: Option<String>) -> AppResult<Vec<BookSummary>> {
        let state = self.state.read().await;
        Ok(state
            .books
            .iter()
            .filter(|book| category.is_none() || book.category == category)
            .map(BookSummary::from)
            .collect())
    }

    async fn list_by_owner(&self, owner: &str, category: Option<String>) -> AppResult<Vec<Book>> {
        let state = self.state.read().await;
        Ok(state
            .books
            .iter()
            .filter(|book| book.added_by == owner)
            .filter(|book| category.is_none() || book.category == category)
            .cloned()
            .collect())
    }

    async fn list_popular(&self, limit: usize) -> AppResult<Vec<Book>> {
        let state = self.state.read().await;
        let mut books = state.books.clone();
        // sort_by is stable: equal counts keep insertion order
        books.sort_by(|a, b| b.borrowed_count.cmp(&a.borrowed_count));
        books.truncate(limit);
        Ok(books)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        let state = self.state.read().await;
        state
            .books
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or_else(|| book_not_found(id))
    }

    async fn insert(&self, book: &Book) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.books.iter().any(|b| b.id == book.id) {
            return Err(AppError::BadRequest(format!("Book {} already exists", book.id)));
        }
        state.books.push(book.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, data: &UpdateBook) -> AppResult<u64> {
        let mut state = self.state.write().await;
        match state.books.iter_mut().find(|book| book.id == id) {
            Some(book) => {
                book.apply(data);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.books.len();
        state.books.retain(|book| book.id != id);
        Ok((before - state.books.len()) as u64)
    }
}

#[async_trait]
impl BorrowRepository for MemoryStore {
    async fn get_by_id(&self, id: Uuid) -> AppResult<BorrowRecord> {
        let state = self.state.read().await;
        state
            .borrows
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| borrow_not_found(id))
    }

    async fn list_book_ids(&self, borrower: &str) -> AppResult<Vec<Uuid>> {
        let state = self.state.read().await;
        Ok(state
            .borrows
            .iter()
            .filter(|record| record.borrowed_by == borrower)
            .map(|record| record.book_id)
            .collect())
    }

    async fn list_borrowed_books(&self, borrower: &str) -> AppResult<Vec<BorrowedBook>> {
        let state = self.state.read().await;
        Ok(state
            .borrows
            .iter()
            .filter(|record| record.borrowed_by == borrower)
            .filter_map(|record| {
                state
                    .books
                    .iter()
                    .find(|book| book.id == record.book_id)
                    .map(|book| BorrowedBook {
                        book: book.clone(),
                        borrow_id: record.id,
                        borrowed_at: record.borrowed_at,
                    })
            })
            .collect())
    }

    async fn checkout(&self, book_id: Uuid, borrower: &str) -> AppResult<BorrowRecord> {
        let mut state = self.state.write().await;

        let book = state
            .books
            .iter_mut()
            .find(|book| book.id == book_id)
            .ok_or_else(|| book_not_found(book_id))?;

        if !book.is_available() {
            return Err(AppError::NotAvailable(
                "Book is not available to borrow!".to_string(),
            ));
        }

        book.quantity -= 1;
        book.borrowed_count += 1;

        let record = BorrowRecord::new(book_id, borrower);
        state.borrows.push(record.clone());
        Ok(record)
    }

    async fn check_in(&self, record: &BorrowRecord) -> AppResult<()> {
        let mut state = self.state.write().await;

        let position = state
            .borrows
            .iter()
            .position(|r| r.id == record.id && r.borrowed_by == record.borrowed_by)
            .ok_or_else(|| borrow_not_found(record.id))?;

        // Nothing is written unless both changes can be applied
        let shelf = match state.books.iter().position(|book| book.id == record.book_id) {
            Some(index) => {
                let quantity = state.books[index].quantity.checked_add(1).ok_or_else(|| {
                    AppError::BadRequest(format!("Book {} cannot hold more copies", record.book_id))
                })?;
                Some((index, quantity))
            }
            None => None,
        };

        state.borrows.remove(position);
        if let Some((index, quantity)) = shelf {
            state.books[index].quantity = quantity;
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories = state.categories.clone();
        categories.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(categories)
    }
}
