//! Borrow ledger service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{BorrowedBook, DeleteOutcome, Identity, InsertOutcome},
    repository::Repository,
};

fn book_not_found(e: AppError) -> AppError {
    match e {
        AppError::NotFound(_) => AppError::NotFound("Book not found!".to_string()),
        other => other,
    }
}

#[derive(Clone)]
pub struct BorrowService {
    repository: Repository,
}

impl BorrowService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow one copy of a book for the caller
    pub async fn borrow(&self, caller: &Identity, book_id: Uuid) -> AppResult<InsertOutcome> {
        let book = self
            .repository
            .books
            .get_by_id(book_id)
            .await
            .map_err(book_not_found)?;

        if !book.is_available() {
            return Err(AppError::NotAvailable(
                "Book is not available to borrow!".to_string(),
            ));
        }

        // checkout re-checks quantity atomically
        let record = self
            .repository
            .borrows
            .checkout(book_id, &caller.email)
            .await
            .map_err(book_not_found)?;

        tracing::info!(
            "Ledger: {} borrowed book {} (borrow {})",
            caller.email,
            book_id,
            record.id
        );
        Ok(InsertOutcome::new(record.id))
    }

    /// Return a borrowed copy; only the borrower may do this
    pub async fn return_book(&self, caller: &Identity, borrow_id: Uuid) -> AppResult<DeleteOutcome> {
        let record = self.repository.borrows.get_by_id(borrow_id).await?;
        if let Err(e) = caller.require_borrower(&record) {
            tracing::warn!("Ledger: {} denied return of borrow {}", caller.email, borrow_id);
            return Err(e);
        }

        self.repository.borrows.check_in(&record).await?;

        tracing::info!(
            "Ledger: {} returned book {} (borrow {})",
            caller.email,
            record.book_id,
            borrow_id
        );
        Ok(DeleteOutcome::new(1))
    }

    /// Ids of the books the caller currently holds
    pub async fn borrowed_book_ids(&self, caller: &Identity) -> AppResult<Vec<Uuid>> {
        self.repository.borrows.list_book_ids(&caller.email).await
    }

    /// Books the caller currently holds, with their borrow ids
    pub async fn borrowed_books(&self, caller: &Identity) -> AppResult<Vec<BorrowedBook>> {
        self.repository.borrows.list_borrowed_books(&caller.email).await
    }
}
