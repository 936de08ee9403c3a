//! Borrow records repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::BorrowRepository;
use crate::{
    error::{AppError, AppResult},
    models::{BorrowRecord, BorrowedBook},
};

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowRepository for BorrowsRepository {
    async fn get_by_id(&self, id: Uuid) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>("SELECT * FROM borrow_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Invalid borrow id {}", id)))
    }

    async fn list_book_ids(&self, borrower: &str) -> AppResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT book_id FROM borrow_records WHERE borrowed_by = $1 ORDER BY borrowed_at",
        )
        .bind(borrower)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn list_borrowed_books(&self, borrower: &str) -> AppResult<Vec<BorrowedBook>> {
        let books = sqlx::query_as::<_, BorrowedBook>(
            r#"
            SELECT b.*, r.id AS borrow_id, r.borrowed_at
            FROM borrow_records r
            JOIN books b ON b.id = r.book_id
            WHERE r.borrowed_by = $1
            ORDER BY r.borrowed_at
            "#,
        )
        .bind(borrower)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn checkout(&self, book_id: Uuid, borrower: &str) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent borrows of the same book
        let quantity = sqlx::query_scalar::<_, i32>("SELECT quantity FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book_id)))?;

        if quantity <= 0 {
            tx.rollback().await?;
            return Err(AppError::NotAvailable(
                "Book is not available to borrow!".to_string(),
            ));
        }

        sqlx::query(
            r#"
            UPDATE books
            SET quantity = quantity - 1, borrowed_count = borrowed_count + 1
            WHERE id = $1
            "#,
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        let record = BorrowRecord::new(book_id, borrower);
        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records (id, book_id, borrowed_by, borrowed_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(record.book_id)
        .bind(&record.borrowed_by)
        .bind(record.borrowed_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn check_in(&self, record: &BorrowRecord) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM borrow_records WHERE id = $1 AND borrowed_by = $2")
            .bind(record.id)
            .bind(&record.borrowed_by)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!("Invalid borrow id {}", record.id)));
        }

        sqlx::query("UPDATE books SET quantity = quantity + 1 WHERE id = $1")
            .bind(record.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
