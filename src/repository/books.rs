//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::BookRepository;
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookSummary, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for BooksRepository {
    async fn list_summaries(&self, category: Option<String>) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT id, image, name, author, quantity
            FROM books
            WHERE ($1::TEXT IS NULL OR category = $1)
            ORDER BY created_at
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn list_by_owner(&self, owner: &str, category: Option<String>) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE added_by = $1 AND ($2::TEXT IS NULL OR category = $2)
            ORDER BY created_at
            "#,
        )
        .bind(owner)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn list_popular(&self, limit: usize) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY borrowed_count DESC, created_at LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn insert(&self, book: &Book) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO books (id, name, author, image, category, quantity, borrowed_count, added_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(book.id)
        .bind(&book.name)
        .bind(&book.author)
        .bind(&book.image)
        .bind(&book.category)
        .bind(book.quantity)
        .bind(book.borrowed_count)
        .bind(&book.added_by)
        .bind(book.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, id: Uuid, data: &UpdateBook) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE books SET
                name = COALESCE($2, name),
                author = COALESCE($3, author),
                image = COALESCE($4, image),
                category = COALESCE($5, category),
                quantity = COALESCE($6, quantity),
                added_by = COALESCE($7, added_by)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.author)
        .bind(&data.image)
        .bind(&data.category)
        .bind(data.quantity)
        .bind(&data.added_by)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
