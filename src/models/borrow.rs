//! Borrow record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::book::Book;

/// One checked-out copy of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub book_id: Uuid,
    /// Borrower email
    pub borrowed_by: String,
    pub borrowed_at: DateTime<Utc>,
}

impl BorrowRecord {
    pub fn new(book_id: Uuid, borrowed_by: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            borrowed_by: borrowed_by.to_string(),
            borrowed_at: Utc::now(),
        }
    }
}

/// Borrow request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub book_id: Uuid,
}

/// A borrowed book joined with the record that checked it out
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowedBook {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub book: Book,
    pub borrow_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
}
