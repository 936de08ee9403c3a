//! Verified caller identity and the ownership predicates applied to it

use serde::{Deserialize, Serialize};

use super::{book::Book, borrow::BorrowRecord};
use crate::error::AppError;

/// Caller identity as confirmed by the identity verifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self { email: email.into() }
    }

    /// The caller may only act on data addressed by their own email
    pub fn require_email(&self, target: &str) -> Result<(), AppError> {
        if self.email == target {
            Ok(())
        } else {
            Err(AppError::Authorization("Forbidden: email does not match token".to_string()))
        }
    }

    /// Mutating a book requires being the one who added it
    pub fn require_owner(&self, book: &Book) -> Result<(), AppError> {
        if self.email == book.added_by {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Forbidden: book {} belongs to another user",
                book.id
            )))
        }
    }

    /// Returning a borrow requires being the borrower
    pub fn require_borrower(&self, record: &BorrowRecord) -> Result<(), AppError> {
        if self.email == record.borrowed_by {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Forbidden: borrow {} belongs to another user",
                record.id
            )))
        }
    }
}
