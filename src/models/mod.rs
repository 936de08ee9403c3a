//! Data models for the library manager

pub mod book;
pub mod borrow;
pub mod category;
pub mod identity;
pub mod outcome;

// Re-export commonly used types
pub use book::{Book, BookSummary, NewBook, UpdateBook};
pub use borrow::{BorrowRecord, BorrowedBook};
pub use category::Category;
pub use identity::Identity;
pub use outcome::{DeleteOutcome, InsertOutcome, UpdateOutcome};
