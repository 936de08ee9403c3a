//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Maximum number of books returned by the popular listing
pub const POPULAR_LIMIT: usize = 6;

/// Book document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Cover image reference (usually a URL)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Copies currently on the shelf
    pub quantity: i32,
    /// Cumulative number of borrows, never decremented by returns
    pub borrowed_count: i32,
    /// Owner email
    pub added_by: String,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Build a new book from a create request, owned by `owner`
    pub fn from_new(data: NewBook, owner: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: data.name,
            author: data.author,
            image: data.image,
            category: data.category,
            quantity: data.quantity.unwrap_or(0),
            borrowed_count: 0,
            added_by: owner,
            created_at: Utc::now(),
        }
    }

    /// Apply the fields present in `data`
    pub fn apply(&mut self, data: &UpdateBook) {
        if let Some(ref name) = data.name {
            self.name = Some(name.clone());
        }
        if let Some(ref author) = data.author {
            self.author = Some(author.clone());
        }
        if let Some(ref image) = data.image {
            self.image = Some(image.clone());
        }
        if let Some(ref category) = data.category {
            self.category = Some(category.clone());
        }
        if let Some(quantity) = data.quantity {
            self.quantity = quantity;
        }
        if let Some(ref added_by) = data.added_by {
            self.added_by = added_by.clone();
        }
    }

    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }
}

/// Public projection of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub image: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub quantity: i32,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            image: book.image.clone(),
            name: book.name.clone(),
            author: book.author.clone(),
            quantity: book.quantity,
        }
    }
}

/// Create book request
///
/// Every descriptive field is optional. `addedBy` defaults to the
/// caller's verified email when omitted.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub name: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0, max = 1000000, message = "quantity must be between 0 and 1000000"))]
    pub quantity: Option<i32>,
    #[validate(email(message = "addedBy must be an email address"))]
    pub added_by: Option<String>,
}

/// Update book request; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    pub name: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0, max = 1000000, message = "quantity must be between 0 and 1000000"))]
    pub quantity: Option<i32>,
    #[validate(email(message = "addedBy must be an email address"))]
    pub added_by: Option<String>,
}

/// Book listing query
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Only books of this category
    pub category: Option<String>,
    /// Only books added by this email (requires a matching token)
    pub email: Option<String>,
}

/// Either the public projection or full owner documents
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BookListing {
    Public(Vec<BookSummary>),
    Owned(Vec<Book>),
}
