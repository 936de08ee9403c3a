//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book::{BookListing, BookQuery},
        Book, BookSummary, DeleteOutcome, InsertOutcome, NewBook, UpdateBook, UpdateOutcome,
    },
    AppState,
};

use super::AuthenticatedUser;

/// List books, optionally filtered by category or by owner
///
/// Without `email` the listing is public and returns the short projection.
/// With `email` the caller must hold a token for that email and gets full
/// documents.
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = Vec<BookSummary>),
        (status = 401, description = "Owner filter without a valid token"),
        (status = 403, description = "Owner filter for another email")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<BookListing>> {
    match query.email {
        None => {
            let books = state.services.catalog.list_books(query.category).await?;
            Ok(Json(BookListing::Public(books)))
        }
        Some(email) => {
            let AuthenticatedUser(identity) = AuthenticatedUser::from_headers(&headers, &state).await?;
            identity.require_email(&email)?;
            let books = state
                .services
                .catalog
                .list_owned_books(&email, query.category)
                .await?;
            Ok(Json(BookListing::Owned(books)))
        }
    }
}

/// Most borrowed books
#[utoipa::path(
    get,
    path = "/books/popular",
    tag = "books",
    responses(
        (status = 200, description = "Up to 6 books, most borrowed first", body = Vec<Book>)
    )
)]
pub async fn list_popular_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_popular().await?;
    Ok(Json(books))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{book_id}",
    tag = "books",
    params(
        ("book_id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(book_id).await?;
    Ok(Json(book))
}

/// Books added by a user
#[utoipa::path(
    get,
    path = "/books/user/{email}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("email" = String, Path, description = "Owner email, must match the token")
    ),
    responses(
        (status = 200, description = "The user's books", body = Vec<Book>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Email does not match the token")
    )
)]
pub async fn list_user_books(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(email): Path<String>,
) -> AppResult<Json<Vec<Book>>> {
    identity.require_email(&email)?;

    let books = state.services.catalog.list_owned_books(&email, None).await?;
    Ok(Json(books))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = NewBook,
    responses(
        (status = 201, description = "Book created", body = InsertOutcome),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(data): Json<NewBook>,
) -> AppResult<(StatusCode, Json<InsertOutcome>)> {
    let outcome = state.services.catalog.create_book(&identity, data).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Update a book (owner only)
#[utoipa::path(
    put,
    path = "/books/{book_id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("book_id" = Uuid, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = UpdateOutcome),
        (status = 403, description = "Caller does not own the book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
    Json(data): Json<UpdateBook>,
) -> AppResult<Json<UpdateOutcome>> {
    let outcome = state
        .services
        .catalog
        .update_book(&identity, book_id, data)
        .await?;
    Ok(Json(outcome))
}

/// Delete a book (owner only)
#[utoipa::path(
    delete,
    path = "/books/{book_id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("book_id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted", body = DeleteOutcome),
        (status = 403, description = "Caller does not own the book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<DeleteOutcome>> {
    let outcome = state.services.catalog.delete_book(&identity, book_id).await?;
    Ok(Json(outcome))
}
