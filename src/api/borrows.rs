//! Borrow ledger endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{borrow::BorrowRequest, BorrowedBook, DeleteOutcome, InsertOutcome},
    AppState,
};

use super::AuthenticatedUser;

/// Ids of the books the caller has borrowed
#[utoipa::path(
    get,
    path = "/borrowed-list/ids",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Borrowed book ids", body = Vec<Uuid>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_borrowed_ids(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<Json<Vec<Uuid>>> {
    let ids = state.services.borrows.borrowed_book_ids(&identity).await?;
    Ok(Json(ids))
}

/// Ids of the books borrowed by a user, addressed by email
#[utoipa::path(
    get,
    path = "/borrowed-list/user/{email}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("email" = String, Path, description = "Borrower email, must match the token")
    ),
    responses(
        (status = 200, description = "Borrowed book ids", body = Vec<Uuid>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Email does not match the token")
    )
)]
pub async fn list_user_borrowed_ids(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(email): Path<String>,
) -> AppResult<Json<Vec<Uuid>>> {
    identity.require_email(&email)?;

    let ids = state.services.borrows.borrowed_book_ids(&identity).await?;
    Ok(Json(ids))
}

/// Books the caller has borrowed, each with its borrow id
#[utoipa::path(
    get,
    path = "/borrowed-list/books",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Borrowed books", body = Vec<BorrowedBook>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_borrowed_books(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowedBook>>> {
    let books = state.services.borrows.borrowed_books(&identity).await?;
    Ok(Json(books))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrowed-list",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book borrowed", body = InsertOutcome),
        (status = 400, description = "Book is not available to borrow"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<InsertOutcome>)> {
    let outcome = state.services.borrows.borrow(&identity, request.book_id).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Return a borrowed book (borrower only)
#[utoipa::path(
    delete,
    path = "/borrowed-list/return/{borrow_id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("borrow_id" = Uuid, Path, description = "Borrow record ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = DeleteOutcome),
        (status = 403, description = "Borrow belongs to another user"),
        (status = 404, description = "Invalid borrow id")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(borrow_id): Path<Uuid>,
) -> AppResult<Json<DeleteOutcome>> {
    let outcome = state.services.borrows.return_book(&identity, borrow_id).await?;
    Ok(Json(outcome))
}
