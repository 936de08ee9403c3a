//! API handlers for the library manager REST endpoints

pub mod books;
pub mod borrows;
pub mod categories;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::Identity, AppState};

/// Extractor for the caller identity verified from the bearer token
pub struct AuthenticatedUser(pub Identity);

impl AuthenticatedUser {
    /// Verify the `Authorization` header, given as `Bearer <token>` or as the bare token
    pub async fn from_headers(headers: &HeaderMap, state: &AppState) -> Result<Self, AppError> {
        let auth_header = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .unwrap_or(auth_header)
            .trim();
        if token.is_empty() || token.contains(char::is_whitespace) {
            return Err(AppError::Authentication(
                "Invalid authorization header format".to_string(),
            ));
        }

        let identity = state.services.identity.verify(token).await?;

        Ok(AuthenticatedUser(identity))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers, state).await
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        .route("/", get(health::liveness))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/popular", get(books::list_popular_books))
        .route("/books/user/:email", get(books::list_user_books))
        .route(
            "/books/:book_id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Borrow ledger
        .route("/borrowed-list", post(borrows::borrow_book))
        .route("/borrowed-list/ids", get(borrows::list_borrowed_ids))
        .route("/borrowed-list/books", get(borrows::list_borrowed_books))
        .route("/borrowed-list/user/:email", get(borrows::list_user_borrowed_ids))
        .route("/borrowed-list/return/:borrow_id", delete(borrows::return_book))
        // Categories
        .route("/categories", get(categories::list_categories))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
