//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrows, categories, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Manager API",
        version = "0.4.0",
        description = "Book catalog and borrow ledger REST API"
    ),
    paths(
        // Health
        health::liveness,
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::list_popular_books,
        books::get_book,
        books::list_user_books,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrows
        borrows::list_borrowed_ids,
        borrows::list_user_borrowed_ids,
        borrows::list_borrowed_books,
        borrows::borrow_book,
        borrows::return_book,
        // Categories
        categories::list_categories,
    ),
    components(
        schemas(
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::NewBook,
            crate::models::book::UpdateBook,
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::BorrowRequest,
            crate::models::borrow::BorrowedBook,
            crate::models::category::Category,
            crate::models::outcome::InsertOutcome,
            crate::models::outcome::UpdateOutcome,
            crate::models::outcome::DeleteOutcome,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog"),
        (name = "borrows", description = "Borrow ledger"),
        (name = "categories", description = "Book categories")
    )
)]
pub struct ApiDoc;

/// Registers the bearer scheme referenced by secured paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
