//! API integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use library_manager_server::{
    api,
    config::AppConfig,
    models::{Book, NewBook},
    repository::{BookRepository, MemoryStore, Repository},
    services::{auth::SharedSecretVerifier, Services},
    AppState,
};

const SECRET: &str = "integration-secret";
pub const ALICE: &str = "alice@example.com";
pub const BOB: &str = "bob@example.com";

#[derive(Clone)]
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::with_categories(["Novel", "History", "Science"]);
        let services = Services::new(
            Repository::in_memory(store.clone()),
            Arc::new(SharedSecretVerifier::new(SECRET)),
        );
        let state = AppState {
            config: Arc::new(AppConfig::default()),
            services: Arc::new(services),
        };
        Self {
            router: api::router(state),
            store,
        }
    }

    pub fn token(email: &str) -> String {
        SharedSecretVerifier::new(SECRET)
            .issue(email, chrono::Duration::hours(1))
            .expect("Failed to sign token")
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(email) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", Self::token(email)));
        }
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    /// Create a book through the API and return its id
    pub async fn create_book(&self, user: &str, body: Value) -> String {
        let (status, body) = self.send(Method::POST, "/books", Some(user), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        body["insertedId"].as_str().expect("No inserted id").to_string()
    }

    pub async fn book(&self, id: &str) -> Value {
        let (status, body) = self.send(Method::GET, &format!("/books/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        body
    }
}

#[tokio::test]
async fn test_liveness() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Library Manager Server is Running Well!");
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.send(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_create_then_fetch_round_trip() {
    let app = TestApp::new();
    let id = app
        .create_book(
            ALICE,
            json!({
                "name": "Dune",
                "author": "Frank Herbert",
                "image": "https://example.com/dune.jpg",
                "category": "Novel",
                "quantity": 3,
                "addedBy": ALICE
            }),
        )
        .await;

    let book = app.book(&id).await;
    assert_eq!(book["_id"], id);
    assert_eq!(book["name"], "Dune");
    assert_eq!(book["author"], "Frank Herbert");
    assert_eq!(book["image"], "https://example.com/dune.jpg");
    assert_eq!(book["category"], "Novel");
    assert_eq!(book["quantity"], 3);
    assert_eq!(book["borrowedCount"], 0);
    assert_eq!(book["addedBy"], ALICE);
}

#[tokio::test]
async fn test_create_requires_token() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::POST, "/books", None, Some(json!({ "name": "Dune" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthenticated");
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": "Dune" }).to_string()))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bare_token_header_is_accepted() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(header::AUTHORIZATION, TestApp::token(ALICE))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": "Dune", "quantity": 1 }).to_string()))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_create_rejects_oversized_quantity() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::POST, "/books", Some(ALICE), Some(json!({ "quantity": i32::MAX })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_create_rejects_negative_quantity() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::POST, "/books", Some(ALICE), Some(json!({ "quantity": -1 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_public_listing_is_projected_and_filtered() {
    let app = TestApp::new();
    app.create_book(ALICE, json!({ "name": "Dune", "category": "Novel", "quantity": 1 }))
        .await;
    app.create_book(BOB, json!({ "name": "SPQR", "category": "History", "quantity": 2 }))
        .await;

    let (status, body) = app.send(Method::GET, "/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let books = body.as_array().unwrap();
    assert_eq!(books.len(), 2);
    for book in books {
        assert!(book.get("_id").is_some());
        assert!(book.get("quantity").is_some());
        assert!(book.get("addedBy").is_none());
        assert!(book.get("category").is_none());
    }

    let (_, body) = app.send(Method::GET, "/books?category=History", None, None).await;
    let books = body.as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["name"], "SPQR");
}

#[tokio::test]
async fn test_owner_listing_requires_matching_email() {
    let app = TestApp::new();
    app.create_book(ALICE, json!({ "name": "Dune" })).await;
    app.create_book(BOB, json!({ "name": "SPQR" })).await;

    let uri = format!("/books/user/{}", ALICE);
    let (status, _) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::GET, &uri, Some(BOB), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(Method::GET, &uri, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    let books = body.as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["addedBy"], ALICE);

    let uri = format!("/books?email={}", ALICE);
    let (status, _) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.send(Method::GET, &uri, Some(BOB), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.send(Method::GET, &uri, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap()[0]["addedBy"], ALICE);
}

#[tokio::test]
async fn test_non_owner_cannot_delete() {
    let app = TestApp::new();
    let id = app.create_book(ALICE, json!({ "name": "Dune", "quantity": 1 })).await;

    let (status, body) = app
        .send(Method::DELETE, &format!("/books/{}", id), Some(BOB), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");

    let book = app.book(&id).await;
    assert_eq!(book["name"], "Dune");

    let (status, body) = app
        .send(Method::DELETE, &format!("/books/{}", id), Some(ALICE), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 1);

    let (status, _) = app.send(Method::GET, &format!("/books/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_owner_cannot_update() {
    let app = TestApp::new();
    let id = app.create_book(ALICE, json!({ "name": "Dune", "quantity": 1 })).await;
    let before = app.book(&id).await;

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/books/{}", id),
            Some(BOB),
            Some(json!({ "name": "Stolen", "quantity": 9 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.book(&id).await, before);
}

#[tokio::test]
async fn test_owner_update_ignores_identity_and_counter() {
    let app = TestApp::new();
    let id = app.create_book(ALICE, json!({ "name": "Dune", "quantity": 1 })).await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/books/{}", id),
            Some(ALICE),
            Some(json!({
                "_id": "00000000-0000-0000-0000-000000000000",
                "name": "Dune Messiah",
                "quantity": 4,
                "borrowedCount": 100
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matchedCount"], 1);

    let book = app.book(&id).await;
    assert_eq!(book["_id"], id);
    assert_eq!(book["name"], "Dune Messiah");
    assert_eq!(book["quantity"], 4);
    assert_eq!(book["borrowedCount"], 0);
}

#[tokio::test]
async fn test_missing_book_is_not_found() {
    let app = TestApp::new();
    let missing = uuid::Uuid::new_v4();

    let (status, body) = app.send(Method::GET, &format!("/books/{}", missing), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchData");

    let (status, _) = app
        .send(Method::PUT, &format!("/books/{}", missing), Some(ALICE), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::DELETE, &format!("/books/{}", missing), Some(ALICE), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(Method::GET, "/books/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_popular_is_capped_and_ordered() {
    let app = TestApp::new();
    for count in [4, 0, 9, 2, 7, 7, 1, 5] {
        let mut book = Book::from_new(
            NewBook {
                name: Some(format!("Book {}", count)),
                quantity: Some(1),
                ..NewBook::default()
            },
            ALICE.to_string(),
        );
        book.borrowed_count = count;
        app.store.insert(&book).await.unwrap();
    }

    let (status, body) = app.send(Method::GET, "/books/popular", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let counts: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["borrowedCount"].as_i64().unwrap())
        .collect();
    assert_eq!(counts, vec![9, 7, 7, 5, 4, 2]);
}

#[tokio::test]
async fn test_categories() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let labels: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["History", "Novel", "Science"]);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/borrowed-list"].is_object());
}
