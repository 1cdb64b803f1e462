//! API integration tests.
//!
//! Each test builds the full router against its own in-memory SQLite store,
//! so the suite is hermetic and order-independent.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tower::ServiceExt;

use lending_server::{
    config::{AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, ServerConfig},
    create_router,
    repository::Repository,
    services::Services,
    AppState, MIGRATOR,
};

/// Build the application against a fresh in-memory store
async fn test_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    MIGRATOR.run(&pool).await.expect("Failed to run migrations");

    let config = AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_hours: 1,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    };

    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone());

    create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

/// Send a request and return (status, parsed JSON body)
async fn request(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response body")
    };

    (status, value)
}

/// Register a user and return the response body
async fn register(app: &Router, username: &str, password: &str) -> Value {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
    body
}

/// Log a user in and return the bearer token
async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = test_app().await;

    let (status, body) = request(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = request(&app, "GET", "/api/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn first_registered_user_is_admin_then_user() {
    let app = test_app().await;

    let first = register(&app, "alice", "secret1").await;
    assert_eq!(first["user"]["role"], "admin");
    assert_eq!(first["user"]["username"], "alice");
    assert!(first["user"]["passwordHash"].is_null(), "hash must not leak");

    let second = register(&app, "bob", "secret2").await;
    assert_eq!(second["user"]["role"], "user");
}

#[tokio::test]
async fn registration_validates_input() {
    let app = test_app().await;

    // Missing password
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Password too short
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "alice", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("6 characters"));

    // Duplicate username
    register(&app, "alice", "secret1").await;
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "alice", "password": "secret2" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username already taken");
}

#[tokio::test]
async fn login_returns_token_and_user() {
    let app = test_app().await;
    register(&app, "alice", "secret1").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"]["passwordHash"].is_null());
}

#[tokio::test]
async fn login_failures_share_one_generic_message() {
    let app = test_app().await;
    register(&app, "alice", "secret1").await;

    let (status, unknown_user) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, wrong_password) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // No user enumeration: both failure modes read identically
    assert_eq!(unknown_user["message"], wrong_password["message"]);
}

#[tokio::test]
async fn login_requires_both_fields() {
    let app = test_app().await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_returns_the_authenticated_user() {
    let app = test_app().await;
    register(&app, "alice", "secret1").await;
    let token = login(&app, "alice", "secret1").await;

    let (status, _) = request(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, "GET", "/api/auth/me", Some("garbage-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = request(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn boardgame_round_trip() {
    let app = test_app().await;
    register(&app, "alice", "secret1").await;
    let token = login(&app, "alice", "secret1").await;

    let (status, created) = request(
        &app,
        "POST",
        "/api/boardgames",
        Some(&token),
        Some(json!({ "title": "Wingspan", "designer": "Elizabeth Hargrave", "genre": "Strategy" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().expect("No id in response");

    // Retrievable by its returned id with identical field values
    let (status, fetched) = request(&app, "GET", &format!("/api/boardgames/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Wingspan");
    assert_eq!(fetched["designer"], "Elizabeth Hargrave");
    assert_eq!(fetched["genre"], "Strategy");

    let (status, list) = request(&app, "GET", "/api/boardgames", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Partial update keeps unmentioned fields
    let (status, updated) = request(
        &app,
        "PUT",
        &format!("/api/boardgames/{}", id),
        Some(&token),
        Some(json!({ "genre": "Engine Building" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Wingspan");
    assert_eq!(updated["genre"], "Engine Building");

    let (status, body) = request(
        &app,
        "DELETE",
        &format!("/api/boardgames/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = request(&app, "GET", &format!("/api/boardgames/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn book_round_trip_requires_author() {
    let app = test_app().await;
    register(&app, "alice", "secret1").await;
    let token = login(&app, "alice", "secret1").await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/books",
        Some(&token),
        Some(json!({ "title": "Dune" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = request(
        &app,
        "POST",
        "/api/books",
        Some(&token),
        Some(json!({ "title": "Dune", "author": "Frank Herbert", "genre": "Science Fiction" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();

    let (status, fetched) = request(&app, "GET", &format!("/api/books/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["author"], "Frank Herbert");
}

#[tokio::test]
async fn catalog_writes_require_authentication() {
    let app = test_app().await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/boardgames",
        None,
        Some(json!({ "title": "Go" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
        &app,
        "POST",
        "/api/books",
        None,
        Some(json!({ "title": "Dune", "author": "Frank Herbert" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_admin_gets_403_on_update_and_delete() {
    let app = test_app().await;
    register(&app, "alice", "secret1").await; // admin
    register(&app, "bob", "secret2").await; // plain user
    let bob = login(&app, "bob", "secret2").await;

    // 403 regardless of item existence: the id here is entirely made up
    let id = "00000000-0000-0000-0000-000000000000";

    let (status, _) = request(
        &app,
        "PUT",
        &format!("/api/boardgames/{}", id),
        Some(&bob),
        Some(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/books/{}", id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A plain user can still create
    let (status, _) = request(
        &app,
        "POST",
        "/api/boardgames",
        Some(&bob),
        Some(json!({ "title": "Go" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn malformed_and_unknown_ids_are_distinguished() {
    let app = test_app().await;
    register(&app, "alice", "secret1").await;
    let token = login(&app, "alice", "secret1").await;

    let (status, _) = request(&app, "GET", "/api/boardgames/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "GET",
        "/api/boardgames/00000000-0000-0000-0000-000000000000",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "DELETE",
        "/api/books/not-a-uuid",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn borrow_and_return_follow_the_state_machine() {
    let app = test_app().await;
    let registered = register(&app, "alice", "secret1").await;
    assert_eq!(registered["user"]["role"], "admin");
    let token = login(&app, "alice", "secret1").await;

    let (status, game) = request(
        &app,
        "POST",
        "/api/boardgames",
        Some(&token),
        Some(json!({ "title": "Go", "designer": "X", "genre": "Abstract" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = game["id"].as_str().unwrap();

    // Available -> Loaned
    let (status, loan) = request(
        &app,
        "POST",
        "/api/loans/borrow",
        Some(&token),
        Some(json!({
            "itemId": item_id,
            "itemType": "BoardGame",
            "borrowerName": "Bob",
            "dueDate": "2025-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["itemId"], item_id);
    assert_eq!(loan["itemType"], "BoardGame");
    assert_eq!(loan["borrowerName"], "Bob");
    assert!(loan["returnDate"].is_null());
    assert!(loan["loanedByUserId"].is_string());
    let loan_id = loan["id"].as_str().unwrap();

    // Borrowing a Loaned item is a conflict
    let (status, conflict) = request(
        &app,
        "POST",
        "/api/loans/borrow",
        Some(&token),
        Some(json!({
            "itemId": item_id,
            "itemType": "BoardGame",
            "borrowerName": "Carol",
            "dueDate": "2025-02-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(conflict["message"].as_str().unwrap().contains("already on loan"));

    // Loaned -> Available
    let (status, returned) = request(
        &app,
        "POST",
        "/api/loans/return",
        Some(&token),
        Some(json!({ "loanId": loan_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(returned["returnDate"].is_string());
    assert!(returned["returnedByUserId"].is_string());
    let return_date = returned["returnDate"].clone();

    // Double return is rejected, not silently accepted
    let (status, second) = request(
        &app,
        "POST",
        "/api/loans/return",
        Some(&token),
        Some(json!({ "loanId": loan_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(second["message"].as_str().unwrap().contains("already been returned"));

    // ...and leaves the recorded return date unchanged
    let (_, loans) = request(&app, "GET", "/api/loans", None, None).await;
    assert_eq!(loans[0]["returnDate"], return_date);

    // The item is Available again: a new borrow succeeds
    let (status, _) = request(
        &app,
        "POST",
        "/api/loans/borrow",
        Some(&token),
        Some(json!({
            "itemId": item_id,
            "itemType": "BoardGame",
            "borrowerName": "Carol",
            "dueDate": "2025-03-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn borrow_validates_its_input() {
    let app = test_app().await;
    register(&app, "alice", "secret1").await;
    let token = login(&app, "alice", "secret1").await;

    // No token
    let (status, _) = request(
        &app,
        "POST",
        "/api/loans/borrow",
        None,
        Some(json!({ "itemId": "x", "itemType": "Book", "borrowerName": "B", "dueDate": "2025-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Missing fields
    let (status, body) = request(
        &app,
        "POST",
        "/api/loans/borrow",
        Some(&token),
        Some(json!({ "itemType": "Book" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required fields");

    // Unknown item type
    let (status, body) = request(
        &app,
        "POST",
        "/api/loans/borrow",
        Some(&token),
        Some(json!({
            "itemId": "00000000-0000-0000-0000-000000000000",
            "itemType": "Cd",
            "borrowerName": "Bob",
            "dueDate": "2025-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Invalid itemType"));

    // Malformed item id
    let (status, _) = request(
        &app,
        "POST",
        "/api/loans/borrow",
        Some(&token),
        Some(json!({
            "itemId": "not-a-uuid",
            "itemType": "Book",
            "borrowerName": "Bob",
            "dueDate": "2025-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nonexistent item
    let (status, _) = request(
        &app,
        "POST",
        "/api/loans/borrow",
        Some(&token),
        Some(json!({
            "itemId": "00000000-0000-0000-0000-000000000000",
            "itemType": "Book",
            "borrowerName": "Bob",
            "dueDate": "2025-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Garbage due date
    let game = {
        let (_, g) = request(
            &app,
            "POST",
            "/api/boardgames",
            Some(&token),
            Some(json!({ "title": "Go" })),
        )
        .await;
        g
    };
    let (status, _) = request(
        &app,
        "POST",
        "/api/loans/borrow",
        Some(&token),
        Some(json!({
            "itemId": game["id"],
            "itemType": "BoardGame",
            "borrowerName": "Bob",
            "dueDate": "whenever"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn return_validates_its_input() {
    let app = test_app().await;
    register(&app, "alice", "secret1").await;
    let token = login(&app, "alice", "secret1").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/loans/return",
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing loanId");

    let (status, _) = request(
        &app,
        "POST",
        "/api/loans/return",
        Some(&token),
        Some(json!({ "loanId": "not-a-uuid" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "POST",
        "/api/loans/return",
        Some(&token),
        Some(json!({ "loanId": "00000000-0000-0000-0000-000000000000" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn loan_list_is_enriched_and_filterable() {
    let app = test_app().await;
    register(&app, "alice", "secret1").await;
    let token = login(&app, "alice", "secret1").await;

    let (_, game) = request(
        &app,
        "POST",
        "/api/boardgames",
        Some(&token),
        Some(json!({ "title": "Wingspan", "designer": "Elizabeth Hargrave" })),
    )
    .await;
    let (_, book) = request(
        &app,
        "POST",
        "/api/books",
        Some(&token),
        Some(json!({ "title": "Dune", "author": "Frank Herbert" })),
    )
    .await;

    let (_, game_loan) = request(
        &app,
        "POST",
        "/api/loans/borrow",
        Some(&token),
        Some(json!({
            "itemId": game["id"],
            "itemType": "BoardGame",
            "borrowerName": "Bob Smith",
            "dueDate": "2025-01-01"
        })),
    )
    .await;
    request(
        &app,
        "POST",
        "/api/loans/borrow",
        Some(&token),
        Some(json!({
            "itemId": book["id"],
            "itemType": "Book",
            "borrowerName": "Carol Jones",
            "dueDate": "2025-01-15"
        })),
    )
    .await;

    // Return the game loan so the two loans differ in status
    request(
        &app,
        "POST",
        "/api/loans/return",
        Some(&token),
        Some(json!({ "loanId": game_loan["id"] })),
    )
    .await;

    // Unfiltered list carries the read-side join
    let (status, loans) = request(&app, "GET", "/api/loans", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let loans = loans.as_array().unwrap();
    assert_eq!(loans.len(), 2);
    let game_entry = loans
        .iter()
        .find(|l| l["itemType"] == "BoardGame")
        .unwrap();
    assert_eq!(game_entry["item"]["title"], "Wingspan");
    assert_eq!(game_entry["loanedBy"], "alice");
    assert_eq!(game_entry["returnedBy"], "alice");
    let book_entry = loans.iter().find(|l| l["itemType"] == "Book").unwrap();
    assert_eq!(book_entry["item"]["author"], "Frank Herbert");
    assert!(book_entry["returnedBy"].is_null());

    // Status filters split on returnDate
    let (_, returned) = request(&app, "GET", "/api/loans?status=returned", None, None).await;
    assert_eq!(returned.as_array().unwrap().len(), 1);
    assert_eq!(returned[0]["itemType"], "BoardGame");

    let (_, loaned) = request(&app, "GET", "/api/loans?status=loaned", None, None).await;
    assert_eq!(loaned.as_array().unwrap().len(), 1);
    assert_eq!(loaned[0]["itemType"], "Book");

    // Unknown status values are ignored
    let (_, all) = request(&app, "GET", "/api/loans?status=overdue", None, None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    // Borrower filter: case-insensitive substring
    let (_, by_name) = request(&app, "GET", "/api/loans?borrowerName=carol", None, None).await;
    assert_eq!(by_name.as_array().unwrap().len(), 1);
    assert_eq!(by_name[0]["borrowerName"], "Carol Jones");

    // Active endpoint lists only open loans
    let (status, active) = request(&app, "GET", "/api/loans/active", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let active = active.as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert!(active[0]["returnDate"].is_null());
}

#[tokio::test]
async fn loan_item_is_null_after_catalog_delete() {
    let app = test_app().await;
    register(&app, "alice", "secret1").await;
    let token = login(&app, "alice", "secret1").await;

    let (_, game) = request(
        &app,
        "POST",
        "/api/boardgames",
        Some(&token),
        Some(json!({ "title": "Go" })),
    )
    .await;
    let item_id = game["id"].as_str().unwrap().to_string();

    request(
        &app,
        "POST",
        "/api/loans/borrow",
        Some(&token),
        Some(json!({
            "itemId": item_id,
            "itemType": "BoardGame",
            "borrowerName": "Bob",
            "dueDate": "2025-01-01"
        })),
    )
    .await;

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/boardgames/{}", item_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, loans) = request(&app, "GET", "/api/loans", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(loans[0]["item"].is_null());
    assert_eq!(loans[0]["itemId"], item_id);
}
