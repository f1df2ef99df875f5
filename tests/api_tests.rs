//! API integration tests.
//!
//! These run against a live server (`cargo run`) backed by a dev database
//! provisioned with an `admin` / `admin123` administrator account.
//! Run with: cargo test -- --ignored

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique suffix so tests can create catalog rows without colliding
fn unique() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

async fn admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "identifier": "admin",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Register a fresh member account, returning its id
async fn register_member(client: &Client) -> String {
    let suffix = unique();
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": format!("member{}", suffix),
            "email": format!("member{}@example.org", suffix),
            "password": "reading-room"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse register response");
    body["id"].as_str().expect("No id in response").to_string()
}

/// Create a book with the given stock, returning its id
async fn create_book(client: &Client, token: &str, name: &str, stock: i64) -> String {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": name,
            "authors": "Test Author",
            "stock": stock
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book response");
    body["id"].as_str().expect("No id in response").to_string()
}

async fn get_book(client: &Client, token: &str, id: &str) -> Value {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send get book request");

    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse book response")
}

async fn borrow_books(client: &Client, token: &str, user_id: &str, book_ids: &[&str]) -> reqwest::Response {
    client
        .post(format!("{}/borrows", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "user_id": user_id,
            "book_ids": book_ids
        }))
        .send()
        .await
        .expect("Failed to send borrow request")
}

async fn return_borrow(client: &Client, token: &str, borrow_id: &str) -> reqwest::Response {
    client
        .post(format!("{}/borrows/{}/return", BASE_URL, borrow_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "identifier": "admin",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "identifier": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_register_and_me() {
    let client = Client::new();
    let suffix = unique();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": format!("reader{}", suffix),
            "email": format!("reader{}@example.org", suffix),
            "password": "turn-the-page"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let login: Value = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "identifier": format!("reader{}", suffix),
            "password": "turn-the-page"
        }))
        .send()
        .await
        .expect("Failed to send login request")
        .json()
        .await
        .expect("Failed to parse login response");

    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", login["token"].as_str().unwrap()))
        .send()
        .await
        .expect("Failed to send me request")
        .json()
        .await
        .expect("Failed to parse me response");

    assert_eq!(me["username"], format!("reader{}", suffix).as_str());
    assert_eq!(me["role"], "member");
    assert_eq!(me["status"], "active");
    assert_eq!(me["is_penalized"], false);
}

/// Full circulation scenario: borrow two books, verify stock movement and
/// the loan period, return on time, verify stock is restored and the borrow
/// cannot be returned twice.
#[tokio::test]
#[ignore]
async fn test_borrow_and_return_scenario() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let suffix = unique();

    let user_id = register_member(&client).await;
    let book_a = create_book(&client, &token, &format!("Dune {}", suffix), 1).await;
    let book_b = create_book(&client, &token, &format!("Hyperion {}", suffix), 5).await;

    // Borrow both books
    let response = borrow_books(&client, &token, &user_id, &[&book_a, &book_b]).await;
    assert_eq!(response.status(), 201);

    let borrow: Value = response.json().await.expect("Failed to parse borrow response");
    assert_eq!(borrow["status"], "borrowed");
    assert_eq!(borrow["user_id"].as_str().unwrap(), user_id);
    assert!(borrow["returned_at"].is_null());
    assert_eq!(borrow["books"].as_array().unwrap().len(), 2);

    // The loan period is 7 days
    let borrowed_at: DateTime<Utc> = borrow["borrowed_at"]
        .as_str()
        .unwrap()
        .parse()
        .expect("Invalid borrowed_at");
    let deadline: DateTime<Utc> = borrow["return_deadline"]
        .as_str()
        .unwrap()
        .parse()
        .expect("Invalid return_deadline");
    assert_eq!(deadline - borrowed_at, chrono::Duration::days(7));

    // Stock moved to borrowed on both books
    let a = get_book(&client, &token, &book_a).await;
    assert_eq!(a["stock"], 0);
    assert_eq!(a["borrowed"], 1);
    let b = get_book(&client, &token, &book_b).await;
    assert_eq!(b["stock"], 4);
    assert_eq!(b["borrowed"], 1);

    // Return on time
    let borrow_id = borrow["id"].as_str().unwrap();
    let response = return_borrow(&client, &token, borrow_id).await;
    assert_eq!(response.status(), 200);

    let returned: Value = response.json().await.expect("Failed to parse return response");
    assert_eq!(returned["status"], "returned");
    assert!(returned["returned_at"].is_string());

    // Conservation: stock is back where it started
    let a = get_book(&client, &token, &book_a).await;
    assert_eq!(a["stock"], 1);
    assert_eq!(a["borrowed"], 0);
    let b = get_book(&client, &token, &book_b).await;
    assert_eq!(b["stock"], 5);
    assert_eq!(b["borrowed"], 0);

    // A second return of the same borrow is rejected
    let response = return_borrow(&client, &token, borrow_id).await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_borrow_cap_enforced() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let suffix = unique();

    let user_id = register_member(&client).await;

    let mut books = Vec::new();
    for i in 0..4 {
        books.push(create_book(&client, &token, &format!("Cap {} {}", i, suffix), 1).await);
    }

    // Three active borrowed books is the cap
    let response = borrow_books(
        &client,
        &token,
        &user_id,
        &[&books[0], &books[1], &books[2]],
    )
    .await;
    assert_eq!(response.status(), 201);

    // The fourth is rejected regardless of which book it is
    let response = borrow_books(&client, &token, &user_id, &[&books[3]]).await;
    assert_eq!(response.status(), 409);

    let error: Value = response.json().await.expect("Failed to parse error response");
    assert_eq!(error["error"], "MaxBorrowsReached");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_active_borrow_rejected() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let suffix = unique();

    let user_id = register_member(&client).await;
    let book = create_book(&client, &token, &format!("Solaris {}", suffix), 3).await;

    let response = borrow_books(&client, &token, &user_id, &[&book]).await;
    assert_eq!(response.status(), 201);

    // A second active borrow of the same book is rejected even with stock left
    let response = borrow_books(&client, &token, &user_id, &[&book]).await;
    assert_eq!(response.status(), 409);

    let error: Value = response.json().await.expect("Failed to parse error response");
    assert_eq!(error["error"], "AlreadyBorrowed");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_within_one_request_rejected() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let suffix = unique();

    let user_id = register_member(&client).await;
    let book = create_book(&client, &token, &format!("Ubik {}", suffix), 3).await;

    let response = borrow_books(&client, &token, &user_id, &[&book, &book]).await;
    assert_eq!(response.status(), 409);

    // The failed request must not leak a partial borrow or stock change
    let b = get_book(&client, &token, &book).await;
    assert_eq!(b["stock"], 3);
    assert_eq!(b["borrowed"], 0);
}

/// A borrow of two books where the second has zero stock must leave no trace:
/// no loan, no line items, no stock movement on either book.
#[tokio::test]
#[ignore]
async fn test_atomic_rollback_on_insufficient_stock() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let suffix = unique();

    let user_id = register_member(&client).await;
    let in_stock = create_book(&client, &token, &format!("Stocked {}", suffix), 1).await;
    let out_of_stock = create_book(&client, &token, &format!("Empty {}", suffix), 0).await;

    let response = borrow_books(&client, &token, &user_id, &[&in_stock, &out_of_stock]).await;
    assert_eq!(response.status(), 409);

    let error: Value = response.json().await.expect("Failed to parse error response");
    assert_eq!(error["error"], "InsufficientStock");

    // Zero net change for both books
    let a = get_book(&client, &token, &in_stock).await;
    assert_eq!(a["stock"], 1);
    assert_eq!(a["borrowed"], 0);
    let b = get_book(&client, &token, &out_of_stock).await;
    assert_eq!(b["stock"], 0);
    assert_eq!(b["borrowed"], 0);

    // And no borrow row was persisted
    let borrows: Value = client
        .get(format!("{}/users/{}/borrows", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send borrows request")
        .json()
        .await
        .expect("Failed to parse borrows response");
    assert_eq!(borrows.as_array().unwrap().len(), 0);
}

#[tokio::test]
#[ignore]
async fn test_borrow_requires_books() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let user_id = register_member(&client).await;

    let response = borrow_books(&client, &token, &user_id, &[]).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_borrow_requires_staff() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let suffix = unique();

    let user_id = register_member(&client).await;
    let book = create_book(&client, &admin, &format!("Gated {}", suffix), 1).await;

    // Log in as the member and try to drive circulation directly
    let me: Value = client
        .get(format!("{}/users/{}", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send user request")
        .json()
        .await
        .expect("Failed to parse user response");

    let member_login: Value = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "identifier": me["username"].as_str().unwrap(),
            "password": "reading-room"
        }))
        .send()
        .await
        .expect("Failed to send login request")
        .json()
        .await
        .expect("Failed to parse login response");

    let member_token = member_login["token"].as_str().unwrap();

    let response = borrow_books(&client, member_token, &user_id, &[&book]).await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_books_crud_with_genres() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let suffix = unique();

    // Create a genre
    let genre_name = format!("Scifi {}", suffix);
    let response = client
        .post(format!("{}/genres", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": genre_name }))
        .send()
        .await
        .expect("Failed to send create genre request");
    assert_eq!(response.status(), 201);

    // Create a book in that genre
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": format!("Foundation {}", suffix),
            "authors": "Isaac Asimov",
            "publish_year": 1951,
            "stock": 2,
            "genres": [genre_name]
        }))
        .send()
        .await
        .expect("Failed to send create book request");
    assert_eq!(response.status(), 201);

    let book: Value = response.json().await.expect("Failed to parse book response");
    assert_eq!(book["genres"].as_array().unwrap().len(), 1);

    // Find it through the genre filter
    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .query(&[("genres", genre_name.as_str()), ("genre_match", "all")])
        .send()
        .await
        .expect("Failed to send search request");
    assert!(response.status().is_success());

    let found: Value = response.json().await.expect("Failed to parse search response");
    assert_eq!(found.as_array().unwrap().len(), 1);
}
