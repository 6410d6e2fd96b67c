mod common;

use axum::http::StatusCode;
use serde_json::json;

// End-to-end ownership scoping against a live database. Each test skips
// cleanly unless TEST_DATABASE_URL is set.

#[tokio::test]
async fn rows_are_invisible_across_users() {
    let Some((app, _pool)) = common::db_app().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };

    let (owner, _) = common::register(&app).await;
    let (other, _) = common::register(&app).await;

    let (status, created) = common::request(
        &app,
        "POST",
        "/category",
        Some(&owner),
        Some(json!({ "description": "Electronics" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    // The owner sees the row
    let (status, body) = common::request(
        &app,
        "GET",
        "/category?search=Electronics",
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["count"].as_i64().unwrap() >= 1);

    // Another user sees nothing, even with the exact id
    let (status, body) = common::request(
        &app,
        "GET",
        "/category?search=Electronics",
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    let uri = format!("/category/{}", id);
    let (status, _) = common::request(&app, "GET", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::request(
        &app,
        "PUT",
        &uri,
        Some(&other),
        Some(json!({ "description": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::request(&app, "DELETE", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Still intact for the owner
    let (status, body) = common::request(&app, "GET", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Electronics");
}

#[tokio::test]
async fn products_cannot_reference_foreign_categories() {
    let Some((app, _pool)) = common::db_app().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };

    let (owner, _) = common::register(&app).await;
    let (other, _) = common::register(&app).await;

    let (status, category) = common::request(
        &app,
        "POST",
        "/category",
        Some(&owner),
        Some(json!({ "description": "category" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let payload = json!({
        "reference": "001",
        "description": "description 001",
        "unitPrice": 1,
        "category": category["id"],
    });

    // The owner may use their own category; the other user may not
    let (status, _) =
        common::request(&app, "POST", "/product", Some(&owner), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
        common::request(&app, "POST", "/product", Some(&other), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn round_trip_preserves_fields() {
    let Some((app, _pool)) = common::db_app().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };

    let (token, _) = common::register(&app).await;

    let (status, created) = common::request(
        &app,
        "POST",
        "/client",
        Some(&token),
        Some(json!({ "name": "name", "lastName": "lastName", "email": "email@email.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/client/{}", created["id"]);
    let (status, read) = common::request(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["name"], "name");
    assert_eq!(read["lastName"], "lastName");
    assert_eq!(read["email"], "email@email.com");
    assert_eq!(read["id"], created["id"]);
}

#[tokio::test]
async fn delete_of_missing_rows_is_consistently_not_found() {
    let Some((app, _pool)) = common::db_app().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };

    let (token, _) = common::register(&app).await;

    let (status, created) = common::request(
        &app,
        "POST",
        "/category",
        Some(&token),
        Some(json!({ "description": "to delete" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/category/{}", created["id"]);
    let (status, _) = common::request(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // Repeated deletes keep answering 404
    for _ in 0..2 {
        let (status, _) = common::request(&app, "DELETE", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn empty_update_payload_changes_nothing() {
    let Some((app, _pool)) = common::db_app().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };

    let (token, _) = common::register(&app).await;

    let (status, created) = common::request(
        &app,
        "POST",
        "/client",
        Some(&token),
        Some(json!({ "name": "name", "lastName": "lastName", "email": "email@email.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/client/{}", created["id"]);
    let (status, updated) = common::request(&app, "PUT", &uri, Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], created["name"]);
    assert_eq!(updated["lastName"], created["lastName"]);
    assert_eq!(updated["email"], created["email"]);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let Some((app, _pool)) = common::db_app().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };

    let suffix = common::unique();
    let payload = json!({
        "username": format!("dup_{}", suffix),
        "firstName": "User",
        "lastName": "Doe",
        "email": format!("dup_{}@example.com", suffix),
        "password": "Aw3s0m#01",
    });

    let (status, _) = common::request(&app, "POST", "/user", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = common::request(&app, "POST", "/user", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn login_issues_a_working_token() {
    let Some((app, _pool)) = common::db_app().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set");
        return;
    };

    let suffix = common::unique();
    let email = format!("login_{}@example.com", suffix);
    let payload = json!({
        "username": format!("login_{}", suffix),
        "firstName": "User",
        "lastName": "Doe",
        "email": email,
        "password": "Aw3s0m#01",
    });
    let (status, _) = common::request(&app, "POST", "/user", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);

    // Wrong password and unknown email fail identically
    let (status, _) = common::request(
        &app,
        "POST",
        "/user/login",
        None,
        Some(json!({ "email": email, "password": "Wr0ng#pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = common::request(
        &app,
        "POST",
        "/user/login",
        None,
        Some(json!({ "email": email, "password": "Aw3s0m#01" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = common::request(&app, "GET", "/category", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}
