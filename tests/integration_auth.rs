mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use campusdesk::campusdesk_config::RateLimitConfig;
use common::{
    create_test_institution, create_test_user, json_request, read_json, setup_test_app,
    setup_test_app_with_rate_limit, token_for,
};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "./migrations")]
async fn test_login_success(pool: PgPool) {
    let institution_id = create_test_institution(&pool, "AUTH").await;
    let user = create_test_user(&pool, "testpass123", "teacher", Some(institution_id)).await;
    let app = setup_test_app(pool.clone()).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": user.email.to_uppercase(), "password": user.password })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["access_token"].is_string());
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["user"]["email"], user.email);
    assert_eq!(body["data"]["user"]["role"], "teacher");
    assert!(body["data"]["user"].get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_invalid_credentials(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "nonexistent@test.com", "password": "wrongpass" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid email or password");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_invalid_email_format(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "not-an-email", "password": "password123" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_requires_token(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let response = app
        .oneshot(json_request("GET", "/api/v1/auth/me", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_with_token_from_login(pool: PgPool) {
    let user = create_test_user(&pool, "testpass123", "super_admin", None).await;
    let app = setup_test_app(pool.clone()).await;

    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": user.email, "password": user.password })),
        ))
        .await
        .unwrap();
    let token = read_json(login).await["data"]["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(json_request("GET", "/api/v1/auth/me", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["id"], user.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivated_user_token_is_rejected(pool: PgPool) {
    let institution_id = create_test_institution(&pool, "DEAC").await;
    let user = create_test_user(&pool, "testpass123", "teacher", Some(institution_id)).await;
    let token = token_for(&user);
    sqlx::query("UPDATE users SET is_active = false WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let app = setup_test_app(pool.clone()).await;

    let response = app
        .oneshot(json_request("GET", "/api/v1/auth/me", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_rate_limit_exceeded(pool: PgPool) {
    let config = RateLimitConfig {
        enabled: true,
        auth_per_second: 60,
        auth_burst_size: 1,
    };
    let app = setup_test_app_with_rate_limit(pool.clone(), config).await;

    let attempt = || {
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header("content-type", "application/json")
            .header("x-forwarded-for", "192.168.1.100")
            .body(Body::from(
                json!({ "email": "test@example.com", "password": "password123" }).to_string(),
            ))
            .unwrap()
    };

    let first = app.clone().oneshot(attempt()).await.unwrap();
    assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

    let second = app.oneshot(attempt()).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}
