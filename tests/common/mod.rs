use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use campusdesk::campusdesk_auth::create_access_token;
use campusdesk::campusdesk_config::{JwtConfig, RateLimitConfig};
use campusdesk::campusdesk_core::hash_password;
use campusdesk::router::init_router;
use campusdesk::state::AppState;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub role: String,
    pub institution_id: Option<Uuid>,
}

#[allow(dead_code)]
pub async fn setup_test_app(pool: PgPool) -> axum::Router {
    setup_test_app_with_rate_limit(pool, RateLimitConfig::disabled()).await
}

pub async fn setup_test_app_with_rate_limit(
    pool: PgPool,
    rate_limit_config: RateLimitConfig,
) -> axum::Router {
    dotenvy::dotenv().ok();
    let mut state = AppState::from_pool(pool);
    state.rate_limit_config = rate_limit_config;
    init_router(state, None)
}

/// Creates an organization and an institution under it.
#[allow(dead_code)]
pub async fn create_test_institution(pool: &PgPool, code: &str) -> Uuid {
    let organization_id: Uuid = sqlx::query_scalar(
        "INSERT INTO organizations (name, code) VALUES ($1, $2) RETURNING id",
    )
    .bind(format!("{code} Trust"))
    .bind(format!("ORG-{code}"))
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query_scalar(
        "INSERT INTO institutions (organization_id, name, code) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(organization_id)
    .bind(format!("{code} School"))
    .bind(code)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// `role` is one of `super_admin`, `school_admin`, `teacher`, `student`.
#[allow(dead_code)]
pub async fn create_test_user(
    pool: &PgPool,
    password: &str,
    role: &str,
    institution_id: Option<Uuid>,
) -> TestUser {
    let email = generate_unique_email();
    let hashed = hash_password(password).unwrap();

    let id: Uuid = sqlx::query_scalar(
        r#"INSERT INTO users (first_name, last_name, email, password, role, institution_id)
           VALUES ('Test', 'User', $1, $2, $3, $4)
           RETURNING id"#,
    )
    .bind(&email)
    .bind(&hashed)
    .bind(role)
    .bind(institution_id)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email,
        password: password.to_string(),
        role: role.to_string(),
        institution_id,
    }
}

/// A token signed with the same configuration the app reads from the environment.
#[allow(dead_code)]
pub fn token_for(user: &TestUser) -> String {
    dotenvy::dotenv().ok();
    create_access_token(user.id, &JwtConfig::from_env()).unwrap()
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

#[allow(dead_code)]
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => Body::from(serde_json::to_string(&value).unwrap()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

#[allow(dead_code)]
pub async fn read_json(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
