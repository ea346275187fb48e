use sqlx::PgPool;
use tracing::instrument;

use campusdesk_auth::create_access_token;
use campusdesk_config::JwtConfig;
use campusdesk_core::{AppError, verify_password};
use campusdesk_models::User;

use crate::metrics;

use super::model::{LoginRequest, LoginResponse};

pub struct AuthService;

impl AuthService {
    /// Exchanges credentials for an access token.
    ///
    /// Unknown email and wrong password produce the same message.
    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let email = dto.email.trim().to_lowercase();

        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(db)
            .await?;

        let Some(user) = user else {
            metrics::track_login_failure("unknown_email");
            return Err(AppError::unauthorized("Invalid email or password"));
        };

        if !verify_password(&dto.password, &user.password)? {
            metrics::track_login_failure("wrong_password");
            return Err(AppError::unauthorized("Invalid email or password"));
        }

        if !user.is_active {
            metrics::track_login_failure("inactive");
            return Err(AppError::unauthorized("Account is deactivated"));
        }

        let access_token = create_access_token(user.id.into_inner(), jwt_config)?;
        metrics::track_login_success(user.role);

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use campusdesk_auth::verify_token;
    use campusdesk_core::hash_password;
    use campusdesk_models::UserRole;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test_secret_key_for_testing_purposes".to_string(),
            access_token_expiry: 3600,
        }
    }

    async fn insert_user(pool: &PgPool, email: &str, password: &str, is_active: bool) -> User {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (first_name, last_name, email, password, role, is_active)
               VALUES ('Grace', 'Hopper', $1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(email)
        .bind(hash_password(password).unwrap())
        .bind(UserRole::SuperAdmin)
        .bind(is_active)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_login_success_issues_token_for_user(pool: PgPool) {
        let user = insert_user(&pool, "grace@example.com", "password123", true).await;

        let response = AuthService::login_user(
            &pool,
            login("Grace@Example.com", "password123"),
            &jwt_config(),
        )
        .await
        .unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);
        assert_eq!(response.user.id, user.id);
        let claims = verify_token(&response.access_token, &jwt_config()).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id.into_inner());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_login_wrong_password_is_unauthorized(pool: PgPool) {
        insert_user(&pool, "grace@example.com", "password123", true).await;

        let err = AuthService::login_user(&pool, login("grace@example.com", "nope"), &jwt_config())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let err = AuthService::login_user(
            &pool,
            login("nobody@example.com", "password123"),
            &jwt_config(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_login_inactive_user_is_unauthorized(pool: PgPool) {
        insert_user(&pool, "grace@example.com", "password123", false).await;

        let err = AuthService::login_user(
            &pool,
            login("grace@example.com", "password123"),
            &jwt_config(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.client_message(), "Account is deactivated");
    }
}
