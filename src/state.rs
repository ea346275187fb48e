use campusdesk_config::{AcademicYearConfig, CorsConfig, JwtConfig, RateLimitConfig};
use campusdesk_db::{DatabaseConfig, PgPool};

/// Shared by every handler. Only the pool is mutable state; the rest is
/// configuration read once at startup.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub academic_config: AcademicYearConfig,
}

impl AppState {
    /// State with environment-derived configuration around an existing pool.
    pub fn from_pool(db: PgPool) -> Self {
        Self {
            db,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            rate_limit_config: RateLimitConfig::from_env(),
            academic_config: AcademicYearConfig::from_env(),
        }
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let db_config = DatabaseConfig::from_env()?;
    let db = campusdesk_db::connect(&db_config).await?;

    if db_config.run_migrations {
        campusdesk_db::run_migrations(&db).await?;
    }

    Ok(AppState::from_pool(db))
}
