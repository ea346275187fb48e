use sqlx::PgPool;
use tracing::instrument;

use campusdesk_core::{AppError, PaginationMeta, hash_password};
use campusdesk_models::ids::{InstitutionId, OrganizationId, UserId};

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::{
    CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams, UserRole,
};

fn user_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("User not found"))
}

fn map_email_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::conflict(anyhow::anyhow!("Email is already in use"));
        }
    }
    AppError::from(e)
}

/// Whether `actor` may create or edit a user with `role`.
fn ensure_can_manage(actor: &AuthUser, role: UserRole) -> Result<(), AppError> {
    if actor.is_super_admin() || matches!(role, UserRole::Teacher | UserRole::Student) {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "Only super admins can manage administrator accounts",
        ))
    }
}

pub struct UserService;

impl UserService {
    /// Creates a user. School admins always create into their own
    /// institution; super admins name one for every role except their own.
    #[instrument(skip(db, actor, dto), fields(email = %dto.email, role = %dto.role))]
    pub async fn create_user(
        db: &PgPool,
        actor: &AuthUser,
        dto: CreateUserDto,
    ) -> Result<User, AppError> {
        ensure_can_manage(actor, dto.role)?;

        let institution_id = if actor.is_super_admin() {
            dto.institution_id
        } else {
            actor.institution_id()
        };

        let organization_id = match institution_id {
            Some(institution_id) => Some(Self::active_institution_organization(db, institution_id).await?),
            None if dto.role == UserRole::SuperAdmin => None,
            None => {
                return Err(AppError::validation(anyhow::anyhow!(
                    "institution_id is required for role {}",
                    dto.role
                )));
            }
        };

        let password = hash_password(&dto.password)?;

        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (first_name, last_name, email, password, role, organization_id, institution_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(dto.email.trim().to_lowercase())
        .bind(&password)
        .bind(dto.role)
        .bind(organization_id)
        .bind(institution_id)
        .fetch_one(db)
        .await
        .map_err(map_email_conflict)
    }

    async fn active_institution_organization(
        db: &PgPool,
        institution_id: InstitutionId,
    ) -> Result<OrganizationId, AppError> {
        let row = sqlx::query_as::<_, (OrganizationId, bool)>(
            "SELECT organization_id, is_active FROM institutions WHERE id = $1",
        )
        .bind(institution_id)
        .fetch_optional(db)
        .await?;

        match row {
            Some((organization_id, true)) => Ok(organization_id),
            _ => Err(AppError::bad_request(anyhow::anyhow!(
                "Institution not found or inactive"
            ))),
        }
    }

    #[instrument(skip(db))]
    pub async fn list_users(
        db: &PgPool,
        scope: Option<InstitutionId>,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let where_clause = r#"
            WHERE ($1::uuid IS NULL OR institution_id = $1)
              AND ($2::varchar IS NULL OR role = $2)
              AND ($3::boolean IS NULL OR is_active = $3)"#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM users {where_clause}"
        ))
        .bind(scope)
        .bind(filters.role)
        .bind(filters.is_active)
        .fetch_one(db)
        .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users {where_clause} ORDER BY last_name, first_name, id LIMIT $4 OFFSET $5"
        ))
        .bind(scope)
        .bind(filters.role)
        .bind(filters.is_active)
        .bind(filters.pagination.limit())
        .bind(filters.pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedUsersResponse {
            data: users,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_user(
        db: &PgPool,
        id: UserId,
        scope: Option<InstitutionId>,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND ($2::uuid IS NULL OR institution_id = $2)",
        )
        .bind(id)
        .bind(scope)
        .fetch_optional(db)
        .await?
        .ok_or_else(user_not_found)
    }

    #[instrument(skip(db, actor, dto))]
    pub async fn update_user(
        db: &PgPool,
        actor: &AuthUser,
        id: UserId,
        scope: Option<InstitutionId>,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        let existing = Self::get_user(db, id, scope).await?;
        ensure_can_manage(actor, existing.role)?;

        if existing.id == actor.user_id() && dto.is_active == Some(false) {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "You cannot deactivate your own account"
            )));
        }

        let password = dto.password.as_deref().map(hash_password).transpose()?;

        sqlx::query_as::<_, User>(
            r#"UPDATE users SET
                   first_name = COALESCE($2, first_name),
                   last_name = COALESCE($3, last_name),
                   email = COALESCE($4, email),
                   password = COALESCE($5, password),
                   is_active = COALESCE($6, is_active),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.first_name.as_deref().map(str::trim))
        .bind(dto.last_name.as_deref().map(str::trim))
        .bind(dto.email.as_deref().map(|e| e.trim().to_lowercase()))
        .bind(password)
        .bind(dto.is_active)
        .fetch_optional(db)
        .await
        .map_err(map_email_conflict)?
        .ok_or_else(user_not_found)
    }

    /// Deactivated users are rejected on their next request.
    #[instrument(skip(db, actor))]
    pub async fn deactivate_user(
        db: &PgPool,
        actor: &AuthUser,
        id: UserId,
        scope: Option<InstitutionId>,
    ) -> Result<User, AppError> {
        Self::update_user(
            db,
            actor,
            id,
            scope,
            UpdateUserDto {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }
}
