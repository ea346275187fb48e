use sqlx::PgPool;
use tracing::instrument;

use campusdesk_core::{AppError, PaginationMeta};
use campusdesk_models::ids::InstitutionId;

use crate::modules::institutions::model::{
    CreateInstitutionDto, Institution, InstitutionFilterParams, PaginatedInstitutionsResponse,
    UpdateInstitutionDto,
};

fn institution_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Institution not found"))
}

pub struct InstitutionService;

impl InstitutionService {
    #[instrument(skip(db))]
    pub async fn create_institution(
        db: &PgPool,
        dto: CreateInstitutionDto,
    ) -> Result<Institution, AppError> {
        let organization_active = sqlx::query_scalar::<_, bool>(
            "SELECT is_active FROM organizations WHERE id = $1",
        )
        .bind(dto.organization_id)
        .fetch_optional(db)
        .await?;

        if organization_active != Some(true) {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Organization not found or inactive"
            )));
        }

        let institution = sqlx::query_as::<_, Institution>(
            r#"INSERT INTO institutions (organization_id, name, code, institution_type, address)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(dto.organization_id)
        .bind(dto.name.trim())
        .bind(dto.code.trim().to_uppercase())
        .bind(dto.institution_type)
        .bind(&dto.address)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "An institution with this code already exists"
                    ));
                }
            }
            AppError::from(e)
        })?;

        Ok(institution)
    }

    /// `scope` pins the listing to a single institution for school admins.
    #[instrument(skip(db))]
    pub async fn list_institutions(
        db: &PgPool,
        scope: Option<InstitutionId>,
        filters: InstitutionFilterParams,
    ) -> Result<PaginatedInstitutionsResponse, AppError> {
        let search = filters.search.as_deref().map(|s| format!("%{}%", s.trim()));
        let where_clause = r#"
            WHERE ($1::uuid IS NULL OR id = $1)
              AND ($2::uuid IS NULL OR organization_id = $2)
              AND ($3::varchar IS NULL OR name ILIKE $3 OR code ILIKE $3)
              AND ($4::boolean IS NULL OR is_active = $4)"#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM institutions {where_clause}"
        ))
        .bind(scope)
        .bind(filters.organization_id)
        .bind(&search)
        .bind(filters.is_active)
        .fetch_one(db)
        .await?;

        let institutions = sqlx::query_as::<_, Institution>(&format!(
            "SELECT * FROM institutions {where_clause} ORDER BY name LIMIT $5 OFFSET $6"
        ))
        .bind(scope)
        .bind(filters.organization_id)
        .bind(&search)
        .bind(filters.is_active)
        .bind(filters.pagination.limit())
        .bind(filters.pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedInstitutionsResponse {
            data: institutions,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_institution(
        db: &PgPool,
        id: InstitutionId,
        scope: Option<InstitutionId>,
    ) -> Result<Institution, AppError> {
        if scope.is_some_and(|own| own != id) {
            return Err(institution_not_found());
        }

        sqlx::query_as::<_, Institution>("SELECT * FROM institutions WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(institution_not_found)
    }

    #[instrument(skip(db))]
    pub async fn update_institution(
        db: &PgPool,
        id: InstitutionId,
        scope: Option<InstitutionId>,
        dto: UpdateInstitutionDto,
    ) -> Result<Institution, AppError> {
        if scope.is_some_and(|own| own != id) {
            return Err(institution_not_found());
        }

        sqlx::query_as::<_, Institution>(
            r#"UPDATE institutions SET
                   name = COALESCE($2, name),
                   institution_type = COALESCE($3, institution_type),
                   address = COALESCE($4, address),
                   is_active = COALESCE($5, is_active),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(dto.institution_type)
        .bind(&dto.address)
        .bind(dto.is_active)
        .fetch_optional(db)
        .await?
        .ok_or_else(institution_not_found)
    }

    /// Refuses while admissions or users still belong to the institution.
    #[instrument(skip(db))]
    pub async fn delete_institution(db: &PgPool, id: InstitutionId) -> Result<(), AppError> {
        let (admissions, users) = sqlx::query_as::<_, (i64, i64)>(
            r#"SELECT
                   (SELECT COUNT(*) FROM admissions WHERE institution_id = $1),
                   (SELECT COUNT(*) FROM users WHERE institution_id = $1)"#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        if admissions > 0 || users > 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot delete institution with {} admission(s) and {} user(s)",
                admissions,
                users
            )));
        }

        let result = sqlx::query("DELETE FROM institutions WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(institution_not_found());
        }
        Ok(())
    }
}
