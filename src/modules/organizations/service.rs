use sqlx::PgPool;
use tracing::instrument;

use campusdesk_core::{AppError, PaginationMeta};
use campusdesk_models::ids::OrganizationId;

use crate::modules::organizations::model::{
    CreateOrganizationDto, Organization, OrganizationFilterParams, PaginatedOrganizationsResponse,
    UpdateOrganizationDto,
};

fn organization_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Organization not found"))
}

pub struct OrganizationService;

impl OrganizationService {
    #[instrument(skip(db))]
    pub async fn create_organization(
        db: &PgPool,
        dto: CreateOrganizationDto,
    ) -> Result<Organization, AppError> {
        let organization = sqlx::query_as::<_, Organization>(
            r#"INSERT INTO organizations (name, code, address)
               VALUES ($1, $2, $3)
               RETURNING *"#,
        )
        .bind(dto.name.trim())
        .bind(dto.code.trim().to_uppercase())
        .bind(&dto.address)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::conflict(anyhow::anyhow!(
                        "An organization with this code already exists"
                    ));
                }
            }
            AppError::from(e)
        })?;

        Ok(organization)
    }

    #[instrument(skip(db))]
    pub async fn list_organizations(
        db: &PgPool,
        filters: OrganizationFilterParams,
    ) -> Result<PaginatedOrganizationsResponse, AppError> {
        let search = filters.search.as_deref().map(|s| format!("%{}%", s.trim()));
        let where_clause = r#"
            WHERE ($1::varchar IS NULL OR name ILIKE $1 OR code ILIKE $1)
              AND ($2::boolean IS NULL OR is_active = $2)"#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM organizations {where_clause}"
        ))
        .bind(&search)
        .bind(filters.is_active)
        .fetch_one(db)
        .await?;

        let organizations = sqlx::query_as::<_, Organization>(&format!(
            "SELECT * FROM organizations {where_clause} ORDER BY name LIMIT $3 OFFSET $4"
        ))
        .bind(&search)
        .bind(filters.is_active)
        .bind(filters.pagination.limit())
        .bind(filters.pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedOrganizationsResponse {
            data: organizations,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_organization(
        db: &PgPool,
        id: OrganizationId,
    ) -> Result<Organization, AppError> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(organization_not_found)
    }

    #[instrument(skip(db))]
    pub async fn update_organization(
        db: &PgPool,
        id: OrganizationId,
        dto: UpdateOrganizationDto,
    ) -> Result<Organization, AppError> {
        sqlx::query_as::<_, Organization>(
            r#"UPDATE organizations SET
                   name = COALESCE($2, name),
                   address = COALESCE($3, address),
                   is_active = COALESCE($4, is_active),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(&dto.address)
        .bind(dto.is_active)
        .fetch_optional(db)
        .await?
        .ok_or_else(organization_not_found)
    }

    /// Fails with 409 while any institution still belongs to it.
    #[instrument(skip(db))]
    pub async fn delete_organization(db: &PgPool, id: OrganizationId) -> Result<(), AppError> {
        let institutions = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM institutions WHERE organization_id = $1",
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        if institutions > 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot delete organization with {} institution(s)",
                institutions
            )));
        }

        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(organization_not_found());
        }
        Ok(())
    }
}
