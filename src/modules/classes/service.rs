use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use campusdesk_config::{AcademicYear, AcademicYearConfig};
use campusdesk_core::{AppError, PaginationMeta};
use campusdesk_models::ids::{ClassId, InstitutionId};

use crate::modules::classes::model::{
    Class, ClassFilterParams, ClassWithStats, CreateClassDto, PaginatedClassesResponse,
    UpdateClassDto,
};

const SELECT_WITH_STATS: &str = r#"
    SELECT c.*,
           (SELECT COUNT(*) FROM students s WHERE s.class_id = c.id) AS student_count
    FROM classes c"#;

fn class_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Class not found"))
}

fn map_duplicate_class(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::conflict(anyhow::anyhow!(
                "A class with this name and section already exists for the academic year"
            ));
        }
    }
    AppError::from(e)
}

pub struct ClassService;

impl ClassService {
    #[instrument(skip(db, academic))]
    pub async fn create_class(
        db: &PgPool,
        academic: &AcademicYearConfig,
        institution_id: InstitutionId,
        dto: CreateClassDto,
    ) -> Result<Class, AppError> {
        let academic_year = match dto.academic_year.as_deref() {
            Some(tag) => tag
                .parse::<AcademicYear>()
                .map_err(AppError::validation)?
                .to_string(),
            None => academic.tag_for(Utc::now().date_naive()),
        };

        sqlx::query_as::<_, Class>(
            r#"INSERT INTO classes (institution_id, name, section, academic_year, capacity)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(institution_id)
        .bind(dto.name.trim())
        .bind(dto.section.trim())
        .bind(&academic_year)
        .bind(dto.capacity)
        .fetch_one(db)
        .await
        .map_err(map_duplicate_class)
    }

    #[instrument(skip(db))]
    pub async fn list_classes(
        db: &PgPool,
        scope: Option<InstitutionId>,
        filters: ClassFilterParams,
    ) -> Result<PaginatedClassesResponse, AppError> {
        let where_clause = r#"
            WHERE ($1::uuid IS NULL OR c.institution_id = $1)
              AND ($2::varchar IS NULL OR c.academic_year = $2)"#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM classes c {where_clause}"
        ))
        .bind(scope)
        .bind(&filters.academic_year)
        .fetch_one(db)
        .await?;

        let classes = sqlx::query_as::<_, ClassWithStats>(&format!(
            "{SELECT_WITH_STATS} {where_clause} ORDER BY c.academic_year DESC, c.name, c.section LIMIT $3 OFFSET $4"
        ))
        .bind(scope)
        .bind(&filters.academic_year)
        .bind(filters.pagination.limit())
        .bind(filters.pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedClassesResponse {
            data: classes,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_class(
        db: &PgPool,
        id: ClassId,
        scope: Option<InstitutionId>,
    ) -> Result<ClassWithStats, AppError> {
        sqlx::query_as::<_, ClassWithStats>(&format!(
            "{SELECT_WITH_STATS} WHERE c.id = $1 AND ($2::uuid IS NULL OR c.institution_id = $2)"
        ))
        .bind(id)
        .bind(scope)
        .fetch_optional(db)
        .await?
        .ok_or_else(class_not_found)
    }

    #[instrument(skip(db))]
    pub async fn update_class(
        db: &PgPool,
        id: ClassId,
        scope: Option<InstitutionId>,
        dto: UpdateClassDto,
    ) -> Result<Class, AppError> {
        let existing = Self::get_class(db, id, scope).await?;
        if let Some(capacity) = dto.capacity {
            if i64::from(capacity) < existing.student_count {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "Capacity {} is below the {} students already assigned",
                    capacity,
                    existing.student_count
                )));
            }
        }

        sqlx::query_as::<_, Class>(
            r#"UPDATE classes SET
                   name = COALESCE($2, name),
                   section = COALESCE($3, section),
                   capacity = COALESCE($4, capacity),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(dto.section.as_deref().map(str::trim))
        .bind(dto.capacity)
        .fetch_optional(db)
        .await
        .map_err(map_duplicate_class)?
        .ok_or_else(class_not_found)
    }

    /// Fails with 409 while students are assigned to the class.
    #[instrument(skip(db))]
    pub async fn delete_class(
        db: &PgPool,
        id: ClassId,
        scope: Option<InstitutionId>,
    ) -> Result<(), AppError> {
        let existing = Self::get_class(db, id, scope).await?;
        if existing.student_count > 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot delete class with {} assigned student(s)",
                existing.student_count
            )));
        }

        sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
