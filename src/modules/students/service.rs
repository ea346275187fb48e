use sqlx::PgPool;
use tracing::instrument;

use campusdesk_core::{AppError, PaginationMeta};
use campusdesk_models::ids::{InstitutionId, StudentId};

use crate::modules::students::model::{
    PaginatedStudentsResponse, Student, StudentFilterParams, UpdateStudentDto,
};

fn student_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Student not found"))
}

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db))]
    pub async fn list_students(
        db: &PgPool,
        scope: Option<InstitutionId>,
        filters: StudentFilterParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        let search = filters.search.as_deref().map(|s| format!("%{}%", s.trim()));
        let where_clause = r#"
            WHERE ($1::uuid IS NULL OR institution_id = $1)
              AND ($2::uuid IS NULL OR class_id = $2)
              AND ($3::varchar IS NULL OR academic_year = $3)
              AND ($4::boolean IS NULL OR is_active = $4)
              AND ($5::varchar IS NULL OR first_name ILIKE $5 OR last_name ILIKE $5)"#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM students {where_clause}"
        ))
        .bind(scope)
        .bind(filters.class_id)
        .bind(&filters.academic_year)
        .bind(filters.is_active)
        .bind(&search)
        .fetch_one(db)
        .await?;

        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT * FROM students {where_clause} ORDER BY academic_year DESC, roll_number LIMIT $6 OFFSET $7"
        ))
        .bind(scope)
        .bind(filters.class_id)
        .bind(&filters.academic_year)
        .bind(filters.is_active)
        .bind(&search)
        .bind(filters.pagination.limit())
        .bind(filters.pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedStudentsResponse {
            data: students,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_student(
        db: &PgPool,
        id: StudentId,
        scope: Option<InstitutionId>,
    ) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE id = $1 AND ($2::uuid IS NULL OR institution_id = $2)",
        )
        .bind(id)
        .bind(scope)
        .fetch_optional(db)
        .await?
        .ok_or_else(student_not_found)
    }

    /// Edits personal fields, the class assignment and the active flag.
    /// The roll number and the admission link never change.
    #[instrument(skip(db))]
    pub async fn update_student(
        db: &PgPool,
        id: StudentId,
        scope: Option<InstitutionId>,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let existing = Self::get_student(db, id, scope).await?;

        if let Some(class_id) = dto.class_id {
            let owner = sqlx::query_scalar::<_, InstitutionId>(
                "SELECT institution_id FROM classes WHERE id = $1",
            )
            .bind(class_id)
            .fetch_optional(db)
            .await?;
            if owner != Some(existing.institution_id) {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "Class does not belong to this institution"
                )));
            }
        }

        sqlx::query_as::<_, Student>(
            r#"UPDATE students SET
                   first_name = COALESCE($2, first_name),
                   last_name = COALESCE($3, last_name),
                   date_of_birth = COALESCE($4, date_of_birth),
                   class_id = COALESCE($5, class_id),
                   is_active = COALESCE($6, is_active),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.first_name.as_deref().map(str::trim))
        .bind(dto.last_name.as_deref().map(str::trim))
        .bind(dto.date_of_birth)
        .bind(dto.class_id)
        .bind(dto.is_active)
        .fetch_optional(db)
        .await?
        .ok_or_else(student_not_found)
    }
}
