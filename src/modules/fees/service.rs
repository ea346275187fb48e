use sqlx::PgPool;
use tracing::instrument;

use campusdesk_config::AcademicYear;
use campusdesk_core::{AppError, PaginationMeta};
use campusdesk_models::ids::{FeeId, InstitutionId};

use crate::metrics;
use crate::modules::fees::model::{
    CreateFeeDto, FeeFilterParams, PaginatedFeesResponse, StudentFee,
};
use crate::modules::students::service::StudentService;

fn fee_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Fee not found"))
}

pub struct FeeService;

impl FeeService {
    /// Charges a fee to a student. The fee inherits the student's
    /// institution, and their academic year unless one is given.
    #[instrument(skip(db))]
    pub async fn create_fee(
        db: &PgPool,
        scope: Option<InstitutionId>,
        dto: CreateFeeDto,
    ) -> Result<StudentFee, AppError> {
        let student = StudentService::get_student(db, dto.student_id, scope).await?;
        let academic_year = match dto.academic_year.as_deref() {
            Some(tag) => tag
                .parse::<AcademicYear>()
                .map_err(AppError::validation)?
                .to_string(),
            None => student.academic_year.clone(),
        };

        let fee = sqlx::query_as::<_, StudentFee>(
            r#"INSERT INTO student_fees (student_id, institution_id, academic_year, fee_type, amount, due_date)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(student.id)
        .bind(student.institution_id)
        .bind(&academic_year)
        .bind(dto.fee_type.trim())
        .bind(dto.amount)
        .bind(dto.due_date)
        .fetch_one(db)
        .await?;

        Ok(fee)
    }

    #[instrument(skip(db))]
    pub async fn list_fees(
        db: &PgPool,
        scope: Option<InstitutionId>,
        filters: FeeFilterParams,
    ) -> Result<PaginatedFeesResponse, AppError> {
        let where_clause = r#"
            WHERE ($1::uuid IS NULL OR institution_id = $1)
              AND ($2::uuid IS NULL OR student_id = $2)
              AND ($3::varchar IS NULL OR status = $3)
              AND ($4::varchar IS NULL OR academic_year = $4)"#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM student_fees {where_clause}"
        ))
        .bind(scope)
        .bind(filters.student_id)
        .bind(filters.status)
        .bind(&filters.academic_year)
        .fetch_one(db)
        .await?;

        let fees = sqlx::query_as::<_, StudentFee>(&format!(
            "SELECT * FROM student_fees {where_clause} ORDER BY due_date NULLS LAST, created_at LIMIT $5 OFFSET $6"
        ))
        .bind(scope)
        .bind(filters.student_id)
        .bind(filters.status)
        .bind(&filters.academic_year)
        .bind(filters.pagination.limit())
        .bind(filters.pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedFeesResponse {
            data: fees,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_fee(
        db: &PgPool,
        id: FeeId,
        scope: Option<InstitutionId>,
    ) -> Result<StudentFee, AppError> {
        sqlx::query_as::<_, StudentFee>(
            "SELECT * FROM student_fees WHERE id = $1 AND ($2::uuid IS NULL OR institution_id = $2)",
        )
        .bind(id)
        .bind(scope)
        .fetch_optional(db)
        .await?
        .ok_or_else(fee_not_found)
    }

    /// Adds a payment and recomputes the status. The fee row is locked for
    /// the duration so concurrent payments cannot overshoot the amount.
    #[instrument(skip(db))]
    pub async fn record_payment(
        db: &PgPool,
        id: FeeId,
        scope: Option<InstitutionId>,
        amount: i64,
    ) -> Result<StudentFee, AppError> {
        let mut tx = db.begin().await?;

        let fee = sqlx::query_as::<_, StudentFee>(
            r#"SELECT * FROM student_fees
               WHERE id = $1 AND ($2::uuid IS NULL OR institution_id = $2)
               FOR UPDATE"#,
        )
        .bind(id)
        .bind(scope)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(fee_not_found)?;

        let (amount_paid, status) = fee.apply_payment(amount).map_err(AppError::bad_request)?;

        let fee = sqlx::query_as::<_, StudentFee>(
            r#"UPDATE student_fees SET amount_paid = $2, status = $3, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(amount_paid)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        metrics::track_fee_payment(amount);
        Ok(fee)
    }

    /// Only fees without any recorded payment can be deleted.
    #[instrument(skip(db))]
    pub async fn delete_fee(
        db: &PgPool,
        id: FeeId,
        scope: Option<InstitutionId>,
    ) -> Result<(), AppError> {
        let fee = Self::get_fee(db, id, scope).await?;
        if fee.amount_paid > 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot delete a fee with recorded payments"
            )));
        }

        let result = sqlx::query("DELETE FROM student_fees WHERE id = $1 AND amount_paid = 0")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot delete a fee with recorded payments"
            )));
        }
        Ok(())
    }
}
