use chrono::{Days, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use campusdesk_config::{AcademicYear, AcademicYearConfig};
use campusdesk_core::{AppError, PaginationMeta};
use campusdesk_models::ids::{AdmissionId, ClassId, InstitutionId, UserId};

use crate::metrics;
use crate::modules::admissions::model::{
    Admission, AdmissionFilterParams, AdmissionStatsOverview, AdmissionStatus, AdmissionTrends,
    ApproveEnrollDto, ApproveEnrollResponse, CreateAdmissionDto, PaginatedAdmissionsResponse,
    StatsOverviewParams, StatusCountRow, StatusCounts, Student, TransitionError, TrendParams,
    TrendRow, UpdateAdmissionDto, format_application_number,
};

/// Matches every institution when the bound scope is NULL.
const SCOPE_FILTER: &str = "($2::uuid IS NULL OR institution_id = $2)";

fn transition_conflict(err: TransitionError) -> AppError {
    AppError::conflict(anyhow::Error::new(err))
}

fn concurrent_change() -> AppError {
    AppError::conflict(anyhow::anyhow!(
        "Admission was modified by another request, reload and try again"
    ))
}

fn admission_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Admission not found"))
}

async fn next_application_sequence(
    tx: &mut Transaction<'_, Postgres>,
    institution_id: InstitutionId,
    academic_year: &str,
) -> Result<i32, AppError> {
    let value = sqlx::query_scalar::<_, i32>(
        r#"INSERT INTO application_counters (institution_id, academic_year, last_value)
           VALUES ($1, $2, 1)
           ON CONFLICT (institution_id, academic_year)
           DO UPDATE SET last_value = application_counters.last_value + 1
           RETURNING last_value"#,
    )
    .bind(institution_id)
    .bind(academic_year)
    .fetch_one(&mut **tx)
    .await?;
    Ok(value)
}

/// Next free roll number for the year. Never returns a number at or below
/// the highest roll already held by a student, so numbers assigned by hand
/// are skipped.
async fn next_roll_number(
    tx: &mut Transaction<'_, Postgres>,
    institution_id: InstitutionId,
    academic_year: &str,
) -> Result<i32, AppError> {
    let value = sqlx::query_scalar::<_, i32>(
        r#"INSERT INTO roll_number_counters (institution_id, academic_year, last_value)
           VALUES (
               $1, $2,
               COALESCE(
                   (SELECT MAX(roll_number) FROM students
                    WHERE institution_id = $1 AND academic_year = $2),
                   0
               ) + 1
           )
           ON CONFLICT (institution_id, academic_year)
           DO UPDATE SET last_value = GREATEST(
               roll_number_counters.last_value + 1,
               EXCLUDED.last_value
           )
           RETURNING last_value"#,
    )
    .bind(institution_id)
    .bind(academic_year)
    .fetch_one(&mut **tx)
    .await?;
    Ok(value)
}

/// Moves the roll counter past a number that was assigned explicitly.
async fn raise_roll_counter(
    tx: &mut Transaction<'_, Postgres>,
    institution_id: InstitutionId,
    academic_year: &str,
    roll_number: i32,
) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO roll_number_counters (institution_id, academic_year, last_value)
           VALUES ($1, $2, $3)
           ON CONFLICT (institution_id, academic_year)
           DO UPDATE SET last_value = GREATEST(roll_number_counters.last_value, EXCLUDED.last_value)"#,
    )
    .bind(institution_id)
    .bind(academic_year)
    .bind(roll_number)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Checks that `class_id` exists and belongs to `institution_id`.
async fn ensure_class_in_institution<'e, E>(
    executor: E,
    class_id: ClassId,
    institution_id: InstitutionId,
) -> Result<(), AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    let owner = sqlx::query_scalar::<_, InstitutionId>(
        "SELECT institution_id FROM classes WHERE id = $1",
    )
    .bind(class_id)
    .fetch_optional(executor)
    .await?;

    match owner {
        Some(owner) if owner == institution_id => Ok(()),
        _ => Err(AppError::bad_request(anyhow::anyhow!(
            "Class does not belong to this institution"
        ))),
    }
}

pub struct AdmissionService;

impl AdmissionService {
    /// Records a new application in `pending` status.
    ///
    /// The application number comes from a per-institution, per-year counter
    /// incremented in the same transaction as the insert, so numbers are never
    /// reused even under concurrent creation.
    #[instrument(skip(db, academic))]
    pub async fn create_admission(
        db: &PgPool,
        academic: &AcademicYearConfig,
        institution_id: InstitutionId,
        created_by: UserId,
        dto: CreateAdmissionDto,
    ) -> Result<Admission, AppError> {
        let today = Utc::now().date_naive();
        if dto.date_of_birth >= today {
            return Err(AppError::validation(anyhow::anyhow!(
                "date_of_birth must be in the past"
            )));
        }

        let academic_year = match dto.academic_year.as_deref() {
            Some(tag) => tag
                .parse::<AcademicYear>()
                .map_err(AppError::validation)?,
            None => academic.year_for(today),
        };
        let academic_year_tag = academic_year.to_string();

        let mut tx = db.begin().await?;

        let institution = sqlx::query_as::<_, (String, bool)>(
            "SELECT code, is_active FROM institutions WHERE id = $1",
        )
        .bind(institution_id)
        .fetch_optional(&mut *tx)
        .await?;

        let code = match institution {
            Some((code, true)) => code,
            _ => {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "Institution not found or inactive"
                )));
            }
        };

        if let Some(class_id) = dto.class_id {
            ensure_class_in_institution(&mut *tx, class_id, institution_id).await?;
        }

        let sequence =
            next_application_sequence(&mut tx, institution_id, &academic_year_tag).await?;
        let application_number =
            format_application_number(&code, academic_year.start_year(), sequence);

        let admission = sqlx::query_as::<_, Admission>(
            r#"INSERT INTO admissions (
                   institution_id, class_id, application_number, first_name, last_name,
                   date_of_birth, gender, guardian_name, guardian_phone, guardian_email,
                   address, previous_school, desired_class, desired_section, academic_year,
                   created_by
               )
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
               RETURNING *"#,
        )
        .bind(institution_id)
        .bind(dto.class_id)
        .bind(&application_number)
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(dto.date_of_birth)
        .bind(&dto.gender)
        .bind(dto.guardian_name.trim())
        .bind(&dto.guardian_phone)
        .bind(&dto.guardian_email)
        .bind(&dto.address)
        .bind(&dto.previous_school)
        .bind(&dto.desired_class)
        .bind(&dto.desired_section)
        .bind(&academic_year_tag)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        metrics::track_admission_created();
        Ok(admission)
    }

    #[instrument(skip(db))]
    pub async fn get_admission(
        db: &PgPool,
        id: AdmissionId,
        scope: Option<InstitutionId>,
    ) -> Result<Admission, AppError> {
        let sql = format!("SELECT * FROM admissions WHERE id = $1 AND {SCOPE_FILTER}");
        sqlx::query_as::<_, Admission>(&sql)
            .bind(id)
            .bind(scope)
            .fetch_optional(db)
            .await?
            .ok_or_else(admission_not_found)
    }

    #[instrument(skip(db))]
    pub async fn list_admissions(
        db: &PgPool,
        scope: Option<InstitutionId>,
        filters: AdmissionFilterParams,
    ) -> Result<PaginatedAdmissionsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();
        let search = filters.search.as_deref().map(|s| format!("%{}%", s.trim()));

        let where_clause = r#"
            WHERE ($1::uuid IS NULL OR institution_id = $1)
              AND ($2::varchar IS NULL OR status = $2)
              AND ($3::varchar IS NULL OR academic_year = $3)
              AND ($4::uuid IS NULL OR class_id = $4)
              AND ($5::boolean IS NULL OR is_active = $5)
              AND ($6::varchar IS NULL
                   OR first_name ILIKE $6
                   OR last_name ILIKE $6
                   OR application_number ILIKE $6)"#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM admissions {where_clause}"
        ))
        .bind(scope)
        .bind(filters.status)
        .bind(&filters.academic_year)
        .bind(filters.class_id)
        .bind(filters.is_active)
        .bind(&search)
        .fetch_one(db)
        .await?;

        let admissions = sqlx::query_as::<_, Admission>(&format!(
            "SELECT * FROM admissions {where_clause} ORDER BY created_at DESC, id LIMIT $7 OFFSET $8"
        ))
        .bind(scope)
        .bind(filters.status)
        .bind(&filters.academic_year)
        .bind(filters.class_id)
        .bind(filters.is_active)
        .bind(&search)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(PaginatedAdmissionsResponse {
            data: admissions,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    /// Edits applicant details. Omitted fields are left unchanged.
    #[instrument(skip(db))]
    pub async fn update_admission(
        db: &PgPool,
        id: AdmissionId,
        scope: Option<InstitutionId>,
        dto: UpdateAdmissionDto,
    ) -> Result<Admission, AppError> {
        let existing = Self::get_admission(db, id, scope).await?;

        let academic_year = dto
            .academic_year
            .as_deref()
            .map(|tag| tag.parse::<AcademicYear>().map_err(AppError::validation))
            .transpose()?
            .map(|year| year.to_string());

        // The student record copies class and year at enrollment.
        if existing.student_id.is_some() {
            let class_changed = dto.class_id.is_some_and(|c| Some(c) != existing.class_id);
            let year_changed = academic_year
                .as_deref()
                .is_some_and(|y| y != existing.academic_year);
            if class_changed || year_changed {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Class and academic year cannot change after enrollment"
                )));
            }
        }

        if let Some(class_id) = dto.class_id {
            ensure_class_in_institution(db, class_id, existing.institution_id).await?;
        }
        if dto.date_of_birth.is_some_and(|dob| dob >= Utc::now().date_naive()) {
            return Err(AppError::validation(anyhow::anyhow!(
                "date_of_birth must be in the past"
            )));
        }

        let admission = sqlx::query_as::<_, Admission>(
            r#"UPDATE admissions SET
                   first_name = COALESCE($2, first_name),
                   last_name = COALESCE($3, last_name),
                   date_of_birth = COALESCE($4, date_of_birth),
                   gender = COALESCE($5, gender),
                   guardian_name = COALESCE($6, guardian_name),
                   guardian_phone = COALESCE($7, guardian_phone),
                   guardian_email = COALESCE($8, guardian_email),
                   address = COALESCE($9, address),
                   previous_school = COALESCE($10, previous_school),
                   class_id = COALESCE($11, class_id),
                   desired_class = COALESCE($12, desired_class),
                   desired_section = COALESCE($13, desired_section),
                   academic_year = COALESCE($14, academic_year),
                   is_active = COALESCE($15, is_active),
                   updated_at = NOW()
               WHERE id = $1
                 AND (student_id IS NULL
                      OR (($11::uuid IS NULL OR class_id IS NOT DISTINCT FROM $11)
                          AND ($14::varchar IS NULL OR academic_year = $14)))
               RETURNING *"#,
        )
        .bind(id)
        .bind(dto.first_name.as_deref().map(str::trim))
        .bind(dto.last_name.as_deref().map(str::trim))
        .bind(dto.date_of_birth)
        .bind(&dto.gender)
        .bind(dto.guardian_name.as_deref().map(str::trim))
        .bind(&dto.guardian_phone)
        .bind(&dto.guardian_email)
        .bind(&dto.address)
        .bind(&dto.previous_school)
        .bind(dto.class_id)
        .bind(&dto.desired_class)
        .bind(&dto.desired_section)
        .bind(&academic_year)
        .bind(dto.is_active)
        .fetch_optional(db)
        .await?
        .ok_or_else(concurrent_change)?;

        Ok(admission)
    }

    /// Moves an admission along one edge of the state machine.
    ///
    /// The update is conditional on the status observed before validation;
    /// if another request changed it in between, nothing is written and the
    /// caller gets a conflict.
    #[instrument(skip(db))]
    pub async fn update_status(
        db: &PgPool,
        id: AdmissionId,
        scope: Option<InstitutionId>,
        target: AdmissionStatus,
        reviewer: UserId,
    ) -> Result<Admission, AppError> {
        let current = Self::get_admission(db, id, scope).await?;
        current
            .status
            .check_status_update(target)
            .map_err(transition_conflict)?;

        let admission = sqlx::query_as::<_, Admission>(
            r#"UPDATE admissions SET
                   status = $3,
                   reviewed_by = $4,
                   reviewed_at = NOW(),
                   updated_at = NOW()
               WHERE id = $1 AND status = $2
               RETURNING *"#,
        )
        .bind(id)
        .bind(current.status)
        .bind(target)
        .bind(reviewer)
        .fetch_optional(db)
        .await?
        .ok_or_else(concurrent_change)?;

        metrics::track_admission_transition(current.status, target);
        Ok(admission)
    }

    /// Rejects an admission with a reason. Allowed from `pending` and
    /// `under_review`.
    #[instrument(skip(db))]
    pub async fn reject_admission(
        db: &PgPool,
        id: AdmissionId,
        scope: Option<InstitutionId>,
        reason: &str,
        reviewer: UserId,
    ) -> Result<Admission, AppError> {
        let current = Self::get_admission(db, id, scope).await?;
        current
            .status
            .check_status_update(AdmissionStatus::Rejected)
            .map_err(transition_conflict)?;

        let admission = sqlx::query_as::<_, Admission>(
            r#"UPDATE admissions SET
                   status = 'rejected',
                   rejection_reason = $3,
                   reviewed_by = $4,
                   reviewed_at = NOW(),
                   updated_at = NOW()
               WHERE id = $1 AND status = $2
               RETURNING *"#,
        )
        .bind(id)
        .bind(current.status)
        .bind(reason.trim())
        .bind(reviewer)
        .fetch_optional(db)
        .await?
        .ok_or_else(concurrent_change)?;

        metrics::track_admission_transition(current.status, AdmissionStatus::Rejected);
        Ok(admission)
    }

    /// Approves an admission and creates its student record in one
    /// transaction.
    ///
    /// Steps, all inside the transaction:
    /// 1. conditionally move the admission to `enrolled` (only from the
    ///    status observed at the start, and only while no student is linked)
    /// 2. pick the roll number: the explicit one, or the next free counter value
    /// 3. insert the student, then move the counter past an explicit number
    /// 4. link the student back to the admission
    ///
    /// Any failure rolls everything back, leaving the admission untouched.
    #[instrument(skip(db))]
    pub async fn approve_and_enroll(
        db: &PgPool,
        id: AdmissionId,
        scope: Option<InstitutionId>,
        reviewer: UserId,
        dto: ApproveEnrollDto,
    ) -> Result<ApproveEnrollResponse, AppError> {
        let current = Self::get_admission(db, id, scope).await?;
        if current.student_id.is_some() {
            metrics::track_enrollment_failure("already_enrolled");
            return Err(AppError::conflict(anyhow::anyhow!(
                "Admission already has a student record"
            )));
        }
        current.status.check_enrollable().map_err(|e| {
            metrics::track_enrollment_failure("invalid_status");
            transition_conflict(e)
        })?;

        if let Some(class_id) = dto.class_id {
            ensure_class_in_institution(db, class_id, current.institution_id).await?;
        }

        let mut tx = db.begin().await?;

        let admission = sqlx::query_as::<_, Admission>(
            r#"UPDATE admissions SET
                   status = 'enrolled',
                   class_id = COALESCE($3, class_id),
                   reviewed_by = COALESCE(reviewed_by, $4),
                   reviewed_at = COALESCE(reviewed_at, NOW()),
                   enrolled_at = NOW(),
                   updated_at = NOW()
               WHERE id = $1 AND status = $2 AND student_id IS NULL
               RETURNING *"#,
        )
        .bind(id)
        .bind(current.status)
        .bind(dto.class_id)
        .bind(reviewer)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(admission) = admission else {
            metrics::track_enrollment_failure("concurrent_change");
            return Err(concurrent_change());
        };

        let roll_number = match dto.roll_number {
            Some(roll) => roll,
            None => {
                next_roll_number(&mut tx, admission.institution_id, &admission.academic_year)
                    .await?
            }
        };

        let student = sqlx::query_as::<_, Student>(
            r#"INSERT INTO students (
                   institution_id, admission_id, class_id, roll_number,
                   first_name, last_name, date_of_birth, academic_year
               )
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(admission.institution_id)
        .bind(admission.id)
        .bind(admission.class_id)
        .bind(roll_number)
        .bind(&admission.first_name)
        .bind(&admission.last_name)
        .bind(admission.date_of_birth)
        .bind(&admission.academic_year)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    metrics::track_enrollment_failure("roll_number_taken");
                    return AppError::conflict(anyhow::anyhow!(
                        "Roll number {} is already assigned in {}",
                        roll_number,
                        admission.academic_year
                    ));
                }
            }
            metrics::track_enrollment_failure("student_insert");
            AppError::from(e)
        })?;

        if dto.roll_number.is_some() {
            raise_roll_counter(
                &mut tx,
                admission.institution_id,
                &admission.academic_year,
                roll_number,
            )
            .await?;
        }

        let admission = sqlx::query_as::<_, Admission>(
            "UPDATE admissions SET student_id = $2 WHERE id = $1 RETURNING *",
        )
        .bind(admission.id)
        .bind(student.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if current.status == AdmissionStatus::UnderReview {
            metrics::track_admission_transition(current.status, AdmissionStatus::Approved);
        }
        metrics::track_admission_transition(AdmissionStatus::Approved, AdmissionStatus::Enrolled);

        Ok(ApproveEnrollResponse { admission, student })
    }

    /// Deletes an admission that never produced a student.
    #[instrument(skip(db))]
    pub async fn delete_admission(
        db: &PgPool,
        id: AdmissionId,
        scope: Option<InstitutionId>,
    ) -> Result<(), AppError> {
        let current = Self::get_admission(db, id, scope).await?;
        if current.student_id.is_some() {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Cannot delete an admission that has a student record"
            )));
        }

        let result = sqlx::query("DELETE FROM admissions WHERE id = $1 AND student_id IS NULL")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::conflict(anyhow::anyhow!(
                            "Cannot delete an admission that has a student record"
                        ));
                    }
                }
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(concurrent_change());
        }

        metrics::track_admission_deleted();
        Ok(())
    }

    /// Counts per status, optionally narrowed to one academic year.
    #[instrument(skip(db))]
    pub async fn stats_overview(
        db: &PgPool,
        scope: Option<InstitutionId>,
        params: StatsOverviewParams,
    ) -> Result<AdmissionStatsOverview, AppError> {
        let rows = sqlx::query_as::<_, StatusCountRow>(
            r#"SELECT status, COUNT(*) AS count
               FROM admissions
               WHERE ($1::uuid IS NULL OR institution_id = $1)
                 AND ($2::varchar IS NULL OR academic_year = $2)
               GROUP BY status"#,
        )
        .bind(scope)
        .bind(&params.academic_year)
        .fetch_all(db)
        .await?;

        let by_status: StatusCounts = rows.into_iter().collect();

        Ok(AdmissionStatsOverview {
            total: by_status.total(),
            by_status,
            academic_year: params.academic_year,
            institution_id: scope,
        })
    }

    /// Daily counts by status for the last `days` days, bucketed by the
    /// local date in the requested time zone. The window ends on today's
    /// local date and every day is present, zero-filled when empty.
    #[instrument(skip(db))]
    pub async fn stats_trends(
        db: &PgPool,
        scope: Option<InstitutionId>,
        params: TrendParams,
    ) -> Result<AdmissionTrends, AppError> {
        let days = params.days().ok_or_else(|| {
            AppError::validation(anyhow::anyhow!("days must be between 1 and 366"))
        })?;
        let timezone = params.timezone().trim();

        let known = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM pg_timezone_names WHERE name = $1)",
        )
        .bind(timezone)
        .fetch_one(db)
        .await?;
        if !known {
            return Err(AppError::validation(anyhow::anyhow!(
                "Unknown timezone: {}",
                timezone
            )));
        }

        let today = sqlx::query_scalar::<_, NaiveDate>("SELECT (NOW() AT TIME ZONE $1)::date")
            .bind(timezone)
            .fetch_one(db)
            .await?;
        let start = today
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .unwrap_or(NaiveDate::MIN);

        let rows = sqlx::query_as::<_, TrendRow>(
            r#"SELECT (created_at AT TIME ZONE $1)::date AS day, status, COUNT(*) AS count
               FROM admissions
               WHERE ($2::uuid IS NULL OR institution_id = $2)
                 AND created_at >= ($3::date::timestamp AT TIME ZONE $1)
                 AND created_at < (($4::date + 1)::timestamp AT TIME ZONE $1)
               GROUP BY 1, 2"#,
        )
        .bind(timezone)
        .bind(scope)
        .bind(start)
        .bind(today)
        .fetch_all(db)
        .await?;

        Ok(AdmissionTrends::build(timezone, today, days, &rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        ACADEMIC_YEAR, admission_dto, auth_user, create_class, create_institution,
    };
    use axum::http::StatusCode;
    use campusdesk_models::UserRole;

    fn academic() -> AcademicYearConfig {
        AcademicYearConfig::default()
    }

    async fn reviewer(pool: &PgPool, institution_id: InstitutionId) -> UserId {
        auth_user(pool, UserRole::SchoolAdmin, Some(institution_id))
            .await
            .user_id()
    }

    async fn new_admission(
        pool: &PgPool,
        institution_id: InstitutionId,
        first_name: &str,
    ) -> Admission {
        let creator = reviewer(pool, institution_id).await;
        AdmissionService::create_admission(
            pool,
            &academic(),
            institution_id,
            creator,
            admission_dto(first_name),
        )
        .await
        .unwrap()
    }

    async fn admission_in(
        pool: &PgPool,
        institution_id: InstitutionId,
        status: AdmissionStatus,
    ) -> Admission {
        let admission = new_admission(pool, institution_id, "Chidi").await;
        sqlx::query_as::<_, Admission>(
            "UPDATE admissions SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(admission.id)
        .bind(status)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn student_count(pool: &PgPool, institution_id: InstitutionId) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE institution_id = $1")
            .bind(institution_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_assigns_sequential_application_numbers(pool: PgPool) {
        let inst = create_institution(&pool, "GVS").await;

        let first = new_admission(&pool, inst, "Amaka").await;
        let second = new_admission(&pool, inst, "Bayo").await;

        assert_eq!(first.status, AdmissionStatus::Pending);
        assert_eq!(first.application_number, "GVS-2026-00001");
        assert_eq!(second.application_number, "GVS-2026-00002");
        assert_eq!(first.academic_year, ACADEMIC_YEAR);
        assert!(first.student_id.is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_defaults_academic_year(pool: PgPool) {
        let inst = create_institution(&pool, "DEF").await;
        let creator = reviewer(&pool, inst).await;
        let mut dto = admission_dto("Tolu");
        dto.academic_year = None;

        let admission =
            AdmissionService::create_admission(&pool, &academic(), inst, creator, dto)
                .await
                .unwrap();

        assert_eq!(
            admission.academic_year,
            academic().tag_for(Utc::now().date_naive())
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_rejects_inactive_institution(pool: PgPool) {
        let inst = create_institution(&pool, "OFF").await;
        let creator = reviewer(&pool, inst).await;
        sqlx::query("UPDATE institutions SET is_active = false WHERE id = $1")
            .bind(inst)
            .execute(&pool)
            .await
            .unwrap();

        let err = AdmissionService::create_admission(
            &pool,
            &academic(),
            inst,
            creator,
            admission_dto("Ngozi"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_rejects_foreign_class(pool: PgPool) {
        let inst = create_institution(&pool, "AAA").await;
        let other = create_institution(&pool, "BBB").await;
        let foreign_class = create_class(&pool, other, "Grade 1").await;
        let creator = reviewer(&pool, inst).await;

        let mut dto = admission_dto("Emeka");
        dto.class_id = Some(foreign_class);

        let err = AdmissionService::create_admission(&pool, &academic(), inst, creator, dto)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_get_outside_scope_is_not_found(pool: PgPool) {
        let inst = create_institution(&pool, "INA").await;
        let other = create_institution(&pool, "INB").await;
        let admission = new_admission(&pool, inst, "Kemi").await;

        let err = AdmissionService::get_admission(&pool, admission.id, Some(other))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let found = AdmissionService::get_admission(&pool, admission.id, None)
            .await
            .unwrap();
        assert_eq!(found.id, admission.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_filters_and_search(pool: PgPool) {
        let inst = create_institution(&pool, "LST").await;
        let other = create_institution(&pool, "OTH").await;
        new_admission(&pool, inst, "Amaka").await;
        new_admission(&pool, inst, "Bayo").await;
        new_admission(&pool, other, "Amaka").await;
        admission_in(&pool, inst, AdmissionStatus::UnderReview).await;

        let all = AdmissionService::list_admissions(&pool, Some(inst), Default::default())
            .await
            .unwrap();
        assert_eq!(all.meta.total, 3);

        let search = AdmissionFilterParams {
            search: Some("amak".into()),
            ..Default::default()
        };
        let found = AdmissionService::list_admissions(&pool, Some(inst), search)
            .await
            .unwrap();
        assert_eq!(found.data.len(), 1);
        assert_eq!(found.data[0].first_name, "Amaka");

        let by_status = AdmissionFilterParams {
            status: Some(AdmissionStatus::UnderReview),
            ..Default::default()
        };
        let reviewing = AdmissionService::list_admissions(&pool, Some(inst), by_status)
            .await
            .unwrap();
        assert_eq!(reviewing.meta.total, 1);

        let everywhere = AdmissionService::list_admissions(&pool, None, Default::default())
            .await
            .unwrap();
        assert_eq!(everywhere.meta.total, 4);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_leaves_omitted_fields(pool: PgPool) {
        let inst = create_institution(&pool, "UPD").await;
        let admission = new_admission(&pool, inst, "Ife").await;

        let dto = UpdateAdmissionDto {
            guardian_phone: Some("+2348111111111".into()),
            ..Default::default()
        };
        let updated = AdmissionService::update_admission(&pool, admission.id, Some(inst), dto)
            .await
            .unwrap();

        assert_eq!(updated.guardian_phone, "+2348111111111");
        assert_eq!(updated.first_name, "Ife");
        assert_eq!(updated.status, AdmissionStatus::Pending);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_normalizes_academic_year(pool: PgPool) {
        let inst = create_institution(&pool, "UAY").await;
        let admission = new_admission(&pool, inst, "Tobi").await;

        let dto = UpdateAdmissionDto {
            academic_year: Some(" 2027-2028 ".into()),
            ..Default::default()
        };
        let updated = AdmissionService::update_admission(&pool, admission.id, Some(inst), dto)
            .await
            .unwrap();
        assert_eq!(updated.academic_year, "2027-2028");

        let dto = UpdateAdmissionDto {
            academic_year: Some("+202-+203".into()),
            ..Default::default()
        };
        let err = AdmissionService::update_admission(&pool, admission.id, Some(inst), dto)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_freezes_class_and_year_after_enrollment(pool: PgPool) {
        let inst = create_institution(&pool, "FRZ").await;
        let by = reviewer(&pool, inst).await;
        let class_id = create_class(&pool, inst, "Grade 3").await;
        let other_class = create_class(&pool, inst, "Grade 4").await;

        let admission = admission_in(&pool, inst, AdmissionStatus::Approved).await;
        AdmissionService::approve_and_enroll(
            &pool,
            admission.id,
            Some(inst),
            by,
            ApproveEnrollDto {
                class_id: Some(class_id),
                roll_number: None,
            },
        )
        .await
        .unwrap();

        for dto in [
            UpdateAdmissionDto {
                academic_year: Some("2027-2028".into()),
                ..Default::default()
            },
            UpdateAdmissionDto {
                class_id: Some(other_class),
                ..Default::default()
            },
        ] {
            let err = AdmissionService::update_admission(&pool, admission.id, Some(inst), dto)
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::CONFLICT);
        }

        // Repeating the current values and editing contact details still works.
        let dto = UpdateAdmissionDto {
            class_id: Some(class_id),
            academic_year: Some(ACADEMIC_YEAR.into()),
            guardian_phone: Some("+2348222222222".into()),
            ..Default::default()
        };
        let updated = AdmissionService::update_admission(&pool, admission.id, Some(inst), dto)
            .await
            .unwrap();
        assert_eq!(updated.guardian_phone, "+2348222222222");
        assert_eq!(updated.class_id, Some(class_id));
        assert_eq!(updated.academic_year, ACADEMIC_YEAR);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_legal_status_path(pool: PgPool) {
        let inst = create_institution(&pool, "PTH").await;
        let by = reviewer(&pool, inst).await;
        let admission = new_admission(&pool, inst, "Obi").await;

        let reviewed = AdmissionService::update_status(
            &pool,
            admission.id,
            Some(inst),
            AdmissionStatus::UnderReview,
            by,
        )
        .await
        .unwrap();
        assert_eq!(reviewed.status, AdmissionStatus::UnderReview);
        assert_eq!(reviewed.reviewed_by, Some(by));
        assert!(reviewed.reviewed_at.is_some());

        let approved = AdmissionService::update_status(
            &pool,
            admission.id,
            Some(inst),
            AdmissionStatus::Approved,
            by,
        )
        .await
        .unwrap();
        assert_eq!(approved.status, AdmissionStatus::Approved);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_illegal_transitions_conflict(pool: PgPool) {
        let inst = create_institution(&pool, "ILL").await;
        let by = reviewer(&pool, inst).await;

        let pending = new_admission(&pool, inst, "Uche").await;
        let err = AdmissionService::update_status(
            &pool,
            pending.id,
            Some(inst),
            AdmissionStatus::Approved,
            by,
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err = AdmissionService::update_status(
            &pool,
            pending.id,
            Some(inst),
            AdmissionStatus::Enrolled,
            by,
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let approved = admission_in(&pool, inst, AdmissionStatus::Approved).await;
        let err = AdmissionService::update_status(
            &pool,
            approved.id,
            Some(inst),
            AdmissionStatus::Enrolled,
            by,
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let unchanged = AdmissionService::get_admission(&pool, pending.id, None)
            .await
            .unwrap();
        assert_eq!(unchanged.status, AdmissionStatus::Pending);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_reject_records_reason(pool: PgPool) {
        let inst = create_institution(&pool, "REJ").await;
        let by = reviewer(&pool, inst).await;
        let admission = admission_in(&pool, inst, AdmissionStatus::UnderReview).await;

        let rejected = AdmissionService::reject_admission(
            &pool,
            admission.id,
            Some(inst),
            "  Missing birth certificate ",
            by,
        )
        .await
        .unwrap();
        assert_eq!(rejected.status, AdmissionStatus::Rejected);
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some("Missing birth certificate")
        );

        let err =
            AdmissionService::reject_admission(&pool, admission.id, Some(inst), "Again", by)
                .await
                .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_approve_enroll_creates_linked_student(pool: PgPool) {
        let inst = create_institution(&pool, "ENR").await;
        let by = reviewer(&pool, inst).await;
        let class_id = create_class(&pool, inst, "Grade 3").await;

        for (i, status) in [AdmissionStatus::UnderReview, AdmissionStatus::Approved]
            .into_iter()
            .enumerate()
        {
            let admission = admission_in(&pool, inst, status).await;
            let result = AdmissionService::approve_and_enroll(
                &pool,
                admission.id,
                Some(inst),
                by,
                ApproveEnrollDto {
                    class_id: Some(class_id),
                    roll_number: None,
                },
            )
            .await
            .unwrap();

            assert_eq!(result.admission.status, AdmissionStatus::Enrolled);
            assert_eq!(result.admission.student_id, Some(result.student.id));
            assert_eq!(result.admission.class_id, Some(class_id));
            assert!(result.admission.enrolled_at.is_some());
            assert_eq!(result.student.admission_id, admission.id);
            assert_eq!(result.student.academic_year, ACADEMIC_YEAR);
            assert_eq!(result.student.roll_number, i as i32 + 1);
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_approve_enroll_rejects_wrong_state(pool: PgPool) {
        let inst = create_institution(&pool, "WST").await;
        let by = reviewer(&pool, inst).await;

        for status in [AdmissionStatus::Pending, AdmissionStatus::Rejected] {
            let admission = admission_in(&pool, inst, status).await;
            let err = AdmissionService::approve_and_enroll(
                &pool,
                admission.id,
                Some(inst),
                by,
                ApproveEnrollDto::default(),
            )
            .await
            .unwrap_err();
            assert_eq!(err.status, StatusCode::CONFLICT);
        }
        assert_eq!(student_count(&pool, inst).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_approve_enroll_is_atomic(pool: PgPool) {
        let inst = create_institution(&pool, "ATM").await;
        let by = reviewer(&pool, inst).await;

        let first = admission_in(&pool, inst, AdmissionStatus::Approved).await;
        let enrolled = AdmissionService::approve_and_enroll(
            &pool,
            first.id,
            Some(inst),
            by,
            ApproveEnrollDto::default(),
        )
        .await
        .unwrap();
        assert_eq!(enrolled.student.roll_number, 1);

        // The student insert fails after the status update already ran.
        let second = admission_in(&pool, inst, AdmissionStatus::UnderReview).await;
        let err = AdmissionService::approve_and_enroll(
            &pool,
            second.id,
            Some(inst),
            by,
            ApproveEnrollDto {
                class_id: None,
                roll_number: Some(1),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let after = AdmissionService::get_admission(&pool, second.id, None)
            .await
            .unwrap();
        assert_eq!(after.status, AdmissionStatus::UnderReview);
        assert!(after.student_id.is_none());
        assert!(after.enrolled_at.is_none());
        assert!(after.reviewed_by.is_none());
        assert_eq!(student_count(&pool, inst).await, 1);

        let retried = AdmissionService::approve_and_enroll(
            &pool,
            second.id,
            Some(inst),
            by,
            ApproveEnrollDto::default(),
        )
        .await
        .unwrap();
        assert_eq!(retried.student.roll_number, 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_auto_roll_numbers_skip_explicit_ones(pool: PgPool) {
        let inst = create_institution(&pool, "ROL").await;
        let by = reviewer(&pool, inst).await;

        let manual = admission_in(&pool, inst, AdmissionStatus::Approved).await;
        AdmissionService::approve_and_enroll(
            &pool,
            manual.id,
            Some(inst),
            by,
            ApproveEnrollDto {
                class_id: None,
                roll_number: Some(1),
            },
        )
        .await
        .unwrap();

        let mut rolls = Vec::new();
        for _ in 0..3 {
            let admission = admission_in(&pool, inst, AdmissionStatus::Approved).await;
            let result = AdmissionService::approve_and_enroll(
                &pool,
                admission.id,
                Some(inst),
                by,
                ApproveEnrollDto::default(),
            )
            .await
            .unwrap();
            rolls.push(result.student.roll_number);
        }
        assert_eq!(rolls, vec![2, 3, 4]);

        // A number assigned above the counter is skipped as well.
        let jump = admission_in(&pool, inst, AdmissionStatus::Approved).await;
        AdmissionService::approve_and_enroll(
            &pool,
            jump.id,
            Some(inst),
            by,
            ApproveEnrollDto {
                class_id: None,
                roll_number: Some(10),
            },
        )
        .await
        .unwrap();
        let next = admission_in(&pool, inst, AdmissionStatus::Approved).await;
        let result = AdmissionService::approve_and_enroll(
            &pool,
            next.id,
            Some(inst),
            by,
            ApproveEnrollDto::default(),
        )
        .await
        .unwrap();
        assert_eq!(result.student.roll_number, 11);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_auto_roll_number_skips_students_without_counter(pool: PgPool) {
        let inst = create_institution(&pool, "SED").await;
        let by = reviewer(&pool, inst).await;

        let manual = admission_in(&pool, inst, AdmissionStatus::Approved).await;
        AdmissionService::approve_and_enroll(
            &pool,
            manual.id,
            Some(inst),
            by,
            ApproveEnrollDto {
                class_id: None,
                roll_number: Some(5),
            },
        )
        .await
        .unwrap();
        sqlx::query("DELETE FROM roll_number_counters WHERE institution_id = $1")
            .bind(inst)
            .execute(&pool)
            .await
            .unwrap();

        let admission = admission_in(&pool, inst, AdmissionStatus::Approved).await;
        let result = AdmissionService::approve_and_enroll(
            &pool,
            admission.id,
            Some(inst),
            by,
            ApproveEnrollDto::default(),
        )
        .await
        .unwrap();
        assert_eq!(result.student.roll_number, 6);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_enroll_and_reject_have_one_winner(pool: PgPool) {
        let inst = create_institution(&pool, "RAC").await;
        let by = reviewer(&pool, inst).await;
        let admission = admission_in(&pool, inst, AdmissionStatus::UnderReview).await;

        let (enroll, reject) = tokio::join!(
            AdmissionService::approve_and_enroll(
                &pool,
                admission.id,
                Some(inst),
                by,
                ApproveEnrollDto::default()
            ),
            AdmissionService::reject_admission(
                &pool,
                admission.id,
                Some(inst),
                "Class is full",
                by
            ),
        );

        assert_eq!(
            [enroll.is_ok(), reject.is_ok()]
                .iter()
                .filter(|ok| **ok)
                .count(),
            1
        );
        let after = AdmissionService::get_admission(&pool, admission.id, None)
            .await
            .unwrap();

        match (enroll, reject) {
            (Ok(_), Err(err)) => {
                assert_eq!(err.status, StatusCode::CONFLICT);
                assert_eq!(after.status, AdmissionStatus::Enrolled);
                assert!(after.student_id.is_some());
                assert!(after.rejection_reason.is_none());
                assert_eq!(student_count(&pool, inst).await, 1);
            }
            (Err(err), Ok(_)) => {
                assert_eq!(err.status, StatusCode::CONFLICT);
                assert_eq!(after.status, AdmissionStatus::Rejected);
                assert!(after.student_id.is_none());
                assert_eq!(after.rejection_reason.as_deref(), Some("Class is full"));
                assert_eq!(student_count(&pool, inst).await, 0);
            }
            _ => unreachable!(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_approve_enroll_creates_one_student(pool: PgPool) {
        let inst = create_institution(&pool, "CON").await;
        let by = reviewer(&pool, inst).await;
        let admission = admission_in(&pool, inst, AdmissionStatus::Approved).await;

        let (a, b) = tokio::join!(
            AdmissionService::approve_and_enroll(
                &pool,
                admission.id,
                Some(inst),
                by,
                ApproveEnrollDto::default()
            ),
            AdmissionService::approve_and_enroll(
                &pool,
                admission.id,
                Some(inst),
                by,
                ApproveEnrollDto::default()
            ),
        );

        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        let failure = outcomes.into_iter().find_map(Result::err).unwrap();
        assert_eq!(failure.status, StatusCode::CONFLICT);
        assert_eq!(student_count(&pool, inst).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_blocked_after_enrollment(pool: PgPool) {
        let inst = create_institution(&pool, "DEL").await;
        let by = reviewer(&pool, inst).await;

        let enrolled = admission_in(&pool, inst, AdmissionStatus::Approved).await;
        AdmissionService::approve_and_enroll(
            &pool,
            enrolled.id,
            Some(inst),
            by,
            ApproveEnrollDto::default(),
        )
        .await
        .unwrap();
        let err = AdmissionService::delete_admission(&pool, enrolled.id, Some(inst))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let pending = new_admission(&pool, inst, "Femi").await;
        AdmissionService::delete_admission(&pool, pending.id, Some(inst))
            .await
            .unwrap();
        let err = AdmissionService::get_admission(&pool, pending.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_stats_overview_counts_by_status(pool: PgPool) {
        let inst = create_institution(&pool, "STA").await;
        let other = create_institution(&pool, "STB").await;
        new_admission(&pool, inst, "A").await;
        new_admission(&pool, inst, "B").await;
        admission_in(&pool, inst, AdmissionStatus::Rejected).await;
        new_admission(&pool, other, "C").await;

        let overview =
            AdmissionService::stats_overview(&pool, Some(inst), Default::default())
                .await
                .unwrap();
        assert_eq!(overview.total, 3);
        assert_eq!(overview.by_status.pending, 2);
        assert_eq!(overview.by_status.rejected, 1);
        assert_eq!(overview.by_status.enrolled, 0);

        let other_year = StatsOverviewParams {
            academic_year: Some("2020-2021".into()),
            institution_id: None,
        };
        let empty = AdmissionService::stats_overview(&pool, Some(inst), other_year)
            .await
            .unwrap();
        assert_eq!(empty.total, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_trends_bucket_by_local_day(pool: PgPool) {
        let inst = create_institution(&pool, "TRD").await;
        new_admission(&pool, inst, "A").await;
        let old = new_admission(&pool, inst, "B").await;
        sqlx::query("UPDATE admissions SET created_at = NOW() - INTERVAL '400 days' WHERE id = $1")
            .bind(old.id)
            .execute(&pool)
            .await
            .unwrap();

        let params = TrendParams {
            days: Some(7),
            timezone: Some("Asia/Kolkata".into()),
            institution_id: None,
        };
        let trends = AdmissionService::stats_trends(&pool, Some(inst), params)
            .await
            .unwrap();

        assert_eq!(trends.series.len(), 7);
        assert_eq!(trends.total, 1);
        assert_eq!(trends.series.last().unwrap().total, 1);
        assert_eq!(trends.timezone, "Asia/Kolkata");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_trends_reject_bad_input(pool: PgPool) {
        let bad_zone = TrendParams {
            timezone: Some("Mars/Olympus".into()),
            ..Default::default()
        };
        let err = AdmissionService::stats_trends(&pool, None, bad_zone)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let bad_days = TrendParams {
            days: Some(0),
            ..Default::default()
        };
        let err = AdmissionService::stats_trends(&pool, None, bad_days)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
