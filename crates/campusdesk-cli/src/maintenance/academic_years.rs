use anyhow::Context;
use campusdesk_config::AcademicYearConfig;
use campusdesk_models::AdmissionStatus;
use campusdesk_models::ids::AdmissionId;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, FromRow)]
struct AdmissionYearRow {
    id: AdmissionId,
    application_number: String,
    status: AdmissionStatus,
    academic_year: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearMismatch {
    pub admission_id: AdmissionId,
    pub application_number: String,
    pub stored: String,
    pub expected: String,
}

#[derive(Debug, Clone, Default)]
pub struct AcademicYearReport {
    pub checked: usize,
    /// Mismatches that are (or would be) rewritten
    pub mismatched: Vec<YearMismatch>,
    /// Mismatches left alone because the admission is already enrolled
    pub skipped_enrolled: Vec<YearMismatch>,
    pub applied: u64,
}

/// Recomputes each admission's academic year from its creation date.
/// Enrolled admissions are reported but never rewritten; their students
/// carry the same tag.
pub async fn fix_academic_years(
    db: &PgPool,
    config: &AcademicYearConfig,
    apply: bool,
) -> anyhow::Result<AcademicYearReport> {
    let rows = sqlx::query_as::<_, AdmissionYearRow>(
        "SELECT id, application_number, status, academic_year, created_at
         FROM admissions
         ORDER BY created_at",
    )
    .fetch_all(db)
    .await
    .context("Failed to load admissions")?;

    let mut report = AcademicYearReport {
        checked: rows.len(),
        ..Default::default()
    };

    for row in rows {
        let expected = config.tag_for(row.created_at.date_naive());
        if expected == row.academic_year {
            continue;
        }
        let mismatch = YearMismatch {
            admission_id: row.id,
            application_number: row.application_number,
            stored: row.academic_year,
            expected,
        };
        if row.status == AdmissionStatus::Enrolled {
            report.skipped_enrolled.push(mismatch);
        } else {
            report.mismatched.push(mismatch);
        }
    }

    if apply && !report.mismatched.is_empty() {
        let mut tx = db.begin().await?;
        for mismatch in &report.mismatched {
            report.applied += sqlx::query(
                "UPDATE admissions
                 SET academic_year = $2, updated_at = NOW()
                 WHERE id = $1 AND status <> 'enrolled'",
            )
            .bind(mismatch.admission_id)
            .bind(&mismatch.expected)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
        tx.commit().await?;
    }

    Ok(report)
}
