use anyhow::Context;
use campusdesk_models::AdmissionStatus;
use campusdesk_models::ids::{AdmissionId, StudentId};
use sqlx::{FromRow, PgPool};

/// An `enrolled` admission with no student behind it.
#[derive(Debug, Clone, FromRow)]
pub struct OrphanedAdmission {
    pub admission_id: AdmissionId,
    pub application_number: String,
    pub student_id: Option<StudentId>,
}

/// A student whose admission is not `enrolled`.
#[derive(Debug, Clone, FromRow)]
pub struct StrayStudent {
    pub student_id: StudentId,
    pub admission_id: AdmissionId,
    pub admission_status: AdmissionStatus,
}

/// The admission and student point at different records.
#[derive(Debug, Clone, FromRow)]
pub struct LinkMismatch {
    pub student_id: StudentId,
    pub admission_id: AdmissionId,
    pub admission_student_id: Option<StudentId>,
}

#[derive(Debug, Clone, Default)]
pub struct OrphanReport {
    pub enrolled_without_student: Vec<OrphanedAdmission>,
    pub students_not_enrolled: Vec<StrayStudent>,
    pub mismatched_links: Vec<LinkMismatch>,
}

impl OrphanReport {
    pub fn issue_count(&self) -> usize {
        self.enrolled_without_student.len()
            + self.students_not_enrolled.len()
            + self.mismatched_links.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }
}

/// Read-only scan for broken admission/student links.
pub async fn audit_orphans(db: &PgPool) -> anyhow::Result<OrphanReport> {
    let enrolled_without_student = sqlx::query_as::<_, OrphanedAdmission>(
        "SELECT a.id AS admission_id, a.application_number, a.student_id
         FROM admissions a
         LEFT JOIN students s ON s.id = a.student_id
         WHERE a.status = 'enrolled' AND s.id IS NULL
         ORDER BY a.created_at",
    )
    .fetch_all(db)
    .await
    .context("Failed to scan enrolled admissions")?;

    let students_not_enrolled = sqlx::query_as::<_, StrayStudent>(
        "SELECT s.id AS student_id, s.admission_id, a.status AS admission_status
         FROM students s
         JOIN admissions a ON a.id = s.admission_id
         WHERE a.status <> 'enrolled'
         ORDER BY s.created_at",
    )
    .fetch_all(db)
    .await
    .context("Failed to scan students")?;

    let mismatched_links = sqlx::query_as::<_, LinkMismatch>(
        "SELECT s.id AS student_id, s.admission_id, a.student_id AS admission_student_id
         FROM students s
         JOIN admissions a ON a.id = s.admission_id
         WHERE a.student_id IS DISTINCT FROM s.id
         ORDER BY s.created_at",
    )
    .fetch_all(db)
    .await
    .context("Failed to compare admission and student links")?;

    Ok(OrphanReport {
        enrolled_without_student,
        students_not_enrolled,
        mismatched_links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeder::test_support::{insert_admission, insert_institution};

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_clean_database_reports_nothing(pool: PgPool) {
        let report = audit_orphans(&pool).await.unwrap();
        assert!(report.is_clean());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_detects_enrolled_admission_without_student(pool: PgPool) {
        let institution_id = insert_institution(&pool, "AUD").await;
        let admission_id = insert_admission(&pool, institution_id, "AUD-2026-00001", "enrolled").await;

        let report = audit_orphans(&pool).await.unwrap();
        assert_eq!(report.enrolled_without_student.len(), 1);
        assert_eq!(report.enrolled_without_student[0].admission_id, admission_id);
        assert_eq!(report.issue_count(), 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_detects_student_behind_pending_admission(pool: PgPool) {
        let institution_id = insert_institution(&pool, "AUD").await;
        let admission_id = insert_admission(&pool, institution_id, "AUD-2026-00001", "pending").await;

        sqlx::query(
            "INSERT INTO students (institution_id, admission_id, roll_number, first_name, last_name, date_of_birth, academic_year)
             VALUES ($1, $2, 1, 'Stray', 'Student', '2015-01-01', '2026-2027')",
        )
        .bind(institution_id)
        .bind(admission_id)
        .execute(&pool)
        .await
        .unwrap();

        let report = audit_orphans(&pool).await.unwrap();
        assert_eq!(report.students_not_enrolled.len(), 1);
        assert_eq!(
            report.students_not_enrolled[0].admission_status,
            AdmissionStatus::Pending
        );
        assert_eq!(report.mismatched_links.len(), 1);
        assert!(report.enrolled_without_student.is_empty());
    }
}
