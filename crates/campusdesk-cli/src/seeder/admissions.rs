//! Admission generation. Enrollment is left to the API so that every
//! seeded student has gone through approve-and-enroll.

use std::collections::{BTreeMap, HashMap};

use campusdesk_config::AcademicYearConfig;
use campusdesk_models::AdmissionStatus;
use campusdesk_models::admissions::format_application_number;
use campusdesk_models::ids::{ClassId, InstitutionId};
use chrono::{Duration, Utc};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use super::models::AdmissionSeed;

const SEED_STATUSES: [AdmissionStatus; 4] = [
    AdmissionStatus::Pending,
    AdmissionStatus::UnderReview,
    AdmissionStatus::Approved,
    AdmissionStatus::Rejected,
];

pub fn generate_admissions(
    targets: &[(InstitutionId, Vec<ClassId>)],
    per_institution: usize,
    spread_days: i64,
    academic: &AcademicYearConfig,
) -> Vec<AdmissionSeed> {
    let now = Utc::now();
    let spread_minutes = spread_days.max(1) * 24 * 60;

    targets
        .par_iter()
        .flat_map(|(institution_id, class_ids)| {
            (0..per_institution)
                .into_par_iter()
                .map(|i| {
                    let created_at = now - Duration::minutes((0..spread_minutes).fake::<i64>());
                    let age_days = (5 * 365..15 * 365).fake::<i64>();
                    let date_of_birth = created_at.date_naive() - Duration::days(age_days);
                    let class_id = if class_ids.is_empty() {
                        None
                    } else {
                        Some(class_ids[i % class_ids.len()])
                    };

                    AdmissionSeed {
                        institution_id: *institution_id,
                        class_id,
                        application_number: String::new(),
                        first_name: FirstName().fake(),
                        last_name: LastName().fake(),
                        date_of_birth,
                        gender: if i % 2 == 0 { "female" } else { "male" },
                        guardian_name: Name().fake(),
                        guardian_phone: PhoneNumber().fake(),
                        status: SEED_STATUSES[i % SEED_STATUSES.len()],
                        academic_year: academic.tag_for(created_at.date_naive()),
                        created_at,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Reserves a block of `count` numbers from the application counter and
/// returns the first one.
async fn reserve_application_numbers(
    tx: &mut Transaction<'_, Postgres>,
    institution_id: InstitutionId,
    academic_year: &str,
    count: i32,
) -> anyhow::Result<i32> {
    let last: i32 = sqlx::query_scalar(
        "INSERT INTO application_counters (institution_id, academic_year, last_value)
         VALUES ($1, $2, $3)
         ON CONFLICT (institution_id, academic_year)
         DO UPDATE SET last_value = application_counters.last_value + EXCLUDED.last_value
         RETURNING last_value",
    )
    .bind(institution_id)
    .bind(academic_year)
    .bind(count)
    .fetch_one(&mut **tx)
    .await?;

    Ok(last - count + 1)
}

/// Numbers the seeds through the counter table and inserts them.
pub async fn insert_admissions(
    db: &PgPool,
    seeds: &mut [AdmissionSeed],
    institution_codes: &HashMap<InstitutionId, String>,
) -> anyhow::Result<usize> {
    let mut tx = db.begin().await?;

    let mut groups: BTreeMap<(InstitutionId, String), Vec<usize>> = BTreeMap::new();
    for (idx, seed) in seeds.iter().enumerate() {
        groups
            .entry((seed.institution_id, seed.academic_year.clone()))
            .or_default()
            .push(idx);
    }

    for ((institution_id, academic_year), indexes) in &groups {
        let code = institution_codes
            .get(institution_id)
            .ok_or_else(|| anyhow::anyhow!("No code for institution {institution_id}"))?;
        let start_year: i32 = academic_year
            .parse::<campusdesk_config::AcademicYear>()?
            .start_year();
        let count = i32::try_from(indexes.len())?;
        let first =
            reserve_application_numbers(&mut tx, *institution_id, academic_year, count).await?;

        for (offset, idx) in (0..).zip(indexes) {
            seeds[*idx].application_number =
                format_application_number(code, start_year, first + offset);
        }
    }

    for chunk in seeds.chunks(500) {
        let mut builder = QueryBuilder::new(
            "INSERT INTO admissions (institution_id, class_id, application_number, first_name, \
             last_name, date_of_birth, gender, guardian_name, guardian_phone, status, \
             rejection_reason, academic_year, created_at, updated_at) ",
        );
        builder.push_values(chunk, |mut row, seed| {
            let reason = (seed.status == AdmissionStatus::Rejected).then_some("Seat limit reached");
            row.push_bind(seed.institution_id)
                .push_bind(seed.class_id)
                .push_bind(&seed.application_number)
                .push_bind(&seed.first_name)
                .push_bind(&seed.last_name)
                .push_bind(seed.date_of_birth)
                .push_bind(seed.gender)
                .push_bind(&seed.guardian_name)
                .push_bind(&seed.guardian_phone)
                .push_bind(seed.status)
                .push_bind(reason)
                .push_bind(&seed.academic_year)
                .push_bind(seed.created_at)
                .push_bind(seed.created_at);
        });
        builder.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(seeds.len())
}

