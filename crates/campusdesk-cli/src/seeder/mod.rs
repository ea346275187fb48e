//! Development data seeding.
//!
//! Records are generated in parallel with rayon and inserted in
//! multi-row batches. Application numbers are drawn from the same counter
//! table the API uses, so seeded and live admissions never collide.

mod admissions;
mod classes;
mod institutions;
pub mod models;

use std::collections::HashMap;
use std::time::Instant;

use campusdesk_config::AcademicYearConfig;
use chrono::Utc;
use sqlx::PgPool;

pub use admissions::{generate_admissions, insert_admissions};
pub use classes::{generate_classes, insert_classes};
pub use institutions::{
    generate_institutions, generate_organizations, insert_institutions, insert_organizations,
};
pub use models::{SeedConfig, SeedSummary};

pub async fn seed_all(
    db: &PgPool,
    config: &SeedConfig,
    academic: &AcademicYearConfig,
) -> anyhow::Result<SeedSummary> {
    let started = Instant::now();
    let current_year = academic.tag_for(Utc::now().date_naive());

    println!("🏢 Seeding {} organizations...", config.organizations);
    let organization_ids = insert_organizations(db, &generate_organizations(config.organizations)).await?;

    println!(
        "🏫 Seeding {} institutions per organization...",
        config.institutions_per_organization
    );
    let institutions = insert_institutions(
        db,
        &generate_institutions(&organization_ids, config.institutions_per_organization),
    )
    .await?;
    let institution_ids: Vec<_> = institutions.iter().map(|(id, _)| *id).collect();
    let codes: HashMap<_, _> = institutions.into_iter().collect();

    println!(
        "📚 Seeding {} classes per institution for {current_year}...",
        config.classes_per_institution
    );
    let classes = insert_classes(
        db,
        &generate_classes(&institution_ids, config.classes_per_institution, &current_year),
    )
    .await?;

    let mut by_institution: HashMap<_, Vec<_>> = HashMap::new();
    for (class_id, institution_id) in &classes {
        by_institution.entry(*institution_id).or_default().push(*class_id);
    }
    let targets: Vec<_> = institution_ids
        .iter()
        .map(|id| (*id, by_institution.remove(id).unwrap_or_default()))
        .collect();

    println!(
        "📝 Seeding {} admissions per institution...",
        config.admissions_per_institution
    );
    let mut admissions = generate_admissions(
        &targets,
        config.admissions_per_institution,
        config.spread_days,
        academic,
    );
    let admission_count = insert_admissions(db, &mut admissions, &codes).await?;

    println!("   ✓ Done in {:?}", started.elapsed());

    Ok(SeedSummary {
        organizations: organization_ids.len(),
        institutions: institution_ids.len(),
        classes: classes.len(),
        admissions: admission_count,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use campusdesk_models::ids::{AdmissionId, InstitutionId};
    use sqlx::PgPool;

    pub async fn insert_institution(pool: &PgPool, code: &str) -> InstitutionId {
        let org_id: uuid::Uuid = sqlx::query_scalar(
            "INSERT INTO organizations (name, code) VALUES ($1, $2) RETURNING id",
        )
        .bind(format!("{code} Trust"))
        .bind(format!("ORG-{code}"))
        .fetch_one(pool)
        .await
        .unwrap();

        sqlx::query_scalar(
            "INSERT INTO institutions (organization_id, name, code) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(org_id)
        .bind(format!("{code} School"))
        .bind(code)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    pub async fn insert_admission(
        pool: &PgPool,
        institution_id: InstitutionId,
        application_number: &str,
        status: &str,
    ) -> AdmissionId {
        sqlx::query_scalar(
            "INSERT INTO admissions (institution_id, application_number, first_name, last_name,
                date_of_birth, guardian_name, guardian_phone, status, academic_year)
             VALUES ($1, $2, 'Test', 'Applicant', '2015-06-01', 'Guardian', '5550100', $3, '2026-2027')
             RETURNING id",
        )
        .bind(institution_id)
        .bind(application_number)
        .bind(status)
        .fetch_one(pool)
        .await
        .unwrap()
    }
}
