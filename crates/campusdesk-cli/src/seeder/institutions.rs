//! Organization and institution generation.

use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, StreetName};
use fake::faker::company::en::CompanyName;
use rayon::prelude::*;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use campusdesk_models::ids::{InstitutionId, OrganizationId};

use super::models::{InstitutionSeed, OrganizationSeed};

const BATCH_SIZE: usize = 500;

/// Short unique code like `ORG-3F9A1C`.
fn unique_code(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", suffix[..6].to_uppercase())
}

fn fake_address() -> String {
    let building: String = BuildingNumber().fake();
    let street: String = StreetName().fake();
    let city: String = CityName().fake();
    format!("{building} {street}, {city}")
}

pub fn generate_organizations(count: usize) -> Vec<OrganizationSeed> {
    (0..count)
        .into_par_iter()
        .map(|_| {
            let company: String = CompanyName().fake();
            OrganizationSeed {
                name: format!("{company} Education Trust"),
                code: unique_code("ORG"),
                address: fake_address(),
            }
        })
        .collect()
}

pub fn generate_institutions(
    organization_ids: &[OrganizationId],
    per_organization: usize,
) -> Vec<InstitutionSeed> {
    organization_ids
        .par_iter()
        .flat_map(|organization_id| {
            (0..per_organization)
                .into_par_iter()
                .map(|i| {
                    let city: String = CityName().fake();
                    let (kind, label) = if i % 3 == 2 {
                        ("college", "College")
                    } else {
                        ("school", "Public School")
                    };
                    InstitutionSeed {
                        organization_id: *organization_id,
                        name: format!("{city} {label}"),
                        code: unique_code("I"),
                        institution_type: kind,
                        address: fake_address(),
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn insert_organizations(
    db: &PgPool,
    seeds: &[OrganizationSeed],
) -> anyhow::Result<Vec<OrganizationId>> {
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(seeds.len());

    for chunk in seeds.chunks(BATCH_SIZE) {
        let mut builder = QueryBuilder::new("INSERT INTO organizations (name, code, address) ");
        builder.push_values(chunk, |mut row, seed| {
            row.push_bind(&seed.name)
                .push_bind(&seed.code)
                .push_bind(&seed.address);
        });
        builder.push(" RETURNING id");
        let chunk_ids: Vec<OrganizationId> = builder
            .build_query_scalar()
            .fetch_all(&mut *tx)
            .await?;
        ids.extend(chunk_ids);
    }

    tx.commit().await?;
    Ok(ids)
}

pub async fn insert_institutions(
    db: &PgPool,
    seeds: &[InstitutionSeed],
) -> anyhow::Result<Vec<(InstitutionId, String)>> {
    let mut tx = db.begin().await?;
    let mut rows = Vec::with_capacity(seeds.len());

    for chunk in seeds.chunks(BATCH_SIZE) {
        let mut builder = QueryBuilder::new(
            "INSERT INTO institutions (organization_id, name, code, institution_type, address) ",
        );
        builder.push_values(chunk, |mut row, seed| {
            row.push_bind(seed.organization_id)
                .push_bind(&seed.name)
                .push_bind(&seed.code)
                .push_bind(seed.institution_type)
                .push_bind(&seed.address);
        });
        builder.push(" RETURNING id, code");
        let chunk_rows: Vec<(InstitutionId, String)> =
            builder.build_query_as().fetch_all(&mut *tx).await?;
        rows.extend(chunk_rows);
    }

    tx.commit().await?;
    Ok(rows)
}
