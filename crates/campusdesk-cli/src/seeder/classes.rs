//! Class generation: grades 1..N with an `A` section each.

use campusdesk_models::ids::{ClassId, InstitutionId};
use rayon::prelude::*;
use sqlx::{PgPool, QueryBuilder};

use super::models::ClassSeed;

pub fn generate_classes(
    institution_ids: &[InstitutionId],
    per_institution: usize,
    academic_year: &str,
) -> Vec<ClassSeed> {
    institution_ids
        .par_iter()
        .flat_map(|institution_id| {
            (1..=per_institution)
                .into_par_iter()
                .map(|grade| ClassSeed {
                    institution_id: *institution_id,
                    name: format!("Grade {grade}"),
                    section: "A".to_string(),
                    academic_year: academic_year.to_string(),
                    capacity: 40,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn insert_classes(
    db: &PgPool,
    seeds: &[ClassSeed],
) -> anyhow::Result<Vec<(ClassId, InstitutionId)>> {
    let mut tx = db.begin().await?;
    let mut rows = Vec::with_capacity(seeds.len());

    for chunk in seeds.chunks(500) {
        let mut builder = QueryBuilder::new(
            "INSERT INTO classes (institution_id, name, section, academic_year, capacity) ",
        );
        builder.push_values(chunk, |mut row, seed| {
            row.push_bind(seed.institution_id)
                .push_bind(&seed.name)
                .push_bind(&seed.section)
                .push_bind(&seed.academic_year)
                .push_bind(seed.capacity);
        });
        builder.push(" ON CONFLICT DO NOTHING RETURNING id, institution_id");
        let chunk_rows: Vec<(ClassId, InstitutionId)> =
            builder.build_query_as().fetch_all(&mut *tx).await?;
        rows.extend(chunk_rows);
    }

    tx.commit().await?;
    Ok(rows)
}
