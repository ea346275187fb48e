use anyhow::Context;
use sqlx::PgPool;

/// Tables carrying `created_at` / `updated_at`.
pub const TIMESTAMPED_TABLES: [&str; 7] = [
    "organizations",
    "institutions",
    "users",
    "classes",
    "admissions",
    "students",
    "student_fees",
];

#[derive(Debug, Clone, Default)]
pub struct TimestampReport {
    /// `(table, rows with updated_at < created_at)`, only non-zero entries
    pub stale: Vec<(&'static str, i64)>,
    pub applied: u64,
}

impl TimestampReport {
    pub fn total_stale(&self) -> i64 {
        self.stale.iter().map(|(_, n)| n).sum()
    }
}

/// Finds rows whose `updated_at` precedes `created_at` and, with `apply`,
/// sets `updated_at = created_at`.
pub async fn fix_timestamps(db: &PgPool, apply: bool) -> anyhow::Result<TimestampReport> {
    let mut report = TimestampReport::default();

    for table in TIMESTAMPED_TABLES {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {table} WHERE updated_at < created_at"
        ))
        .fetch_one(db)
        .await
        .with_context(|| format!("Failed to scan {table}"))?;

        if count > 0 {
            report.stale.push((table, count));
        }
    }

    if apply && !report.stale.is_empty() {
        let mut tx = db.begin().await?;
        for (table, _) in &report.stale {
            report.applied += sqlx::query(&format!(
                "UPDATE {table} SET updated_at = created_at WHERE updated_at < created_at"
            ))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to repair {table}"))?
            .rows_affected();
        }
        tx.commit().await?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeder::test_support::insert_institution;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_repairs_only_with_apply(pool: PgPool) {
        let institution_id = insert_institution(&pool, "TS").await;
        sqlx::query("UPDATE institutions SET updated_at = created_at - INTERVAL '1 day' WHERE id = $1")
            .bind(institution_id)
            .execute(&pool)
            .await
            .unwrap();

        let dry = fix_timestamps(&pool, false).await.unwrap();
        assert_eq!(dry.stale, vec![("institutions", 1)]);
        assert_eq!(dry.applied, 0);

        let applied = fix_timestamps(&pool, true).await.unwrap();
        assert_eq!(applied.applied, 1);

        let after = fix_timestamps(&pool, false).await.unwrap();
        assert_eq!(after.total_stale(), 0);
    }
}
