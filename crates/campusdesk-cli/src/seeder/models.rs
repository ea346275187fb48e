//! Seed records and sizing.

use campusdesk_models::AdmissionStatus;
use campusdesk_models::ids::{ClassId, InstitutionId, OrganizationId};
use chrono::{DateTime, NaiveDate, Utc};

pub struct OrganizationSeed {
    pub name: String,
    pub code: String,
    pub address: String,
}

pub struct InstitutionSeed {
    pub organization_id: OrganizationId,
    pub name: String,
    pub code: String,
    pub institution_type: &'static str,
    pub address: String,
}

pub struct ClassSeed {
    pub institution_id: InstitutionId,
    pub name: String,
    pub section: String,
    pub academic_year: String,
    pub capacity: i32,
}

pub struct AdmissionSeed {
    pub institution_id: InstitutionId,
    pub class_id: Option<ClassId>,
    pub application_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: &'static str,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub status: AdmissionStatus,
    pub academic_year: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub organizations: usize,
    pub institutions_per_organization: usize,
    pub classes_per_institution: usize,
    pub admissions_per_institution: usize,
    /// Admissions get `created_at` spread over this many past days
    pub spread_days: i64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            organizations: 2,
            institutions_per_organization: 2,
            classes_per_institution: 6,
            admissions_per_institution: 50,
            spread_days: 90,
        }
    }
}

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub organizations: usize,
    pub institutions: usize,
    pub classes: usize,
    pub admissions: usize,
}
