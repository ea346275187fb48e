//! Fixtures shared by the database-backed service tests.

use campusdesk_auth::Claims;
use campusdesk_models::ids::{ClassId, InstitutionId, OrganizationId};
use campusdesk_models::{CreateAdmissionDto, User, UserRole};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;

pub const ACADEMIC_YEAR: &str = "2026-2027";

pub async fn create_organization(pool: &PgPool) -> OrganizationId {
    let code = format!("ORG{}", &Uuid::new_v4().simple().to_string()[..8]);
    sqlx::query_scalar::<_, OrganizationId>(
        "INSERT INTO organizations (name, code) VALUES ($1, $2) RETURNING id",
    )
    .bind(format!("Organization {code}"))
    .bind(&code)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_institution(pool: &PgPool, code: &str) -> InstitutionId {
    let organization_id = create_organization(pool).await;
    sqlx::query_scalar::<_, InstitutionId>(
        "INSERT INTO institutions (organization_id, name, code) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(organization_id)
    .bind(format!("{code} School"))
    .bind(code)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_class(pool: &PgPool, institution_id: InstitutionId, name: &str) -> ClassId {
    sqlx::query_scalar::<_, ClassId>(
        "INSERT INTO classes (institution_id, name, academic_year) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(institution_id)
    .bind(name)
    .bind(ACADEMIC_YEAR)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// A persisted user wrapped the way the auth extractor would produce it.
/// The stored password hash is a placeholder; these users never log in.
pub async fn auth_user(
    pool: &PgPool,
    role: UserRole,
    institution_id: Option<InstitutionId>,
) -> AuthUser {
    let user = sqlx::query_as::<_, User>(
        r#"INSERT INTO users (first_name, last_name, email, password, role, institution_id)
           VALUES ('Test', 'User', $1, 'not-a-hash', $2, $3)
           RETURNING *"#,
    )
    .bind(format!("{}@example.com", Uuid::new_v4()))
    .bind(role)
    .bind(institution_id)
    .fetch_one(pool)
    .await
    .unwrap();

    AuthUser {
        claims: Claims {
            sub: user.id.to_string(),
            exp: 0,
            iat: 0,
        },
        user,
    }
}

pub fn admission_dto(first_name: &str) -> CreateAdmissionDto {
    CreateAdmissionDto {
        first_name: first_name.to_string(),
        last_name: "Okafor".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(2015, 6, 1).unwrap(),
        gender: None,
        guardian_name: "Ada Okafor".to_string(),
        guardian_phone: "+2348000000000".to_string(),
        guardian_email: None,
        address: None,
        previous_school: None,
        desired_class: Some("Grade 3".to_string()),
        desired_section: None,
        academic_year: Some(ACADEMIC_YEAR.to_string()),
        institution_id: None,
        class_id: None,
    }
}
