//! Admission domain models, the status state machine, and analytics shapes.
//!
//! An admission moves through a fixed set of states:
//!
//! ```text
//! pending ──► under_review ──► approved ──► enrolled
//!    │              │
//!    └──────────────┴──► rejected
//! ```
//!
//! `enrolled` and `rejected` are terminal. `enrolled` is only reachable via
//! approve-and-enroll, which also creates the student record.

use crate::ids::{AdmissionId, ClassId, InstitutionId, StudentId, UserId};
use crate::students::Student;
use crate::text_enum::{UnknownVariant, impl_text_enum};
use crate::validation::{validate_academic_year, validate_not_blank};
use campusdesk_core::serde::{
    deserialize_optional_bool, deserialize_optional_parsed, deserialize_optional_string,
};
use campusdesk_core::{PaginationMeta, PaginationParams};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_TREND_DAYS: i64 = 30;
pub const MAX_TREND_DAYS: i64 = 366;
pub const DEFAULT_TREND_TIMEZONE: &str = "UTC";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionStatus {
    Pending,
    UnderReview,
    Approved,
    Enrolled,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Invalid status transition from {from} to {to}")]
    Illegal {
        from: AdmissionStatus,
        to: AdmissionStatus,
    },
    #[error("Admissions can only be enrolled through approve-and-enroll")]
    EnrollmentRequiresApproval,
}

impl AdmissionStatus {
    pub const ALL: [AdmissionStatus; 5] = [
        AdmissionStatus::Pending,
        AdmissionStatus::UnderReview,
        AdmissionStatus::Approved,
        AdmissionStatus::Enrolled,
        AdmissionStatus::Rejected,
    ];

    /// States from which approve-and-enroll may start.
    pub const ENROLLABLE: [AdmissionStatus; 2] =
        [AdmissionStatus::UnderReview, AdmissionStatus::Approved];

    pub const fn as_str(&self) -> &'static str {
        match self {
            AdmissionStatus::Pending => "pending",
            AdmissionStatus::UnderReview => "under_review",
            AdmissionStatus::Approved => "approved",
            AdmissionStatus::Enrolled => "enrolled",
            AdmissionStatus::Rejected => "rejected",
        }
    }

    /// Whether `self -> target` is one of the legal edges.
    pub const fn can_transition_to(&self, target: AdmissionStatus) -> bool {
        use AdmissionStatus::*;
        matches!(
            (*self, target),
            (Pending, UnderReview)
                | (Pending, Rejected)
                | (UnderReview, Approved)
                | (UnderReview, Rejected)
                | (Approved, Enrolled)
        )
    }

    /// Validates a transition requested through the plain status update.
    /// `enrolled` is never accepted here, even from `approved`.
    pub fn check_status_update(&self, target: AdmissionStatus) -> Result<(), TransitionError> {
        if target == AdmissionStatus::Enrolled {
            return Err(TransitionError::EnrollmentRequiresApproval);
        }
        if !self.can_transition_to(target) {
            return Err(TransitionError::Illegal {
                from: *self,
                to: target,
            });
        }
        Ok(())
    }

    pub fn check_enrollable(&self) -> Result<(), TransitionError> {
        if Self::ENROLLABLE.contains(self) {
            Ok(())
        } else {
            Err(TransitionError::Illegal {
                from: *self,
                to: AdmissionStatus::Enrolled,
            })
        }
    }
}

impl FromStr for AdmissionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdmissionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "admission status",
                value: s.to_string(),
            })
    }
}

impl_text_enum!(AdmissionStatus);

/// `{CODE}-{START_YEAR}-{NNNNN}`, e.g. `GVS-2026-00042`.
pub fn format_application_number(institution_code: &str, start_year: i32, sequence: i32) -> String {
    format!(
        "{}-{}-{:05}",
        institution_code.trim().to_uppercase(),
        start_year,
        sequence
    )
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Admission {
    pub id: AdmissionId,
    pub institution_id: InstitutionId,
    pub class_id: Option<ClassId>,
    pub application_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Option<String>,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub guardian_email: Option<String>,
    pub address: Option<String>,
    pub previous_school: Option<String>,
    pub desired_class: Option<String>,
    pub desired_section: Option<String>,
    pub status: AdmissionStatus,
    pub rejection_reason: Option<String>,
    pub academic_year: String,
    pub is_active: bool,
    pub student_id: Option<StudentId>,
    pub created_by: Option<UserId>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub enrolled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAdmissionDto {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(max = 16))]
    pub gender: Option<String>,
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub guardian_name: String,
    #[validate(length(min = 5, max = 32))]
    pub guardian_phone: String,
    #[validate(email)]
    pub guardian_email: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 200))]
    pub previous_school: Option<String>,
    #[validate(length(max = 100))]
    pub desired_class: Option<String>,
    #[validate(length(max = 20))]
    pub desired_section: Option<String>,
    /// Defaults to the academic year containing today
    #[validate(custom(function = "validate_academic_year"))]
    pub academic_year: Option<String>,
    /// Required for super admins, ignored for everyone else
    pub institution_id: Option<InstitutionId>,
    pub class_id: Option<ClassId>,
}

/// Edits applicant details. Status and the student link are not editable here.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAdmissionDto {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 16))]
    pub gender: Option<String>,
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub guardian_name: Option<String>,
    #[validate(length(min = 5, max = 32))]
    pub guardian_phone: Option<String>,
    #[validate(email)]
    pub guardian_email: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 200))]
    pub previous_school: Option<String>,
    pub class_id: Option<ClassId>,
    #[validate(length(max = 100))]
    pub desired_class: Option<String>,
    #[validate(length(max = 20))]
    pub desired_section: Option<String>,
    #[validate(custom(function = "validate_academic_year"))]
    pub academic_year: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateAdmissionStatusDto {
    pub status: AdmissionStatus,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ApproveEnrollDto {
    /// Overrides the admission's target class
    pub class_id: Option<ClassId>,
    /// Explicit roll number; allocated from the counter when omitted
    #[validate(range(min = 1))]
    pub roll_number: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RejectAdmissionDto {
    #[validate(length(min = 1, max = 500), custom(function = "validate_not_blank"))]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApproveEnrollResponse {
    pub admission: Admission,
    pub student: Student,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdmissionFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub status: Option<AdmissionStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub class_id: Option<ClassId>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    /// Matches first name, last name or application number
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    /// Super admins only
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub institution_id: Option<InstitutionId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedAdmissionsResponse {
    pub data: Vec<Admission>,
    pub meta: PaginationMeta,
}

/// Counts keyed by status. Every status is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCounts {
    pub pending: i64,
    pub under_review: i64,
    pub approved: i64,
    pub enrolled: i64,
    pub rejected: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: AdmissionStatus, count: i64) {
        let slot = match status {
            AdmissionStatus::Pending => &mut self.pending,
            AdmissionStatus::UnderReview => &mut self.under_review,
            AdmissionStatus::Approved => &mut self.approved,
            AdmissionStatus::Enrolled => &mut self.enrolled,
            AdmissionStatus::Rejected => &mut self.rejected,
        };
        *slot += count;
    }

    pub fn get(&self, status: AdmissionStatus) -> i64 {
        match status {
            AdmissionStatus::Pending => self.pending,
            AdmissionStatus::UnderReview => self.under_review,
            AdmissionStatus::Approved => self.approved,
            AdmissionStatus::Enrolled => self.enrolled,
            AdmissionStatus::Rejected => self.rejected,
        }
    }

    pub fn total(&self) -> i64 {
        AdmissionStatus::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

/// One `(status, count)` group from an aggregate query.
#[derive(Debug, Clone, FromRow)]
pub struct StatusCountRow {
    pub status: AdmissionStatus,
    pub count: i64,
}

impl FromIterator<StatusCountRow> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = StatusCountRow>>(iter: I) -> Self {
        let mut counts = StatusCounts::default();
        for row in iter {
            counts.add(row.status, row.count);
        }
        counts
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsOverviewParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub academic_year: Option<String>,
    /// Super admins only
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub institution_id: Option<InstitutionId>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdmissionStatsOverview {
    pub total: i64,
    pub by_status: StatusCounts,
    pub academic_year: Option<String>,
    pub institution_id: Option<InstitutionId>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendParams {
    /// Window length in days (1-366, default: 30)
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub days: Option<i64>,
    /// IANA time zone used to bucket days (default: UTC)
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub timezone: Option<String>,
    /// Super admins only
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub institution_id: Option<InstitutionId>,
}

impl TrendParams {
    /// The window length, or `None` when it is out of range.
    pub fn days(&self) -> Option<u32> {
        let days = self.days.unwrap_or(DEFAULT_TREND_DAYS);
        if (1..=MAX_TREND_DAYS).contains(&days) {
            u32::try_from(days).ok()
        } else {
            None
        }
    }

    pub fn timezone(&self) -> &str {
        self.timezone.as_deref().unwrap_or(DEFAULT_TREND_TIMEZONE)
    }
}

/// One `(local day, status, count)` group from the trend query.
#[derive(Debug, Clone, FromRow)]
pub struct TrendRow {
    pub day: NaiveDate,
    pub status: AdmissionStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrendDay {
    pub date: NaiveDate,
    pub total: i64,
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdmissionTrends {
    pub timezone: String,
    pub days: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: i64,
    pub series: Vec<TrendDay>,
}

impl AdmissionTrends {
    /// Lays `rows` onto a zero-filled series of `days` consecutive days
    /// ending on `today`. Rows outside the window are dropped so the series
    /// total always equals the sum of the days.
    pub fn build(timezone: &str, today: NaiveDate, days: u32, rows: &[TrendRow]) -> Self {
        let days = days.max(1);
        let start_date = today
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .unwrap_or(NaiveDate::MIN);

        let mut buckets: BTreeMap<NaiveDate, StatusCounts> = start_date
            .iter_days()
            .take_while(|d| *d <= today)
            .map(|d| (d, StatusCounts::default()))
            .collect();

        for row in rows {
            if let Some(counts) = buckets.get_mut(&row.day) {
                counts.add(row.status, row.count);
            }
        }

        let series: Vec<TrendDay> = buckets
            .into_iter()
            .map(|(date, counts)| TrendDay {
                date,
                total: counts.total(),
                counts,
            })
            .collect();

        Self {
            timezone: timezone.to_string(),
            days,
            start_date,
            end_date: today,
            total: series.iter().map(|d| d.total).sum(),
            series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AdmissionStatus::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_legal_edges_only() {
        let legal = [
            (Pending, UnderReview),
            (Pending, Rejected),
            (UnderReview, Approved),
            (UnderReview, Rejected),
            (Approved, Enrolled),
        ];
        for from in AdmissionStatus::ALL {
            for to in AdmissionStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for to in AdmissionStatus::ALL {
            assert!(!Enrolled.can_transition_to(to));
            assert!(!Rejected.can_transition_to(to));
        }
    }

    #[test]
    fn test_status_update_never_enrolls() {
        assert_eq!(
            Pending.check_status_update(Enrolled),
            Err(TransitionError::EnrollmentRequiresApproval)
        );
        assert_eq!(
            Approved.check_status_update(Enrolled),
            Err(TransitionError::EnrollmentRequiresApproval)
        );
        assert!(Pending.check_status_update(UnderReview).is_ok());
        assert_eq!(
            Rejected.check_status_update(Approved),
            Err(TransitionError::Illegal {
                from: Rejected,
                to: Approved
            })
        );
    }

    #[test]
    fn test_enrollable_states() {
        assert!(UnderReview.check_enrollable().is_ok());
        assert!(Approved.check_enrollable().is_ok());
        assert!(Pending.check_enrollable().is_err());
        assert!(Rejected.check_enrollable().is_err());
        assert!(Enrolled.check_enrollable().is_err());
    }

    #[test]
    fn test_status_text_round_trip() {
        for status in AdmissionStatus::ALL {
            assert_eq!(status.as_str().parse::<AdmissionStatus>().unwrap(), status);
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::Value::String(status.as_str().to_string())
            );
        }
    }

    #[test]
    fn test_application_number_format() {
        assert_eq!(format_application_number("gvs", 2026, 42), "GVS-2026-00042");
        assert_eq!(
            format_application_number("ABC", 2027, 123456),
            "ABC-2027-123456"
        );
    }

    #[test]
    fn test_status_counts_collect_and_total() {
        let counts: StatusCounts = vec![
            StatusCountRow { status: Pending, count: 3 },
            StatusCountRow { status: Enrolled, count: 2 },
        ]
        .into_iter()
        .collect();
        assert_eq!(counts.pending, 3);
        assert_eq!(counts.enrolled, 2);
        assert_eq!(counts.rejected, 0);
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn test_trend_params_bounds() {
        assert_eq!(TrendParams::default().days(), Some(30));
        let p = |d| TrendParams {
            days: Some(d),
            ..Default::default()
        };
        assert_eq!(p(1).days(), Some(1));
        assert_eq!(p(366).days(), Some(366));
        assert_eq!(p(0).days(), None);
        assert_eq!(p(367).days(), None);
        assert_eq!(TrendParams::default().timezone(), "UTC");
    }

    #[test]
    fn test_trends_zero_fill_every_day() {
        let trends = AdmissionTrends::build("UTC", date(2026, 3, 10), 7, &[]);
        assert_eq!(trends.series.len(), 7);
        assert_eq!(trends.start_date, date(2026, 3, 4));
        assert_eq!(trends.end_date, date(2026, 3, 10));
        assert!(trends.series.iter().all(|d| d.total == 0));
        assert_eq!(trends.total, 0);
    }

    #[test]
    fn test_trends_sum_matches_total() {
        let rows = vec![
            TrendRow { day: date(2026, 3, 9), status: Pending, count: 2 },
            TrendRow { day: date(2026, 3, 9), status: Enrolled, count: 1 },
            TrendRow { day: date(2026, 3, 10), status: Rejected, count: 4 },
            // Outside the window
            TrendRow { day: date(2026, 2, 1), status: Pending, count: 9 },
        ];
        let trends = AdmissionTrends::build("Asia/Kolkata", date(2026, 3, 10), 3, &rows);

        assert_eq!(trends.series.len(), 3);
        assert_eq!(trends.total, 7);
        assert_eq!(trends.series.iter().map(|d| d.total).sum::<i64>(), 7);

        let ninth = &trends.series[1];
        assert_eq!(ninth.date, date(2026, 3, 9));
        assert_eq!(ninth.counts.pending, 2);
        assert_eq!(ninth.counts.enrolled, 1);
        assert_eq!(ninth.total, 3);
    }

    #[test]
    fn test_trends_window_crosses_month_boundary() {
        let trends = AdmissionTrends::build("UTC", date(2026, 3, 1), 2, &[]);
        assert_eq!(trends.series[0].date, date(2026, 2, 28));
        assert_eq!(trends.series[1].date, date(2026, 3, 1));
    }

    #[test]
    fn test_reject_reason_length() {
        let ok = RejectAdmissionDto { reason: "Incomplete documents".into() };
        assert!(ok.validate().is_ok());
        let blank = RejectAdmissionDto { reason: "   ".into() };
        assert!(blank.validate().is_err());
        let long = RejectAdmissionDto { reason: "x".repeat(501) };
        assert!(long.validate().is_err());
    }
}
