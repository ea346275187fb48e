//! Student fees. Amounts are integer minor currency units (e.g. paise, cents).

use crate::ids::{FeeId, InstitutionId, StudentId};
use crate::text_enum::{UnknownVariant, impl_text_enum};
use crate::validation::{validate_academic_year, validate_not_blank};
use campusdesk_core::serde::{deserialize_optional_parsed, deserialize_optional_string};
use campusdesk_core::{PaginationMeta, PaginationParams};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeeStatus {
    Pending,
    Partial,
    Paid,
}

impl FeeStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FeeStatus::Pending => "pending",
            FeeStatus::Partial => "partial",
            FeeStatus::Paid => "paid",
        }
    }

    /// Status implied by how much of `amount` has been paid.
    pub fn derive(amount: i64, amount_paid: i64) -> Self {
        if amount_paid <= 0 {
            FeeStatus::Pending
        } else if amount_paid >= amount {
            FeeStatus::Paid
        } else {
            FeeStatus::Partial
        }
    }
}

impl FromStr for FeeStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FeeStatus::Pending),
            "partial" => Ok(FeeStatus::Partial),
            "paid" => Ok(FeeStatus::Paid),
            other => Err(UnknownVariant {
                kind: "fee status",
                value: other.to_string(),
            }),
        }
    }
}

impl_text_enum!(FeeStatus);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Payment amount must be positive")]
    NonPositive,
    #[error("Payment of {payment} exceeds the outstanding balance of {outstanding}")]
    Overpayment { payment: i64, outstanding: i64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StudentFee {
    pub id: FeeId,
    pub student_id: StudentId,
    pub institution_id: InstitutionId,
    pub academic_year: String,
    pub fee_type: String,
    pub amount: i64,
    pub amount_paid: i64,
    pub due_date: Option<NaiveDate>,
    pub status: FeeStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl StudentFee {
    pub fn outstanding(&self) -> i64 {
        self.amount - self.amount_paid
    }

    /// The new `(amount_paid, status)` after applying `payment`.
    pub fn apply_payment(&self, payment: i64) -> Result<(i64, FeeStatus), PaymentError> {
        if payment <= 0 {
            return Err(PaymentError::NonPositive);
        }
        let outstanding = self.outstanding();
        if payment > outstanding {
            return Err(PaymentError::Overpayment {
                payment,
                outstanding,
            });
        }
        let paid = self.amount_paid + payment;
        Ok((paid, FeeStatus::derive(self.amount, paid)))
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFeeDto {
    pub student_id: StudentId,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub fee_type: String,
    #[validate(range(min = 1))]
    pub amount: i64,
    pub due_date: Option<NaiveDate>,
    /// Defaults to the student's academic year
    #[validate(custom(function = "validate_academic_year"))]
    pub academic_year: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecordPaymentDto {
    #[validate(range(min = 1))]
    pub amount: i64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeeFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub student_id: Option<StudentId>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub status: Option<FeeStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub institution_id: Option<InstitutionId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedFeesResponse {
    pub data: Vec<StudentFee>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fee(amount: i64, amount_paid: i64) -> StudentFee {
        StudentFee {
            id: FeeId::new(),
            student_id: StudentId::new(),
            institution_id: InstitutionId::new(),
            academic_year: "2026-2027".into(),
            fee_type: "Tuition".into(),
            amount,
            amount_paid,
            due_date: None,
            status: FeeStatus::derive(amount, amount_paid),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_status_derivation() {
        assert_eq!(FeeStatus::derive(1000, 0), FeeStatus::Pending);
        assert_eq!(FeeStatus::derive(1000, 1), FeeStatus::Partial);
        assert_eq!(FeeStatus::derive(1000, 1000), FeeStatus::Paid);
    }

    #[test]
    fn test_partial_then_full_payment() {
        let f = fee(50_000, 0);
        assert_eq!(f.apply_payment(20_000), Ok((20_000, FeeStatus::Partial)));

        let f = fee(50_000, 20_000);
        assert_eq!(f.apply_payment(30_000), Ok((50_000, FeeStatus::Paid)));
    }

    #[test]
    fn test_overpayment_is_rejected() {
        let f = fee(50_000, 40_000);
        assert_eq!(
            f.apply_payment(10_001),
            Err(PaymentError::Overpayment {
                payment: 10_001,
                outstanding: 10_000
            })
        );
        assert_eq!(f.apply_payment(0), Err(PaymentError::NonPositive));
    }
}
