//! Prometheus metrics.
//!
//! HTTP traffic is recorded by [`metrics_middleware`]. Admission lifecycle
//! events have their own counters so that funnel conversion can be graphed
//! without querying the database.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use campusdesk_models::{AdmissionStatus, UserRole};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// `OBSERVABILITY_ENABLED`, default true.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the global recorder. Returns `None` when observability is off.
pub fn init_metrics() -> anyhow::Result<Option<PrometheusHandle>> {
    if !is_observability_enabled() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        )?
        .install_recorder()?;

    let upkeep = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep.run_upkeep();
        }
    });

    Ok(Some(handle))
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    gauge!("http_requests_active").increment(1.0);
    let response = next.run(req).await;
    gauge!("http_requests_active").decrement(1.0);

    let status = response.status().as_u16().to_string();
    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}

pub fn track_login_success(role: UserRole) {
    if !is_observability_enabled() {
        return;
    }
    counter!("user_logins_total", "role" => role.as_str(), "status" => "success").increment(1);
}

pub fn track_login_failure(reason: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("user_logins_total", "status" => "failure", "reason" => reason).increment(1);
}

pub fn track_admission_created() {
    if !is_observability_enabled() {
        return;
    }
    counter!("admissions_created_total").increment(1);
}

pub fn track_admission_transition(from: AdmissionStatus, to: AdmissionStatus) {
    if !is_observability_enabled() {
        return;
    }
    counter!("admission_transitions_total", "from" => from.as_str(), "to" => to.as_str())
        .increment(1);
}

/// A failed approve-and-enroll, labelled by why it failed.
pub fn track_enrollment_failure(reason: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("admission_enrollment_failures_total", "reason" => reason).increment(1);
}

pub fn track_admission_deleted() {
    if !is_observability_enabled() {
        return;
    }
    counter!("admissions_deleted_total").increment(1);
}

pub fn track_fee_payment(amount: i64) {
    if !is_observability_enabled() {
        return;
    }
    counter!("fee_payments_total").increment(1);
    counter!("fee_payments_amount_total").increment(u64::try_from(amount).unwrap_or(0));
}
