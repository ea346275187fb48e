use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    approve_and_enroll, create_admission, delete_admission, get_admission_by_id, get_admissions,
    get_stats_overview, get_stats_trends, reject_admission, update_admission,
    update_admission_status,
};

/// Staff-gated as a whole in the top-level router; the state-changing
/// review endpoints additionally require an admin.
pub fn init_admissions_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_admission).get(get_admissions))
        .route("/stats/overview", get(get_stats_overview))
        .route("/stats/trends", get(get_stats_trends))
        .route(
            "/{id}",
            get(get_admission_by_id)
                .put(update_admission)
                .delete(delete_admission),
        )
        .route("/{id}/status", put(update_admission_status))
        .route("/{id}/approve-enroll", post(approve_and_enroll))
        .route("/{id}/reject", put(reject_admission))
}
