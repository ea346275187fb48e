use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_fee, delete_fee, get_fee_by_id, get_fees, record_payment};

pub fn init_fees_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_fee).get(get_fees))
        .route("/{id}", get(get_fee_by_id).delete(delete_fee))
        .route("/{id}/payments", post(record_payment))
}
