use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_institution, delete_institution, get_institution_by_id, get_institutions,
    update_institution,
};

pub fn init_institutions_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_institution).get(get_institutions))
        .route(
            "/{id}",
            get(get_institution_by_id)
                .put(update_institution)
                .delete(delete_institution),
        )
}
