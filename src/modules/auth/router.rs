use axum::{
    Router,
    routing::{get, post},
};
use tower_governor::GovernorLayer;

use crate::state::AppState;

use super::controller::{get_current_user, login_user};

/// `/login` is rate limited per client IP when limiting is enabled.
pub fn init_auth_router(state: &AppState) -> Router<AppState> {
    let login = Router::new().route("/login", post(login_user));
    let login = match state.rate_limit_config.auth_governor_config() {
        Some(config) => login.layer(GovernorLayer::new(config)),
        None => login,
    };

    Router::new()
        .merge(login)
        .route("/me", get(get_current_user))
}
