use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router, middleware};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::role::{require_admin, require_staff, require_super_admin};
use crate::modules::admissions::router::init_admissions_router;
use crate::modules::auth::router::init_auth_router;
use crate::modules::classes::router::init_classes_router;
use crate::modules::fees::router::init_fees_router;
use crate::modules::institutions::router::init_institutions_router;
use crate::modules::organizations::router::init_organizations_router;
use crate::modules::students::router::init_students_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub fn init_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let api = Router::new()
        .nest("/auth", init_auth_router(&state))
        .nest(
            "/organizations",
            init_organizations_router().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_super_admin,
            )),
        )
        .nest(
            "/institutions",
            init_institutions_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
        )
        .nest(
            "/users",
            init_users_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
        )
        .nest(
            "/classes",
            init_classes_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_staff)),
        )
        .nest(
            "/admissions",
            init_admissions_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_staff)),
        )
        .nest(
            "/students",
            init_students_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_staff)),
        )
        .nest(
            "/fees",
            init_fees_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_staff)),
        );

    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health_check))
        .nest("/api/v1", api);

    if let Some(handle) = metrics_handle {
        router = router.route("/metrics", get(move || std::future::ready(handle.render())));
    } else {
        router = router.route(
            "/metrics",
            get(|| async { (StatusCode::NOT_FOUND, "metrics disabled") }),
        );
    }

    router
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
}
