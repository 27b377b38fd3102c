//! Router configuration for the API.

use axum::{Router, middleware};
use tower_http::catch_panic::CatchPanicLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    auth_middleware, handle_panic, logging_middleware, request_id_middleware, route_not_found,
};
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
///
/// # Routes
/// - `/api/v1/register`, `/api/v1/login` - public
/// - `/api/v1/users/**` - bearer token required
/// - `/health`, `/health/ready` - probes
/// - `/swagger-ui`, `/api-docs/openapi.json` - API documentation
///
/// # Middleware Order
/// Last added runs first:
/// 1. Request ID - generates/propagates request IDs
/// 2. Logging - logs requests with request IDs
/// 3. Panic catcher - turns handler panics into 500 responses
pub fn create_router(state: AppState) -> Router {
    let protected = handlers::users::user_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    let (router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest(
            "/api/v1",
            handlers::auth::auth_routes().merge(protected),
        )
        .merge(handlers::health::health_routes())
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
