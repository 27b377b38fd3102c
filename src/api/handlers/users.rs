//! User management handlers. All routes require a bearer token.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::USER_TAG;
use crate::api::dto::{ErrorResponse, UpdateUserRequest, UserResponse};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates user-related routes.
///
/// Routes:
/// - GET /users        - List all users
/// - GET /users/{id}   - Get user by ID
/// - PUT /users/{id}   - Replace name and email
/// - DELETE /users/{id} - Delete user
pub fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_users))
        .routes(routes!(get_user, update_user, delete_user))
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = USER_TAG,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.services.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = USER_TAG,
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users.get_user(&id).await?;
    Ok(Json(user.into()))
}

/// Replace a user's name and email
///
/// Unknown IDs are accepted without effect.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = USER_TAG,
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 204, description = "User updated"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<StatusCode> {
    state.services.users.update_user(&id, payload.into()).await?;
    tracing::info!(caller = %caller.user_id, user_id = %id, "User updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a user
///
/// Unknown IDs are accepted without effect.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = USER_TAG,
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.users.delete_user(&id).await?;
    tracing::info!(caller = %caller.user_id, user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
