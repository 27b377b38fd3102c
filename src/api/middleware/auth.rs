//! Bearer token authentication middleware.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Identity of the caller, inserted into request extensions after a
/// successful token check. Extract with `Extension<AuthUser>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Token subject
    pub user_id: String,
}

/// Rejects the request with 401 unless it carries
/// `Authorization: Bearer <token>` signed with the configured secret.
///
/// # Example
/// ```ignore
/// Router::new()
///     .route("/protected", get(handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
/// ```
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized {
            message: "Missing authorization header".to_string(),
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized {
            message: "Invalid authorization header format. Expected: Bearer <token>".to_string(),
        })?;

    let claims = state.tokens.verify_token(token)?;
    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    use crate::repositories::Repositories;

    const SECRET: &str = "test_secret_key_at_least_32_characters_long";

    fn app(state: AppState) -> Router {
        Router::new()
            .route(
                "/me",
                get(|Extension(user): Extension<AuthUser>| async move { user.user_id }),
            )
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    async fn call(state: AppState, authorization: Option<&str>) -> Response {
        let mut request = Request::get("/me");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        app(state)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let state = AppState::new(Repositories::in_memory(), SECRET);
        let token = state.tokens.generate_token("user-7").unwrap();

        let response = call(state, Some(&format!("Bearer {}", token))).await;
        assert_eq!(response.status(), 200);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"user-7");
    }

    #[tokio::test]
    async fn test_rejections_are_unauthorized() {
        let state = AppState::new(Repositories::in_memory(), SECRET);
        let token = state.tokens.generate_token("user-7").unwrap();
        let foreign = AppState::new(
            Repositories::in_memory(),
            "another_secret_key_that_is_long_enough",
        )
        .tokens
        .generate_token("user-7")
        .unwrap();

        for header_value in [
            None,
            Some(token.clone()),
            Some(format!("Basic {}", token)),
            Some("Bearer ".to_string()),
            Some(format!("Bearer {}", foreign)),
        ] {
            let response = call(state.clone(), header_value.as_deref()).await;
            assert_eq!(response.status(), 401, "header {:?}", header_value);
        }
    }
}
