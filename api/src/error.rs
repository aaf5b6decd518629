use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use platform_authz::AccessDecision;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Request-level error taxonomy. Internal failures are logged with their
/// detail and surface to the caller as an opaque 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("insufficient permissions")]
    Forbidden,
    #[error("resource not found")]
    NotFound,
    #[error("{0}")]
    InvalidInput(String),
    #[error("internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "UNAUTHENTICATED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(source) = &self {
            error!(error = ?source, "request failed");
        }
        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));
        (self.status(), body).into_response()
    }
}

/// Map a gate decision onto the error taxonomy. Sessions that resolve to a
/// missing or deleted account are treated as unauthenticated, not as a
/// distinct caller-visible state.
pub fn ensure_allowed(decision: AccessDecision) -> Result<(), ApiError> {
    match decision {
        AccessDecision::Allowed => Ok(()),
        AccessDecision::NotAuthenticated
        | AccessDecision::UserNotFound
        | AccessDecision::UserDeleted => Err(ApiError::Unauthenticated),
        AccessDecision::ResourceNotFound => Err(ApiError::NotFound),
        AccessDecision::InsufficientPermissions => Err(ApiError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_are_masked() {
        let err = ApiError::internal(anyhow::anyhow!("connection refused to db:5432"));
        assert_eq!(err.to_string(), "internal server error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::invalid("missing field").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn decisions_map_to_statuses() {
        assert!(ensure_allowed(AccessDecision::Allowed).is_ok());
        let cases = [
            (AccessDecision::NotAuthenticated, StatusCode::UNAUTHORIZED),
            (AccessDecision::UserNotFound, StatusCode::UNAUTHORIZED),
            (AccessDecision::UserDeleted, StatusCode::UNAUTHORIZED),
            (AccessDecision::ResourceNotFound, StatusCode::NOT_FOUND),
            (
                AccessDecision::InsufficientPermissions,
                StatusCode::FORBIDDEN,
            ),
        ];
        for (decision, status) in cases {
            let err = ensure_allowed(decision).unwrap_err();
            assert_eq!(err.status(), status, "{decision:?}");
        }
    }
}
