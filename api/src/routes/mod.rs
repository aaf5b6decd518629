pub mod auth;
pub mod comments;
pub mod fallen;
pub mod memories;
pub mod users;

use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use platform_authz::PRIVILEGED_ROLES;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, ensure_allowed},
    session,
    state::AppState,
    store::{self, OwnershipStore, PrincipalStore, ResourceKind, SoftDelete},
};

/// Search terms must be at least two characters once trimmed.
pub(crate) fn ensure_query_length(q: &str) -> Result<(), ApiError> {
    if q.chars().count() < 2 {
        return Err(ApiError::invalid("search query must be at least 2 characters"));
    }
    Ok(())
}

pub(crate) fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(ApiError::invalid(format!("{field} is required")))
            } else {
                Ok(trimmed.to_owned())
            }
        }
        None => Err(ApiError::invalid(format!("{field} is required"))),
    }
}

/// The delete gate every resource shares: resolve the session, run the
/// ownership-or-role check with both lookups in flight at once, then issue
/// the guarded soft delete. A resource already out of the active set is a
/// 404 at both the gate and the dispatch step.
pub(crate) async fn gated_soft_delete(
    state: &AppState,
    jar: &CookieJar,
    kind: ResourceKind,
    id: Uuid,
) -> ApiResult<Json<Value>> {
    let actor = session::require_session(&state.pool, jar).await?;
    let decision = platform_authz::authorize(
        &PrincipalStore(&state.pool),
        &OwnershipStore {
            pool: &state.pool,
            kind,
        },
        Some(actor),
        id,
        PRIVILEGED_ROLES,
    )
    .await?;
    ensure_allowed(decision)?;
    match store::soft_delete(&state.pool, kind, id, actor).await? {
        SoftDelete::Deleted => Ok(Json(json!({ "success": true }))),
        SoftDelete::NotFound => Err(ApiError::NotFound),
    }
}
