//! Session resolution: cookie -> session row -> caller id.

use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use entity::sessions;
use platform_authz::Principal;
use platform_db::DbPool;
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    store,
};

pub const SESSION_COOKIE: &str = "memorial_session";
pub const LOGIN_STATE_COOKIE: &str = "memorial_oidc";

/// Resolve the session cookie to a user id. Read-only: malformed, unknown
/// and expired sessions all resolve to `None`.
pub async fn resolve_session(pool: &DbPool, jar: &CookieJar) -> ApiResult<Option<Uuid>> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let Ok(session_id) = Uuid::parse_str(cookie.value()) else {
        return Ok(None);
    };
    let Some(session) = sessions::Entity::find_by_id(session_id).one(pool).await? else {
        return Ok(None);
    };
    if session.expires_at.with_timezone(&Utc) < Utc::now() {
        return Ok(None);
    }
    Ok(Some(session.user_id))
}

pub async fn require_session(pool: &DbPool, jar: &CookieJar) -> ApiResult<Uuid> {
    resolve_session(pool, jar)
        .await?
        .ok_or(ApiError::Unauthenticated)
}

/// Load the caller's principal for endpoints that need an account but no
/// ownership check. Sessions naming a missing or deleted account are 401.
pub async fn require_principal(pool: &DbPool, jar: &CookieJar) -> ApiResult<Principal> {
    let user_id = require_session(pool, jar).await?;
    let principal = store::load_principal(pool, user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    if principal.is_deleted {
        return Err(ApiError::Unauthenticated);
    }
    Ok(principal)
}
