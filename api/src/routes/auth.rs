//! Login round-trip against the configured OIDC providers, plus logout.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use entity::sessions;
use openidconnect::AuthorizationCode;
use platform_authn::TempLoginState;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::Deserialize;
use time::Duration as CookieTtl;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    session::{LOGIN_STATE_COOKIE, SESSION_COOKIE},
    state::AppState,
};

#[derive(Deserialize)]
pub struct LoginQuery {
    pub provider: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> ApiResult<(CookieJar, Redirect)> {
    let provider = state
        .auth
        .get(&query.provider)
        .ok_or(ApiError::NotFound)?;
    let (auth_url, login_state) = provider.authorize();
    let encoded = URL_SAFE_NO_PAD.encode(
        serde_json::to_vec(&login_state).map_err(ApiError::internal)?,
    );
    let cookie = Cookie::build((LOGIN_STATE_COOKIE, encoded))
        .path("/")
        .http_only(true)
        .secure(state.config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(CookieTtl::minutes(10))
        .build();
    Ok((jar.add(cookie), Redirect::to(&auth_url)))
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: String,
}

pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(provider_id): Path<String>,
    Query(params): Query<CallbackQuery>,
) -> ApiResult<(CookieJar, Redirect)> {
    let provider = state
        .auth
        .get(&provider_id)
        .ok_or(ApiError::NotFound)?;
    let Some(cookie) = jar.get(LOGIN_STATE_COOKIE) else {
        return Err(ApiError::invalid("missing login state"));
    };
    let decoded = URL_SAFE_NO_PAD
        .decode(cookie.value())
        .map_err(|_| ApiError::invalid("invalid login state"))?;
    let saved: TempLoginState = serde_json::from_slice(&decoded)
        .map_err(|_| ApiError::invalid("invalid login state"))?;
    let jar = jar.remove(Cookie::build((LOGIN_STATE_COOKIE, "")).path("/").build());
    if saved.csrf != params.state {
        return Err(ApiError::invalid("state mismatch"));
    }
    if saved.provider != provider.id {
        return Err(ApiError::invalid("provider mismatch"));
    }

    let user_info = provider
        .exchange(
            AuthorizationCode::new(params.code.clone()),
            saved.verifier(),
            saved.nonce(),
        )
        .await
        .map_err(ApiError::internal)?;
    let user = platform_db::upsert_user(
        &state.pool,
        &user_info.email,
        user_info.name,
        user_info.avatar_url,
    )
    .await?;
    if user.is_deleted {
        return Err(ApiError::Forbidden);
    }

    let session_id = Uuid::new_v4();
    let now = Utc::now();
    let expires_at = now + Duration::days(state.config.session_ttl_days);
    sessions::ActiveModel {
        id: Set(session_id),
        user_id: Set(user.id),
        created_at: Set(now.into()),
        expires_at: Set(expires_at.into()),
        ip: Set(None),
        user_agent: Set(None),
    }
    .insert(&state.pool)
    .await?;

    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .secure(state.config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(CookieTtl::days(state.config.session_ttl_days))
        .build();
    Ok((
        jar.add(cookie),
        Redirect::to(&state.config.post_login_redirect),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, StatusCode)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(session_id) = Uuid::parse_str(cookie.value()) {
            let _ = sessions::Entity::delete_by_id(session_id)
                .exec(&state.pool)
                .await;
        }
    }
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    Ok((jar, StatusCode::NO_CONTENT))
}
