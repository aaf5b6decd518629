use axum::{
    Json,
    extract::{Query, State},
};
use axum_extra::extract::cookie::CookieJar;
use entity::users;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    routes::ensure_query_length,
    session,
    state::AppState,
    store,
};

#[derive(Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: users::Role,
}

impl From<users::Model> for UserView {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            display_name: model.display_name,
            avatar_url: model.avatar_url,
            role: model.role,
        }
    }
}

pub async fn me(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Json<Value>> {
    let principal = session::require_principal(&state.pool, &jar).await?;
    let user = store::find_user(&state.pool, principal.id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    Ok(Json(json!({ "user": UserView::from(user) })))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

const SEARCH_LIMIT: u64 = 20;

pub async fn search(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Value>> {
    session::require_principal(&state.pool, &jar).await?;
    let q = query.q.as_deref().map(str::trim).unwrap_or_default();
    ensure_query_length(q)?;
    let rows = store::search_users(&state.pool, q, SEARCH_LIMIT).await?;
    let views: Vec<UserView> = rows.into_iter().map(UserView::from).collect();
    Ok(Json(json!({ "users": views })))
}
