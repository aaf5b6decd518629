use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    routes::{gated_soft_delete, required_text},
    session,
    state::AppState,
    store::{self, NewComment, ResourceKind},
};

pub async fn list(
    State(state): State<AppState>,
    Path(fallen_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    store::find_active_fallen(&state.pool, fallen_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let rows = store::list_comments(&state.pool, fallen_id).await?;
    Ok(Json(json!({ "comments": rows })))
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub body: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Path(fallen_id): Path<Uuid>,
    jar: CookieJar,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<Json<Value>> {
    let principal = session::require_principal(&state.pool, &jar).await?;
    let body = required_text(request.body, "body")?;
    store::find_active_fallen(&state.pool, fallen_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let row = store::insert_comment(
        &state.pool,
        NewComment {
            fallen_id,
            author_id: principal.id,
            body,
        },
    )
    .await?;
    Ok(Json(json!({ "success": true, "comment": row })))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
) -> ApiResult<Json<Value>> {
    gated_soft_delete(&state, &jar, ResourceKind::Comment, id).await
}
