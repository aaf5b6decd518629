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
    store::{self, NewAddition, NewMemory, ResourceKind},
};

pub async fn list(
    State(state): State<AppState>,
    Path(fallen_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    store::find_active_fallen(&state.pool, fallen_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let rows = store::list_memories(&state.pool, fallen_id).await?;
    Ok(Json(json!({ "memories": rows })))
}

#[derive(Deserialize)]
pub struct CreateMemoryRequest {
    pub fallen_id: Option<Uuid>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub photo_url: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<CreateMemoryRequest>,
) -> ApiResult<Json<Value>> {
    let principal = session::require_principal(&state.pool, &jar).await?;
    let fallen_id = request
        .fallen_id
        .ok_or_else(|| ApiError::invalid("fallen_id is required"))?;
    let title = required_text(request.title, "title")?;
    let body = required_text(request.body, "body")?;
    store::find_active_fallen(&state.pool, fallen_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let row = store::insert_memory(
        &state.pool,
        NewMemory {
            fallen_id,
            author_id: principal.id,
            title,
            body,
            photo_url: request.photo_url.and_then(store::blank_to_null),
        },
    )
    .await?;
    Ok(Json(json!({ "success": true, "memory": row })))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
) -> ApiResult<Json<Value>> {
    gated_soft_delete(&state, &jar, ResourceKind::Memory, id).await
}

#[derive(Deserialize)]
pub struct CreateAdditionRequest {
    pub body: Option<String>,
}

pub async fn create_addition(
    State(state): State<AppState>,
    Path(memory_id): Path<Uuid>,
    jar: CookieJar,
    Json(request): Json<CreateAdditionRequest>,
) -> ApiResult<Json<Value>> {
    let principal = session::require_principal(&state.pool, &jar).await?;
    let body = required_text(request.body, "body")?;
    store::find_active_memory(&state.pool, memory_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let row = store::insert_addition(
        &state.pool,
        NewAddition {
            memory_id,
            author_id: principal.id,
            body,
        },
    )
    .await?;
    Ok(Json(json!({ "success": true, "addition": row })))
}

pub async fn remove_addition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
) -> ApiResult<Json<Value>> {
    gated_soft_delete(&state, &jar, ResourceKind::MemoryAddition, id).await
}
