use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::NaiveDate;
use entity::fallen;
use platform_authz::PRIVILEGED_ROLES;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, ensure_allowed},
    routes::{ensure_query_length, gated_soft_delete, required_text},
    session,
    state::AppState,
    store::{self, FallenChanges, NewFallen, OwnershipStore, PrincipalStore, ResourceKind},
};

#[derive(Serialize)]
pub struct FallenView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: Option<String>,
    pub rank: Option<String>,
    pub unit: Option<String>,
    pub born_on: Option<NaiveDate>,
    pub fell_on: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub burial_place: Option<String>,
    pub biography: Option<String>,
    pub photo_url: Option<String>,
    pub grave_lat: Option<f64>,
    pub grave_lon: Option<f64>,
    pub owner_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<fallen::Model> for FallenView {
    fn from(model: fallen::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            nickname: model.nickname,
            rank: model.rank,
            unit: model.unit,
            born_on: model.born_on,
            fell_on: model.fell_on,
            birth_place: model.birth_place,
            burial_place: model.burial_place,
            biography: model.biography,
            photo_url: model.photo_url,
            grave_lat: model.grave_lat,
            grave_lon: model.grave_lon,
            owner_id: model.owner_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let q = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => {
            ensure_query_length(q)?;
            Some(q.to_owned())
        }
        _ => None,
    };
    let rows = store::list_fallen(&state.pool, q.as_deref()).await?;
    let views: Vec<FallenView> = rows.into_iter().map(FallenView::from).collect();
    Ok(Json(json!({ "fallen": views })))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let row = store::find_active_fallen(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "fallen": FallenView::from(row) })))
}

#[derive(Deserialize)]
pub struct CreateFallenRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub rank: Option<String>,
    pub unit: Option<String>,
    pub born_on: Option<NaiveDate>,
    pub fell_on: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub burial_place: Option<String>,
    pub biography: Option<String>,
    pub photo_url: Option<String>,
    pub grave_lat: Option<f64>,
    pub grave_lon: Option<f64>,
}

pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CreateFallenRequest>,
) -> ApiResult<Json<Value>> {
    let principal = session::require_principal(&state.pool, &jar).await?;
    let first_name = required_text(body.first_name, "first_name")?;
    let last_name = required_text(body.last_name, "last_name")?;
    let row = store::insert_fallen(
        &state.pool,
        NewFallen {
            first_name,
            last_name,
            nickname: body.nickname.and_then(store::blank_to_null),
            rank: body.rank.and_then(store::blank_to_null),
            unit: body.unit.and_then(store::blank_to_null),
            born_on: body.born_on,
            fell_on: body.fell_on,
            birth_place: body.birth_place.and_then(store::blank_to_null),
            burial_place: body.burial_place.and_then(store::blank_to_null),
            biography: body.biography.and_then(store::blank_to_null),
            photo_url: body.photo_url.and_then(store::blank_to_null),
            grave_lat: body.grave_lat,
            grave_lon: body.grave_lon,
            owner_id: principal.id,
        },
    )
    .await?;
    Ok(Json(json!({ "success": true, "fallen": FallenView::from(row) })))
}

#[derive(Deserialize)]
pub struct UpdateFallenRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub rank: Option<String>,
    pub unit: Option<String>,
    pub born_on: Option<NaiveDate>,
    pub fell_on: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub burial_place: Option<String>,
    pub biography: Option<String>,
    pub photo_url: Option<String>,
    pub grave_lat: Option<f64>,
    pub grave_lon: Option<f64>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
    Json(body): Json<UpdateFallenRequest>,
) -> ApiResult<Json<Value>> {
    let actor = session::require_session(&state.pool, &jar).await?;
    let decision = platform_authz::authorize(
        &PrincipalStore(&state.pool),
        &OwnershipStore {
            pool: &state.pool,
            kind: ResourceKind::Fallen,
        },
        Some(actor),
        id,
        PRIVILEGED_ROLES,
    )
    .await?;
    ensure_allowed(decision)?;

    // Required names may be retyped but never blanked out.
    if matches!(body.first_name.as_deref(), Some(v) if v.trim().is_empty()) {
        return Err(ApiError::invalid("first_name cannot be empty"));
    }
    if matches!(body.last_name.as_deref(), Some(v) if v.trim().is_empty()) {
        return Err(ApiError::invalid("last_name cannot be empty"));
    }

    let existing = store::find_active_fallen(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let updated = store::update_fallen(
        &state.pool,
        existing,
        FallenChanges {
            first_name: body.first_name,
            last_name: body.last_name,
            nickname: body.nickname,
            rank: body.rank,
            unit: body.unit,
            born_on: body.born_on,
            fell_on: body.fell_on,
            birth_place: body.birth_place,
            burial_place: body.burial_place,
            biography: body.biography,
            photo_url: body.photo_url,
            grave_lat: body.grave_lat,
            grave_lon: body.grave_lon,
        },
    )
    .await?;
    Ok(Json(json!({ "success": true, "fallen": FallenView::from(updated) })))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
) -> ApiResult<Json<Value>> {
    gated_soft_delete(&state, &jar, ResourceKind::Fallen, id).await
}
