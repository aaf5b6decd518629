//! Persistence helpers behind the authorization gate: principal/ownership
//! reads, the guarded soft delete, allow-listed updates and search.

use chrono::{NaiveDate, Utc};
use entity::{comments, fallen, memories, memory_additions, users};
use platform_authz::{OwnershipSource, Principal, PrincipalSource, Role};
use platform_db::DbPool;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Func, IntoColumnRef, SimpleExpr},
};
use uuid::Uuid;

pub fn role_from_stored(role: users::Role) -> Role {
    match role {
        users::Role::Superadmin => Role::Superadmin,
        users::Role::Admin => Role::Admin,
        users::Role::Moderator => Role::Moderator,
        users::Role::Owner => Role::Owner,
        users::Role::Editor => Role::Editor,
        users::Role::User => Role::User,
        users::Role::Guest => Role::Guest,
    }
}

pub async fn load_principal(pool: &DbPool, user_id: Uuid) -> Result<Option<Principal>, DbErr> {
    let user = users::Entity::find_by_id(user_id).one(pool).await?;
    Ok(user.map(|user| Principal {
        id: user.id,
        role: role_from_stored(user.role),
        is_deleted: user.is_deleted,
    }))
}

pub async fn find_user(pool: &DbPool, user_id: Uuid) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(user_id).one(pool).await
}

/// Role-lookup side of the gate.
pub struct PrincipalStore<'a>(pub &'a DbPool);

impl PrincipalSource for PrincipalStore<'_> {
    type Error = DbErr;

    async fn principal(&self, id: Uuid) -> Result<Option<Principal>, DbErr> {
        load_principal(self.0, id).await
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ResourceKind {
    Fallen,
    Comment,
    Memory,
    MemoryAddition,
}

/// Ownership-lookup side of the gate. Reads the active set only, so a
/// soft-deleted resource resolves to no owner.
pub struct OwnershipStore<'a> {
    pub pool: &'a DbPool,
    pub kind: ResourceKind,
}

impl OwnershipSource for OwnershipStore<'_> {
    type Error = DbErr;

    async fn owner(&self, resource_id: Uuid) -> Result<Option<Uuid>, DbErr> {
        match self.kind {
            ResourceKind::Fallen => Ok(find_active_fallen(self.pool, resource_id)
                .await?
                .map(|row| row.owner_id)),
            ResourceKind::Comment => Ok(find_active_comment(self.pool, resource_id)
                .await?
                .map(|row| row.author_id)),
            ResourceKind::Memory => Ok(find_active_memory(self.pool, resource_id)
                .await?
                .map(|row| row.author_id)),
            ResourceKind::MemoryAddition => Ok(find_active_addition(self.pool, resource_id)
                .await?
                .map(|row| row.author_id)),
        }
    }
}

pub async fn find_active_fallen(pool: &DbPool, id: Uuid) -> Result<Option<fallen::Model>, DbErr> {
    fallen::Entity::find_by_id(id)
        .filter(fallen::Column::DeletedAt.is_null())
        .one(pool)
        .await
}

pub async fn find_active_comment(
    pool: &DbPool,
    id: Uuid,
) -> Result<Option<comments::Model>, DbErr> {
    comments::Entity::find_by_id(id)
        .filter(comments::Column::DeletedAt.is_null())
        .one(pool)
        .await
}

pub async fn find_active_memory(
    pool: &DbPool,
    id: Uuid,
) -> Result<Option<memories::Model>, DbErr> {
    memories::Entity::find_by_id(id)
        .filter(memories::Column::DeletedAt.is_null())
        .one(pool)
        .await
}

pub async fn find_active_addition(
    pool: &DbPool,
    id: Uuid,
) -> Result<Option<memory_additions::Model>, DbErr> {
    memory_additions::Entity::find_by_id(id)
        .filter(memory_additions::Column::DeletedAt.is_null())
        .one(pool)
        .await
}

/// Structured soft-delete outcome; callers never parse error text.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SoftDelete {
    Deleted,
    NotFound,
}

/// Mark a resource deleted. One atomic guarded update: rows already out of
/// the active set are untouched and report `NotFound`, so a repeated delete
/// stays a 404 at the HTTP layer.
pub async fn soft_delete(
    pool: &DbPool,
    kind: ResourceKind,
    id: Uuid,
    actor: Uuid,
) -> Result<SoftDelete, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let rows = match kind {
        ResourceKind::Fallen => {
            fallen::Entity::update_many()
                .col_expr(fallen::Column::DeletedAt, Expr::value(now))
                .col_expr(fallen::Column::DeletedBy, Expr::value(actor))
                .filter(fallen::Column::Id.eq(id))
                .filter(fallen::Column::DeletedAt.is_null())
                .exec(pool)
                .await?
                .rows_affected
        }
        ResourceKind::Comment => {
            comments::Entity::update_many()
                .col_expr(comments::Column::DeletedAt, Expr::value(now))
                .col_expr(comments::Column::DeletedBy, Expr::value(actor))
                .filter(comments::Column::Id.eq(id))
                .filter(comments::Column::DeletedAt.is_null())
                .exec(pool)
                .await?
                .rows_affected
        }
        ResourceKind::Memory => {
            memories::Entity::update_many()
                .col_expr(memories::Column::DeletedAt, Expr::value(now))
                .col_expr(memories::Column::DeletedBy, Expr::value(actor))
                .filter(memories::Column::Id.eq(id))
                .filter(memories::Column::DeletedAt.is_null())
                .exec(pool)
                .await?
                .rows_affected
        }
        ResourceKind::MemoryAddition => {
            memory_additions::Entity::update_many()
                .col_expr(memory_additions::Column::DeletedAt, Expr::value(now))
                .col_expr(memory_additions::Column::DeletedBy, Expr::value(actor))
                .filter(memory_additions::Column::Id.eq(id))
                .filter(memory_additions::Column::DeletedAt.is_null())
                .exec(pool)
                .await?
                .rows_affected
        }
    };
    Ok(if rows == 0 {
        SoftDelete::NotFound
    } else {
        SoftDelete::Deleted
    })
}

/// Empty or whitespace-only optional text becomes NULL, anything else is
/// stored trimmed.
pub fn blank_to_null(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn lower_like(col: impl IntoColumnRef, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(pattern)
}

fn like_pattern(q: &str) -> String {
    format!("%{}%", q.trim().to_lowercase())
}

pub async fn list_fallen(pool: &DbPool, q: Option<&str>) -> Result<Vec<fallen::Model>, DbErr> {
    let mut select = fallen::Entity::find()
        .filter(fallen::Column::DeletedAt.is_null())
        .order_by_asc(fallen::Column::LastName)
        .order_by_asc(fallen::Column::FirstName);
    if let Some(q) = q {
        let pattern = like_pattern(q);
        select = select.filter(
            Condition::any()
                .add(lower_like((fallen::Entity, fallen::Column::FirstName), &pattern))
                .add(lower_like((fallen::Entity, fallen::Column::LastName), &pattern))
                .add(lower_like((fallen::Entity, fallen::Column::Nickname), &pattern)),
        );
    }
    select.all(pool).await
}

pub async fn list_comments(pool: &DbPool, fallen_id: Uuid) -> Result<Vec<comments::Model>, DbErr> {
    comments::Entity::find()
        .filter(comments::Column::FallenId.eq(fallen_id))
        .filter(comments::Column::DeletedAt.is_null())
        .order_by_asc(comments::Column::CreatedAt)
        .all(pool)
        .await
}

pub async fn list_memories(pool: &DbPool, fallen_id: Uuid) -> Result<Vec<memories::Model>, DbErr> {
    memories::Entity::find()
        .filter(memories::Column::FallenId.eq(fallen_id))
        .filter(memories::Column::DeletedAt.is_null())
        .order_by_asc(memories::Column::CreatedAt)
        .all(pool)
        .await
}

/// Case-insensitive substring search over active accounts.
pub async fn search_users(
    pool: &DbPool,
    q: &str,
    limit: u64,
) -> Result<Vec<users::Model>, DbErr> {
    let pattern = like_pattern(q);
    users::Entity::find()
        .filter(users::Column::IsDeleted.eq(false))
        .filter(
            Condition::any()
                .add(lower_like((users::Entity, users::Column::DisplayName), &pattern))
                .add(lower_like((users::Entity, users::Column::Email), &pattern)),
        )
        .order_by_asc(users::Column::DisplayName)
        .limit(limit)
        .all(pool)
        .await
}

pub struct NewFallen {
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
}

pub async fn insert_fallen(pool: &DbPool, new: NewFallen) -> Result<fallen::Model, DbErr> {
    let now = Utc::now();
    fallen::ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set(new.first_name),
        last_name: Set(new.last_name),
        nickname: Set(new.nickname),
        rank: Set(new.rank),
        unit: Set(new.unit),
        born_on: Set(new.born_on),
        fell_on: Set(new.fell_on),
        birth_place: Set(new.birth_place),
        burial_place: Set(new.burial_place),
        biography: Set(new.biography),
        photo_url: Set(new.photo_url),
        grave_lat: Set(new.grave_lat),
        grave_lon: Set(new.grave_lon),
        owner_id: Set(new.owner_id),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(pool)
    .await
}

/// Allow-listed mutable fields of a fallen record. `None` leaves a field
/// untouched; optional text fields go through [`blank_to_null`].
#[derive(Debug, Default)]
pub struct FallenChanges {
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

pub async fn update_fallen(
    pool: &DbPool,
    existing: fallen::Model,
    changes: FallenChanges,
) -> Result<fallen::Model, DbErr> {
    let mut active: fallen::ActiveModel = existing.into();
    if let Some(value) = changes.first_name {
        active.first_name = Set(value.trim().to_owned());
    }
    if let Some(value) = changes.last_name {
        active.last_name = Set(value.trim().to_owned());
    }
    if let Some(value) = changes.nickname {
        active.nickname = Set(blank_to_null(value));
    }
    if let Some(value) = changes.rank {
        active.rank = Set(blank_to_null(value));
    }
    if let Some(value) = changes.unit {
        active.unit = Set(blank_to_null(value));
    }
    if let Some(value) = changes.born_on {
        active.born_on = Set(Some(value));
    }
    if let Some(value) = changes.fell_on {
        active.fell_on = Set(Some(value));
    }
    if let Some(value) = changes.birth_place {
        active.birth_place = Set(blank_to_null(value));
    }
    if let Some(value) = changes.burial_place {
        active.burial_place = Set(blank_to_null(value));
    }
    if let Some(value) = changes.biography {
        active.biography = Set(blank_to_null(value));
    }
    if let Some(value) = changes.photo_url {
        active.photo_url = Set(blank_to_null(value));
    }
    if let Some(value) = changes.grave_lat {
        active.grave_lat = Set(Some(value));
    }
    if let Some(value) = changes.grave_lon {
        active.grave_lon = Set(Some(value));
    }
    active.updated_at = Set(Utc::now().into());
    active.update(pool).await
}

pub struct NewComment {
    pub fallen_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
}

pub async fn insert_comment(pool: &DbPool, new: NewComment) -> Result<comments::Model, DbErr> {
    let now = Utc::now();
    comments::ActiveModel {
        id: Set(Uuid::new_v4()),
        fallen_id: Set(new.fallen_id),
        author_id: Set(new.author_id),
        body: Set(new.body),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(pool)
    .await
}

pub struct NewMemory {
    pub fallen_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub photo_url: Option<String>,
}

pub async fn insert_memory(pool: &DbPool, new: NewMemory) -> Result<memories::Model, DbErr> {
    let now = Utc::now();
    memories::ActiveModel {
        id: Set(Uuid::new_v4()),
        fallen_id: Set(new.fallen_id),
        author_id: Set(new.author_id),
        title: Set(new.title),
        body: Set(new.body),
        photo_url: Set(new.photo_url),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(pool)
    .await
}

pub struct NewAddition {
    pub memory_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
}

pub async fn insert_addition(
    pool: &DbPool,
    new: NewAddition,
) -> Result<memory_additions::Model, DbErr> {
    let now = Utc::now();
    memory_additions::ActiveModel {
        id: Set(Uuid::new_v4()),
        memory_id: Set(new.memory_id),
        author_id: Set(new.author_id),
        body: Set(new.body),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_become_null() {
        assert_eq!(blank_to_null(String::new()), None);
        assert_eq!(blank_to_null("   ".into()), None);
        assert_eq!(blank_to_null("  Tzvika  ".into()), Some("Tzvika".into()));
    }

    #[test]
    fn like_patterns_are_lowercased_and_wrapped() {
        assert_eq!(like_pattern("  CoHen "), "%cohen%");
    }
}
