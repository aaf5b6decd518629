//! Database connection settings and account bootstrap helpers.

use std::time::Duration;

use chrono::Utc;
use entity::users;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Shared async connection pool alias.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL missing")]
    MissingUrl,
    #[error(transparent)]
    Connect(#[from] DbErr),
}

/// Environment-driven pool settings.
#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    url: Option<String>,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl DatabaseSettings {
    pub fn from_env() -> Self {
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(10);
        let acquire_timeout_secs = std::env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(5);
        Self {
            url: std::env::var("DATABASE_URL").ok(),
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    pub fn database_url(&self) -> Result<&str, DbError> {
        self.url.as_deref().ok_or(DbError::MissingUrl)
    }
}

pub async fn connect(settings: &DatabaseSettings) -> Result<DbPool, DbError> {
    let mut options = ConnectOptions::new(settings.database_url()?.to_owned());
    options
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .sqlx_logging(false);
    Ok(Database::connect(options).await?)
}

/// Create or refresh the user record for an authenticated identity.
///
/// The very first account is bootstrapped as superadmin; everyone after that
/// starts as a plain user.
pub async fn upsert_user(
    pool: &DbPool,
    email: &str,
    display_name: Option<String>,
    avatar_url: Option<String>,
) -> Result<users::Model, DbErr> {
    let now = Utc::now();
    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(pool)
        .await?;

    if let Some(user) = existing {
        let mut active: users::ActiveModel = user.into();
        if let Some(name) = display_name {
            active.display_name = Set(name);
        }
        if let Some(avatar) = avatar_url {
            active.avatar_url = Set(Some(avatar));
        }
        active.updated_at = Set(now.into());
        return active.update(pool).await;
    }

    let role = if user_count(pool).await? == 0 {
        info!(%email, "bootstrapping first account as superadmin");
        users::Role::Superadmin
    } else {
        users::Role::User
    };
    users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_owned()),
        display_name: Set(display_name.unwrap_or_else(|| email.to_owned())),
        avatar_url: Set(avatar_url),
        role: Set(role),
        is_deleted: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(pool)
    .await
}

pub async fn user_count(pool: &DbPool) -> Result<u64, DbErr> {
    users::Entity::find().count(pool).await
}
