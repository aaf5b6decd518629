//! Demo fixtures: two accounts, one fallen record with a comment and a
//! memory thread.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use entity::{comments, fallen, memories, memory_additions, users};
use platform_db::DbPool;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

pub async fn run(pool: &DbPool) -> Result<()> {
    let existing = fallen::Entity::find().count(pool).await?;
    if existing > 0 {
        info!(records = existing, "fallen records already present; skipping seed");
        return Ok(());
    }

    let admin = platform_db::upsert_user(
        pool,
        "admin@remembrance.test",
        Some("Site Admin".into()),
        None,
    )
    .await?;
    let contributor = platform_db::upsert_user(
        pool,
        "family@remembrance.test",
        Some("Family Member".into()),
        None,
    )
    .await?;

    // upsert_user only hands superadmin to the very first account; make the
    // seeded admin explicit so seeding an existing database behaves the same.
    if admin.role != users::Role::Superadmin {
        let mut active: users::ActiveModel = admin.clone().into();
        active.role = Set(users::Role::Superadmin);
        active.update(pool).await?;
    }

    let now = Utc::now();
    let record = fallen::ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set("Daniel".into()),
        last_name: Set("Sharon".into()),
        nickname: Set(Some("Dani".into())),
        rank: Set(Some("Sergeant".into())),
        unit: Set(Some("Armored Corps".into())),
        born_on: Set(NaiveDate::from_ymd_opt(1952, 3, 14)),
        fell_on: Set(NaiveDate::from_ymd_opt(1973, 10, 9)),
        birth_place: Set(Some("Haifa".into())),
        burial_place: Set(Some("Mount Herzl".into())),
        biography: Set(Some(
            "Served as a tank commander; fell in the battle for the Golan Heights.".into(),
        )),
        photo_url: Set(None),
        grave_lat: Set(Some(31.7735)),
        grave_lon: Set(Some(35.1796)),
        owner_id: Set(contributor.id),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(pool)
    .await?;

    comments::ActiveModel {
        id: Set(Uuid::new_v4()),
        fallen_id: Set(record.id),
        author_id: Set(admin.id),
        body: Set("We remember him every year at the memorial ceremony.".into()),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(pool)
    .await?;

    let memory = memories::ActiveModel {
        id: Set(Uuid::new_v4()),
        fallen_id: Set(record.id),
        author_id: Set(contributor.id),
        title: Set("The summer of 1971".into()),
        body: Set("He taught the neighborhood kids to swim at the beach below the Carmel.".into()),
        photo_url: Set(None),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(pool)
    .await?;

    memory_additions::ActiveModel {
        id: Set(Uuid::new_v4()),
        memory_id: Set(memory.id),
        author_id: Set(admin.id),
        body: Set("I was one of those kids. Thank you for writing this.".into()),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(pool)
    .await?;

    let seeded_users = users::Entity::find()
        .filter(users::Column::IsDeleted.eq(false))
        .count(pool)
        .await?;
    info!(users = seeded_users, fallen = 1, "seed data inserted");
    Ok(())
}
