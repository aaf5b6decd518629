pub use sea_orm_migration::prelude::*;

mod m20260110_000001_users_sessions;
mod m20260110_000002_memorial_core;
mod m20260111_000003_search_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_000001_users_sessions::Migration),
            Box::new(m20260110_000002_memorial_core::Migration),
            Box::new(m20260111_000003_search_indexes::Migration),
        ]
    }
}
