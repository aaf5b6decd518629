use sea_orm_migration::prelude::*;

const UP_SQL: &str = r#"
CREATE EXTENSION IF NOT EXISTS pg_trgm;

CREATE INDEX IF NOT EXISTS idx_users_search_trgm
    ON users USING gin ((lower(display_name || ' ' || email)) gin_trgm_ops);

CREATE INDEX IF NOT EXISTS idx_fallen_name_trgm
    ON fallen USING gin ((lower(first_name || ' ' || last_name)) gin_trgm_ops);
"#;

const DOWN_SQL: &str = r#"
DROP INDEX IF EXISTS idx_fallen_name_trgm;
DROP INDEX IF EXISTS idx_users_search_trgm;
"#;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(UP_SQL)
            .await
            .map(|_| ())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await
            .map(|_| ())
    }
}
