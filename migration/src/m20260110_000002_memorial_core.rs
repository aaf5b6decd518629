use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Fallen {
    Table,
    Id,
    FirstName,
    LastName,
    Nickname,
    Rank,
    Unit,
    BornOn,
    FellOn,
    BirthPlace,
    BurialPlace,
    Biography,
    PhotoUrl,
    GraveLat,
    GraveLon,
    OwnerId,
    DeletedAt,
    DeletedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    FallenId,
    AuthorId,
    Body,
    DeletedAt,
    DeletedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Memories {
    Table,
    Id,
    FallenId,
    AuthorId,
    Title,
    Body,
    PhotoUrl,
    DeletedAt,
    DeletedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MemoryAdditions {
    Table,
    Id,
    MemoryId,
    AuthorId,
    Body,
    DeletedAt,
    DeletedBy,
    CreatedAt,
    UpdatedAt,
}

fn timestamps(table: &mut TableCreateStatement, created: impl IntoIden, updated: impl IntoIden) {
    table
        .col(
            ColumnDef::new(created)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(updated)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        );
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut fallen = Table::create()
            .table(Fallen::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Fallen::Id)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("gen_random_uuid()")),
            )
            .col(ColumnDef::new(Fallen::FirstName).string().not_null())
            .col(ColumnDef::new(Fallen::LastName).string().not_null())
            .col(ColumnDef::new(Fallen::Nickname).string())
            .col(ColumnDef::new(Fallen::Rank).string())
            .col(ColumnDef::new(Fallen::Unit).string())
            .col(ColumnDef::new(Fallen::BornOn).date())
            .col(ColumnDef::new(Fallen::FellOn).date())
            .col(ColumnDef::new(Fallen::BirthPlace).string())
            .col(ColumnDef::new(Fallen::BurialPlace).string())
            .col(ColumnDef::new(Fallen::Biography).text())
            .col(ColumnDef::new(Fallen::PhotoUrl).string())
            .col(ColumnDef::new(Fallen::GraveLat).double())
            .col(ColumnDef::new(Fallen::GraveLon).double())
            .col(ColumnDef::new(Fallen::OwnerId).uuid().not_null())
            .col(ColumnDef::new(Fallen::DeletedAt).timestamp_with_time_zone())
            .col(ColumnDef::new(Fallen::DeletedBy).uuid())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_fallen_owner")
                    .from(Fallen::Table, Fallen::OwnerId)
                    .to(Users::Table, Users::Id),
            )
            .to_owned();
        timestamps(&mut fallen, Fallen::CreatedAt, Fallen::UpdatedAt);
        manager.create_table(fallen).await?;

        let mut comments = Table::create()
            .table(Comments::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Comments::Id)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("gen_random_uuid()")),
            )
            .col(ColumnDef::new(Comments::FallenId).uuid().not_null())
            .col(ColumnDef::new(Comments::AuthorId).uuid().not_null())
            .col(ColumnDef::new(Comments::Body).text().not_null())
            .col(ColumnDef::new(Comments::DeletedAt).timestamp_with_time_zone())
            .col(ColumnDef::new(Comments::DeletedBy).uuid())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_comments_fallen")
                    .from(Comments::Table, Comments::FallenId)
                    .to(Fallen::Table, Fallen::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_comments_author")
                    .from(Comments::Table, Comments::AuthorId)
                    .to(Users::Table, Users::Id),
            )
            .to_owned();
        timestamps(&mut comments, Comments::CreatedAt, Comments::UpdatedAt);
        manager.create_table(comments).await?;

        let mut memories = Table::create()
            .table(Memories::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Memories::Id)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("gen_random_uuid()")),
            )
            .col(ColumnDef::new(Memories::FallenId).uuid().not_null())
            .col(ColumnDef::new(Memories::AuthorId).uuid().not_null())
            .col(ColumnDef::new(Memories::Title).string().not_null())
            .col(ColumnDef::new(Memories::Body).text().not_null())
            .col(ColumnDef::new(Memories::PhotoUrl).string())
            .col(ColumnDef::new(Memories::DeletedAt).timestamp_with_time_zone())
            .col(ColumnDef::new(Memories::DeletedBy).uuid())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_memories_fallen")
                    .from(Memories::Table, Memories::FallenId)
                    .to(Fallen::Table, Fallen::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_memories_author")
                    .from(Memories::Table, Memories::AuthorId)
                    .to(Users::Table, Users::Id),
            )
            .to_owned();
        timestamps(&mut memories, Memories::CreatedAt, Memories::UpdatedAt);
        manager.create_table(memories).await?;

        let mut additions = Table::create()
            .table(MemoryAdditions::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(MemoryAdditions::Id)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("gen_random_uuid()")),
            )
            .col(ColumnDef::new(MemoryAdditions::MemoryId).uuid().not_null())
            .col(ColumnDef::new(MemoryAdditions::AuthorId).uuid().not_null())
            .col(ColumnDef::new(MemoryAdditions::Body).text().not_null())
            .col(ColumnDef::new(MemoryAdditions::DeletedAt).timestamp_with_time_zone())
            .col(ColumnDef::new(MemoryAdditions::DeletedBy).uuid())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_memory_additions_memory")
                    .from(MemoryAdditions::Table, MemoryAdditions::MemoryId)
                    .to(Memories::Table, Memories::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_memory_additions_author")
                    .from(MemoryAdditions::Table, MemoryAdditions::AuthorId)
                    .to(Users::Table, Users::Id),
            )
            .to_owned();
        timestamps(&mut additions, MemoryAdditions::CreatedAt, MemoryAdditions::UpdatedAt);
        manager.create_table(additions).await?;

        for (name, table, column) in [
            ("idx_fallen_owner_id", Fallen::Table.into_iden(), Fallen::OwnerId.into_iden()),
            ("idx_fallen_deleted_at", Fallen::Table.into_iden(), Fallen::DeletedAt.into_iden()),
            ("idx_comments_fallen_id", Comments::Table.into_iden(), Comments::FallenId.into_iden()),
            ("idx_comments_deleted_at", Comments::Table.into_iden(), Comments::DeletedAt.into_iden()),
            ("idx_memories_fallen_id", Memories::Table.into_iden(), Memories::FallenId.into_iden()),
            ("idx_memories_deleted_at", Memories::Table.into_iden(), Memories::DeletedAt.into_iden()),
            (
                "idx_memory_additions_memory_id",
                MemoryAdditions::Table.into_iden(),
                MemoryAdditions::MemoryId.into_iden(),
            ),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MemoryAdditions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Memories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Fallen::Table).to_owned())
            .await
    }
}
