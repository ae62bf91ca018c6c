//! Create rating table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rating::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rating::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rating::PhotoId).string().not_null())
                    .col(ColumnDef::new(Rating::UserId).string().not_null())
                    .col(ColumnDef::new(Rating::Score).integer().not_null())
                    .col(
                        ColumnDef::new(Rating::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rating::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_photo")
                            .from(Rating::Table, Rating::PhotoId)
                            .to(Photo::Table, Photo::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rating_user")
                            .from(Rating::Table, Rating::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rating_photo_id")
                    .table(Rating::Table)
                    .col(Rating::PhotoId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rating_user_id")
                    .table(Rating::Table)
                    .col(Rating::UserId)
                    .to_owned(),
            )
            .await?;

        // One score per (photo, user); re-rating updates in place
        manager
            .create_index(
                Index::create()
                    .name("idx_rating_unique")
                    .table(Rating::Table)
                    .col(Rating::PhotoId)
                    .col(Rating::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rating::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Rating {
    Table,
    Id,
    PhotoId,
    UserId,
    Score,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Photo {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
