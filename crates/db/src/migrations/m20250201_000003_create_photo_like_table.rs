//! Create photo_like table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PhotoLike::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PhotoLike::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PhotoLike::PhotoId).string().not_null())
                    .col(ColumnDef::new(PhotoLike::UserId).string().not_null())
                    .col(
                        ColumnDef::new(PhotoLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photo_like_photo")
                            .from(PhotoLike::Table, PhotoLike::PhotoId)
                            .to(Photo::Table, Photo::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photo_like_user")
                            .from(PhotoLike::Table, PhotoLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photo_like_photo_id")
                    .table(PhotoLike::Table)
                    .col(PhotoLike::PhotoId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photo_like_user_id")
                    .table(PhotoLike::Table)
                    .col(PhotoLike::UserId)
                    .to_owned(),
            )
            .await?;

        // At most one like per (photo, user)
        manager
            .create_index(
                Index::create()
                    .name("idx_photo_like_unique")
                    .table(PhotoLike::Table)
                    .col(PhotoLike::PhotoId)
                    .col(PhotoLike::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PhotoLike::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PhotoLike {
    Table,
    Id,
    PhotoId,
    UserId,
    CreatedAt,
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
