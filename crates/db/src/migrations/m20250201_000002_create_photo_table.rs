//! Create photo table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Photo::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Photo::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Photo::CreatorId).string().not_null())
                    .col(ColumnDef::new(Photo::CreatorName).string_len(256).not_null())
                    .col(ColumnDef::new(Photo::CreatorAvatar).string().not_null())
                    .col(ColumnDef::new(Photo::Title).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Photo::Caption)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Photo::Location)
                            .string_len(256)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Photo::People).json_binary().not_null())
                    .col(ColumnDef::new(Photo::Tags).json_binary().not_null())
                    .col(ColumnDef::new(Photo::Category).string_len(128).not_null())
                    .col(ColumnDef::new(Photo::BlobName).string().not_null())
                    .col(ColumnDef::new(Photo::ImageUrl).string().not_null())
                    .col(ColumnDef::new(Photo::AiDescription).text().null())
                    .col(ColumnDef::new(Photo::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Photo::Likes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Photo::RatingSum)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Photo::RatingCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Photo::Rating)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Photo::Comments)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Photo::Views)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Photo::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Photo::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photo_creator")
                            .from(Photo::Table, Photo::CreatorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing predicates and sorts
        manager
            .create_index(
                Index::create()
                    .name("idx_photo_status")
                    .table(Photo::Table)
                    .col(Photo::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photo_category")
                    .table(Photo::Table)
                    .col(Photo::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photo_creator_id")
                    .table(Photo::Table)
                    .col(Photo::CreatorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photo_created_at")
                    .table(Photo::Table)
                    .col(Photo::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photo_likes")
                    .table(Photo::Table)
                    .col(Photo::Likes)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photo_rating")
                    .table(Photo::Table)
                    .col(Photo::Rating)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Photo::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Photo {
    Table,
    Id,
    CreatorId,
    CreatorName,
    CreatorAvatar,
    Title,
    Caption,
    Location,
    People,
    Tags,
    Category,
    BlobName,
    ImageUrl,
    AiDescription,
    Status,
    Likes,
    RatingSum,
    RatingCount,
    Rating,
    Comments,
    Views,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
