//! Photo entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Moderation status of a photo.
///
/// Only `approved` photos appear in public listings. `rejected` is terminal;
/// the asset is already deleted by the time a photo is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "pending_review")]
    PendingReview,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "photo")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning creator's user ID, immutable.
    #[sea_orm(indexed)]
    pub creator_id: String,

    /// Creator display name, cached projection. Refreshed only when a
    /// profile edit propagates, may go stale in between.
    pub creator_name: String,

    /// Creator avatar URL, cached projection (same staleness contract).
    pub creator_avatar: String,

    /// Photo title.
    pub title: String,

    /// Caption text.
    #[sea_orm(column_type = "Text")]
    pub caption: String,

    /// Free-form location string.
    pub location: String,

    /// Tagged people.
    #[sea_orm(column_type = "JsonBinary")]
    pub people: Json,

    /// Tags, lowercase, deduplicated.
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,

    /// Category, derived from the first tag ("general" when untagged).
    #[sea_orm(indexed)]
    pub category: String,

    /// Opaque blob name. Never exposed to callers.
    #[serde(skip_serializing)]
    pub blob_name: String,

    /// Stored asset URL. May or may not carry an access token; listing
    /// substitutes a freshly signed URL when it does not.
    pub image_url: String,

    /// Caption produced by image analysis, if it ran.
    #[sea_orm(nullable)]
    pub ai_description: Option<String>,

    /// Moderation status.
    pub status: ModerationStatus,

    /// Like count (denormalized).
    #[sea_orm(default_value = 0)]
    pub likes: i32,

    /// Sum of all rating scores.
    #[sea_orm(default_value = 0)]
    pub rating_sum: i32,

    /// Number of ratings.
    #[sea_orm(default_value = 0)]
    pub rating_count: i32,

    /// Average rating, `rating_sum / rating_count` when `rating_count > 0`,
    /// else 0. Maintained in the same statement as the sum and count.
    #[sea_orm(default_value = 0.0)]
    pub rating: f64,

    /// Comment count (denormalized).
    #[sea_orm(default_value = 0)]
    pub comments: i32,

    /// View count.
    #[sea_orm(default_value = 0)]
    pub views: i32,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Creator,
    #[sea_orm(has_many = "super::photo_like::Entity")]
    Likes,
    #[sea_orm(has_many = "super::rating::Entity")]
    Ratings,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::photo_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl Related<super::rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
