//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User roles on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// May upload, edit and delete photos.
    #[sea_orm(string_value = "creator")]
    Creator,
    /// May browse, like, rate and comment.
    #[sea_orm(string_value = "consumer")]
    Consumer,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name
    pub name: String,

    /// Email, unique, stored lowercase
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 password hash, never serialized to callers
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role
    pub role: UserRole,

    /// Avatar URL
    pub avatar: String,

    /// Profile bio
    #[sea_orm(column_type = "Text")]
    pub bio: String,

    /// Uploaded photo count (denormalized)
    #[sea_orm(default_value = 0)]
    pub photos_count: i32,

    /// Total likes received across photos (denormalized)
    #[sea_orm(default_value = 0)]
    pub likes_received: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::photo::Entity")]
    Photos,
}

impl Related<super::photo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
