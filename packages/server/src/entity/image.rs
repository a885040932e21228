use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Stored filename inside the uploads directory.
    #[sea_orm(unique)]
    pub filename: String,

    pub file_size: i64, // in bytes
    pub mime_type: String,

    #[sea_orm(has_many)]
    pub image_labels: HasMany<super::image_label::Entity>,

    pub upload_time: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
