use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One label attached to one image. The (image_id, label_id) pair is unique,
/// see `database::ensure_indexes`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image_label")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub image_id: i32,
    #[sea_orm(belongs_to, from = "image_id", to = "id", on_delete = "Cascade")]
    pub image: HasOne<super::image::Entity>,

    pub label_id: i32,
    #[sea_orm(belongs_to, from = "label_id", to = "id", on_delete = "Cascade")]
    pub label: HasOne<super::label::Entity>,

    pub annotation_time: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
