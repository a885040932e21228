use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "label")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Trimmed, case-sensitive unique name.
    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(has_many)]
    pub image_labels: HasMany<super::image_label::Entity>,

    pub created_time: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
