use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, QueryOrder,
    Set, SqlErr,
};

use crate::entity::label;
use crate::error::AppError;
use crate::models::label::normalize_label_name;

pub struct LabelRegistry<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> LabelRegistry<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// All labels, ordered by name case-insensitively.
    pub async fn list_labels(&self) -> Result<Vec<label::Model>, AppError> {
        let labels = label::Entity::find()
            .order_by(
                Expr::expr(Func::lower(Expr::col(label::Column::Name))),
                Order::Asc,
            )
            .order_by_asc(label::Column::Id)
            .all(self.conn)
            .await?;
        Ok(labels)
    }

    /// Create a label from a user-supplied name.
    ///
    /// The name is trimmed; blank names are rejected and an existing label
    /// with the same trimmed name is reported as [`AppError::LabelNameTaken`].
    pub async fn create_label(&self, name: Option<&str>) -> Result<label::Model, AppError> {
        let name = normalize_label_name(name)?;

        let existing = label::Entity::find()
            .filter(label::Column::Name.eq(&name))
            .one(self.conn)
            .await?;
        if existing.is_some() {
            return Err(AppError::LabelNameTaken);
        }

        let new_label = label::ActiveModel {
            name: Set(name),
            created_time: Set(Utc::now()),
            ..Default::default()
        };

        new_label.insert(self.conn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::LabelNameTaken,
            _ => AppError::from(e),
        })
    }
}

pub async fn find_label<C: ConnectionTrait>(db: &C, id: i32) -> Result<label::Model, AppError> {
    label::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Label not found".into()))
}
