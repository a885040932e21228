use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, SqlErr,
};
use tracing::debug;

use super::image::find_image;
use super::label::find_label;
use crate::entity::image_label;
use crate::error::AppError;

/// Attaches labels to images and detaches them again.
///
/// A pair moves strictly between "unassociated" and "associated": attaching
/// an attached pair and detaching an unattached pair are both errors.
pub struct AnnotationManager<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AnnotationManager<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Attach a label to an image and return the new association id.
    ///
    /// The explicit reads only sharpen the error reported to the caller;
    /// the unique (image_id, label_id) index decides concurrent attaches.
    pub async fn attach_label(&self, image_id: i32, label_id: i32) -> Result<i32, AppError> {
        validate_pair(image_id, label_id)?;

        find_image(self.conn, image_id).await?;
        find_label(self.conn, label_id).await?;

        if self.find_association(image_id, label_id).await?.is_some() {
            return Err(already_assigned());
        }

        let association = image_label::ActiveModel {
            image_id: Set(image_id),
            label_id: Set(label_id),
            annotation_time: Set(Utc::now()),
            ..Default::default()
        };

        let model = association
            .insert(self.conn)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => already_assigned(),
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    AppError::NotFound("Image or label not found".into())
                }
                _ => AppError::from(e),
            })?;

        debug!(image_id, label_id, annotation_id = model.id, "Attached label");
        Ok(model.id)
    }

    /// Detach a label from an image.
    pub async fn detach_label(&self, image_id: i32, label_id: i32) -> Result<(), AppError> {
        validate_pair(image_id, label_id)?;

        find_image(self.conn, image_id).await?;
        find_label(self.conn, label_id).await?;

        let removed = image_label::Entity::delete_many()
            .filter(image_label::Column::ImageId.eq(image_id))
            .filter(image_label::Column::LabelId.eq(label_id))
            .exec(self.conn)
            .await?;

        if removed.rows_affected == 0 {
            return Err(AppError::NotFound("Label not assigned to image".into()));
        }

        debug!(image_id, label_id, "Detached label");
        Ok(())
    }

    async fn find_association(
        &self,
        image_id: i32,
        label_id: i32,
    ) -> Result<Option<image_label::Model>, AppError> {
        let association = image_label::Entity::find()
            .filter(image_label::Column::ImageId.eq(image_id))
            .filter(image_label::Column::LabelId.eq(label_id))
            .one(self.conn)
            .await?;
        Ok(association)
    }
}

fn already_assigned() -> AppError {
    AppError::Conflict("Label already assigned to image".into())
}

fn validate_pair(image_id: i32, label_id: i32) -> Result<(), AppError> {
    if image_id <= 0 {
        return Err(AppError::Validation("Invalid image id".into()));
    }
    if label_id <= 0 {
        return Err(AppError::Validation("Invalid label id".into()));
    }
    Ok(())
}
