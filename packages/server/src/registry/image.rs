use chrono::Utc;
use common::storage::UploadStore;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionSession, TransactionTrait,
};
use tracing::{info, warn};

use crate::entity::{image, image_label, label};
use crate::error::AppError;
use crate::models::image::{ImageLabelResponse, ImageListRow};

/// An image together with its attached labels.
pub struct ImageDetail {
    pub image: image::Model,
    pub labels: Vec<ImageLabelResponse>,
}

pub struct ImageRegistry<'a, C: ConnectionTrait> {
    conn: &'a C,
    uploads: &'a dyn UploadStore,
}

impl<'a, C: ConnectionTrait> ImageRegistry<'a, C> {
    pub fn new(conn: &'a C, uploads: &'a dyn UploadStore) -> Self {
        Self { conn, uploads }
    }

    /// Record metadata for a file already persisted in the upload store.
    pub async fn create_image(
        &self,
        filename: &str,
        file_size: i64,
        mime_type: &str,
    ) -> Result<image::Model, AppError> {
        let existing = image::Entity::find()
            .filter(image::Column::Filename.eq(filename))
            .one(self.conn)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "Image '{filename}' already exists"
            )));
        }

        let new_image = image::ActiveModel {
            filename: Set(filename.to_string()),
            file_size: Set(file_size),
            mime_type: Set(mime_type.to_string()),
            upload_time: Set(Utc::now()),
            ..Default::default()
        };

        new_image.insert(self.conn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict(format!("Image '{filename}' already exists"))
            }
            _ => AppError::from(e),
        })
    }

    /// All images, newest first, each with its current label count.
    pub async fn list_images(&self) -> Result<Vec<ImageListRow>, AppError> {
        let rows = image::Entity::find()
            .select_only()
            .column(image::Column::Id)
            .column(image::Column::Filename)
            .column(image::Column::FileSize)
            .column(image::Column::MimeType)
            .column(image::Column::UploadTime)
            .column_as(image_label::Column::Id.count(), "label_count")
            .left_join(image_label::Entity)
            .group_by(image::Column::Id)
            .group_by(image::Column::Filename)
            .group_by(image::Column::FileSize)
            .group_by(image::Column::MimeType)
            .group_by(image::Column::UploadTime)
            .order_by_desc(image::Column::UploadTime)
            .order_by_desc(image::Column::Id)
            .into_model::<ImageListRow>()
            .all(self.conn)
            .await?;
        Ok(rows)
    }

    /// One image with its labels ordered by name case-insensitively.
    pub async fn get_image(&self, id: i32) -> Result<ImageDetail, AppError> {
        let image = find_image(self.conn, id).await?;

        let rows = image_label::Entity::find()
            .filter(image_label::Column::ImageId.eq(id))
            .find_also_related(label::Entity)
            .order_by(
                Expr::expr(Func::lower(Expr::col((label::Entity, label::Column::Name)))),
                Order::Asc,
            )
            .order_by_asc(image_label::Column::Id)
            .all(self.conn)
            .await?;

        let labels = rows
            .into_iter()
            .filter_map(|(association, label)| {
                label.map(|label| ImageLabelResponse::new(association, label))
            })
            .collect();

        Ok(ImageDetail { image, labels })
    }

    /// Delete an image, its associations and its stored file.
    ///
    /// The row deletion is what makes the call succeed; a file that cannot
    /// be removed afterwards is only logged.
    pub async fn delete_image(&self, id: i32) -> Result<(), AppError>
    where
        C: TransactionTrait,
    {
        let txn = self.conn.begin().await?;

        let image = find_image(&txn, id).await?;

        let detached = image_label::Entity::delete_many()
            .filter(image_label::Column::ImageId.eq(id))
            .exec(&txn)
            .await?;
        image::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        info!(
            image_id = id,
            detached = detached.rows_affected,
            "Deleted image"
        );

        match self.uploads.delete(&image.filename).await {
            Ok(true) => {}
            Ok(false) => warn!("Image file {} was already missing", image.filename),
            Err(e) => warn!("Failed to delete image file {}: {}", image.filename, e),
        }

        Ok(())
    }
}

pub async fn find_image<C: ConnectionTrait>(db: &C, id: i32) -> Result<image::Model, AppError> {
    image::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".into()))
}
