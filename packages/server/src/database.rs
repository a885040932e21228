use std::time::Duration;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entity::image_label;

/// Name of the unique index guarding one association per (image, label) pair.
pub const IMAGE_LABEL_PAIR_INDEX: &str = "idx_image_label_pair";

/// Connect to the database and bring the schema up to date.
pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    ensure_sqlite_dir(&config.url);

    let mut opt = ConnectOptions::new(config.url.to_owned());
    opt.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("labeler_server::entity::*")
        .sync(&db)
        .await?;
    ensure_indexes(&db).await?;

    info!("Database ready ({:?})", db.get_database_backend());
    Ok(db)
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't derive composite indexes, so the
/// association pair index is created manually on startup. A failure here
/// is fatal.
pub async fn ensure_indexes<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name(IMAGE_LABEL_PAIR_INDEX)
        .table(image_label::Entity)
        .col(image_label::Column::ImageId)
        .col(image_label::Column::LabelId)
        .to_owned();

    let backend = db.get_database_backend();
    db.execute_raw(backend.build(&stmt)).await?;
    info!("Ensured index {IMAGE_LABEL_PAIR_INDEX} exists");

    Ok(())
}

/// Create the parent directory of a file-backed SQLite database.
fn ensure_sqlite_dir(url: &str) {
    let Some(rest) = url.strip_prefix("sqlite://") else {
        return;
    };
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(':') {
        return;
    }
    if let Some(parent) = std::path::Path::new(path).parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        tracing::warn!("Failed to create database directory {}: {}", parent.display(), e);
    }
}
