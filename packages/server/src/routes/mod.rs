use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/images", image_routes(config))
        .nest("/labels", label_routes())
}

fn image_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::image::list_images,
            handlers::image::upload_image
        ))
        .routes(routes!(
            handlers::image::get_image,
            handlers::image::delete_image
        ))
        .routes(routes!(handlers::annotation::attach_label))
        .routes(routes!(handlers::annotation::detach_label))
        .layer(handlers::image::image_upload_body_limit(
            config.storage.max_upload_size,
        ))
}

fn label_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::label::list_labels,
        handlers::label::create_label
    ))
}
