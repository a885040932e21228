//! Data-access components over an injected connection handle.
//!
//! Each registry borrows the connection (and, for images, the upload store)
//! it was constructed with; handlers build one per request from `AppState`.

mod annotation;
mod image;
mod label;

pub use annotation::AnnotationManager;
pub use image::{ImageDetail, ImageRegistry, find_image};
pub use label::{LabelRegistry, find_label};
