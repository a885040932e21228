pub mod image;
pub mod image_label;
pub mod label;
