pub mod annotation;
pub mod image;
pub mod label;
pub mod shared;
