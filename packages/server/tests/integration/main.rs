mod common;
mod images;
