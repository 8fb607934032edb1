// src/upload/mod.rs
pub mod uploaded_image;

pub use uploaded_image::UploadedImage;
