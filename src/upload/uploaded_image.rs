// src/upload/uploaded_image.rs
use image::{DynamicImage, ImageOutputFormat};
use log::{debug, info};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Extensions the upload control accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Quality used when re-encoding uploads.
const JPEG_QUALITY: u8 = 75;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported file type {0:?} (expected jpg, jpeg or png)")]
    UnsupportedExtension(String),

    #[error("uploaded file is empty")]
    Empty,

    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

/// Compressed JPEG bytes ready to be posted. Built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer(Vec<u8>);

impl ImageBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Force three-channel color and re-encode as JPEG.
pub fn normalize(image: &DynamicImage) -> Result<ImageBuffer, UploadError> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    DynamicImage::ImageRgb8(rgb).write_to(&mut cursor, ImageOutputFormat::Jpeg(JPEG_QUALITY))?;

    debug!("Normalized {}x{} image to {} bytes of JPEG", width, height, buffer.len());
    Ok(ImageBuffer(buffer))
}

/// The bytes a user handed us, exactly as uploaded.
pub struct UploadedImage {
    name: String,
    raw: Vec<u8>,
}

impl UploadedImage {
    /// Read an image file, rejecting anything the upload control would not offer.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadError::UnsupportedExtension(extension));
        }

        let raw = std::fs::read(path)?;
        info!("Loaded {} ({} bytes)", path.display(), raw.len());

        Self::from_bytes(path.display().to_string(), raw)
    }

    pub fn from_bytes(name: impl Into<String>, raw: Vec<u8>) -> Result<Self, UploadError> {
        if raw.is_empty() {
            return Err(UploadError::Empty);
        }
        Ok(Self {
            name: name.into(),
            raw,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unmodified upload; the detector is fed these directly.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn decode(&self) -> Result<DynamicImage, UploadError> {
        Ok(image::load_from_memory(&self.raw)?)
    }

    /// Decode then normalize, the path taken before gender classification.
    pub fn normalized(&self) -> Result<ImageBuffer, UploadError> {
        let image = self.decode()?;
        normalize(&image)
    }
}
