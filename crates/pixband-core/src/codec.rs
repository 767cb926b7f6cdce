//! Image decoding and encoding with format detection and size limits.

use crate::Rgba64Image;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Format used when the output path does not name a known one.
pub const DEFAULT_FORMAT: ImageFormat = ImageFormat::Jpeg;

/// Decodes source images and encodes transform outputs.
#[derive(Debug, Clone)]
pub struct ImageCodec {
    limits: LimitsConfig,
}

impl ImageCodec {
    /// Create a new codec with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Reject inputs larger than `limits.max_file_size_mb`.
    pub fn check_file_size(&self, path: &Path, size: u64) -> Result<(), PipelineError> {
        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if size > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: size / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }

    /// Decode `bytes` into a 16-bit RGBA source grid.
    ///
    /// The format is detected from content, falling back to the extension of
    /// `path`. `path` is only used for detection and error context. The grid
    /// keeps straight alpha; premultiplication happens when a transform
    /// samples it.
    pub fn decode(&self, bytes: &[u8], path: &Path) -> Result<Rgba64Image, PipelineError> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let reader = match reader.format() {
            Some(_) => reader,
            None => {
                let format = ImageFormat::from_path(path).map_err(|_| PipelineError::Decode {
                    path: path.to_path_buf(),
                    message: "Unrecognized image format".to_string(),
                })?;
                let mut reader = reader;
                reader.set_format(format);
                reader
            }
        };
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Image has no pixels ({}x{})", width, height),
            });
        }
        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim: self.limits.max_image_dimension,
            });
        }

        Ok(image.into_rgba16())
    }

    /// Encode a gray or RGBA grid in the format implied by `path`.
    ///
    /// Formats without an alpha channel receive the color channels only.
    pub fn encode(&self, image: DynamicImage, path: &Path) -> Result<Vec<u8>, PipelineError> {
        let format = output_format(path);
        let flatten = matches!(image, DynamicImage::ImageRgba8(_)) && !supports_alpha(format);
        let image = if flatten {
            DynamicImage::ImageRgb8(image.into_rgb8())
        } else {
            image
        };

        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, format)
            .map_err(|e| PipelineError::Encode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(buffer.into_inner())
    }
}

/// Output format named by the extension of `path`, or [`DEFAULT_FORMAT`].
pub fn output_format(path: &Path) -> ImageFormat {
    ImageFormat::from_path(path).unwrap_or(DEFAULT_FORMAT)
}

fn supports_alpha(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Tiff | ImageFormat::Bmp
    )
}
