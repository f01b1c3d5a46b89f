//! Transform engine - applies crop and rotation, then re-encodes.
//!
//! The drawing model follows an off-screen raster surface: the surface is
//! sized to the crop region when present (else to the natural frame), and
//! rotation happens about the surface center before the pixels land. The
//! output therefore always has the crop's dimensions (or the natural ones),
//! regardless of rotation; a quarter-turned non-square image is clipped at
//! the surface edges and leaves blank corners.

use bytes::Bytes;
use engage_core::models::{CropRegion, MediaSource, Rotation, TransformResult};
use engage_core::AppError;
use image::{imageops, DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

/// Transform errors
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Failed to decode source image: {0}")]
    Decode(String),

    #[error("Failed to encode final image: {0}")]
    Encode(String),

    #[error("Crop region {x},{y} {width}x{height} exceeds image bounds {image_width}x{image_height}")]
    CropOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("Cannot transform media of type {0}")]
    UnsupportedMedia(String),
}

impl From<TransformError> for AppError {
    fn from(err: TransformError) -> Self {
        AppError::Transform(err.to_string())
    }
}

/// Applies user-specified crop and rotation to a media source, producing the
/// final encoded bytes plus derived metadata.
pub struct TransformEngine;

impl TransformEngine {
    /// Transform a media source.
    ///
    /// When neither a crop nor a rotation was applied, the original bytes
    /// pass through unchanged, preserving original fidelity and avoiding
    /// needless quality loss. Results are derived deterministically and are
    /// recomputed fresh on every upload attempt, never cached.
    pub fn transform(
        source: &MediaSource,
        crop: Option<CropRegion>,
        rotation: Rotation,
    ) -> Result<TransformResult, TransformError> {
        if !source.is_image() {
            if crop.is_some() || !rotation.is_zero() {
                return Err(TransformError::UnsupportedMedia(source.content_type.clone()));
            }
            // Video sources pass through untouched; pixel dimensions are not
            // derived here.
            return Ok(TransformResult {
                data: source.data.clone(),
                content_type: source.content_type.clone(),
                width: 0,
                height: 0,
                original_name: source.original_filename.clone(),
            });
        }

        let cursor = Cursor::new(source.data.as_ref());
        let img = image::ImageReader::new(cursor)
            .with_guessed_format()
            .map_err(|e| TransformError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| TransformError::Decode(e.to_string()))?;

        let (natural_width, natural_height) = img.dimensions();

        if crop.is_none() && rotation.is_zero() {
            return Ok(TransformResult {
                data: source.data.clone(),
                content_type: source.content_type.clone(),
                width: natural_width,
                height: natural_height,
                original_name: source.original_filename.clone(),
            });
        }

        // Crop bounds are validated here, at transform time, not when the
        // region was entered.
        let (surface_width, surface_height, drawn) = match crop {
            Some(region) => {
                if !region.fits_within(natural_width, natural_height) {
                    return Err(TransformError::CropOutOfBounds {
                        x: region.x,
                        y: region.y,
                        width: region.width,
                        height: region.height,
                        image_width: natural_width,
                        image_height: natural_height,
                    });
                }
                let cropped = img.crop_imm(region.x, region.y, region.width, region.height);
                (region.width, region.height, cropped)
            }
            None => (natural_width, natural_height, img),
        };

        let rotated = Self::rotate(drawn, rotation);
        let surface = Self::compose(rotated, surface_width, surface_height);

        let format = Self::detect_format(&source.content_type);
        let (data, content_type) = Self::encode(&surface, format)?;

        tracing::debug!(
            width = surface_width,
            height = surface_height,
            rotation = rotation.degrees(),
            content_type = %content_type,
            size_bytes = data.len(),
            "Transform complete"
        );

        Ok(TransformResult {
            data,
            content_type,
            width: surface_width,
            height: surface_height,
            original_name: source.original_filename.clone(),
        })
    }

    /// Detect the output format from the source content type; lossy JPEG is
    /// the fallback for containers the encoder does not support.
    pub fn detect_format(content_type: &str) -> ImageFormat {
        match content_type {
            "image/jpeg" | "image/jpg" => ImageFormat::Jpeg,
            "image/png" => ImageFormat::Png,
            "image/gif" => ImageFormat::Gif,
            "image/webp" => ImageFormat::WebP,
            _ => ImageFormat::Jpeg,
        }
    }

    /// Rotate by quarter turns (clockwise).
    fn rotate(img: DynamicImage, rotation: Rotation) -> DynamicImage {
        match rotation {
            Rotation::Deg0 => img,
            Rotation::Deg90 => DynamicImage::ImageRgba8(imageops::rotate90(&img.to_rgba8())),
            Rotation::Deg180 => DynamicImage::ImageRgba8(imageops::rotate180(&img.to_rgba8())),
            Rotation::Deg270 => DynamicImage::ImageRgba8(imageops::rotate270(&img.to_rgba8())),
        }
    }

    /// Draw the rotated pixels centered on a surface of the required size.
    /// Overflow is clipped; underflow leaves blank margins.
    fn compose(rotated: DynamicImage, surface_width: u32, surface_height: u32) -> DynamicImage {
        let (rotated_width, rotated_height) = rotated.dimensions();
        if (rotated_width, rotated_height) == (surface_width, surface_height) {
            return rotated;
        }

        let mut surface = RgbaImage::new(surface_width, surface_height);
        let dx = (surface_width as i64 - rotated_width as i64) / 2;
        let dy = (surface_height as i64 - rotated_height as i64) / 2;
        imageops::overlay(&mut surface, &rotated.to_rgba8(), dx, dy);
        DynamicImage::ImageRgba8(surface)
    }

    fn encode(
        img: &DynamicImage,
        format: ImageFormat,
    ) -> Result<(Bytes, String), TransformError> {
        // The JPEG encoder has no alpha channel; flatten first.
        let encodable = if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(img.to_rgb8())
        } else {
            img.clone()
        };

        let (width, height) = encodable.dimensions();
        let mut buffer = Vec::with_capacity(capacity_estimate(width, height));
        let mut cursor = Cursor::new(&mut buffer);
        encodable
            .write_to(&mut cursor, format)
            .map_err(|e| TransformError::Encode(e.to_string()))?;

        Ok((Bytes::from(buffer), format.to_mime_type().to_string()))
    }
}

/// Pre-allocation hint for the encode buffer. Computed in `usize` so
/// gigapixel frames cannot overflow 32-bit pixel arithmetic.
fn capacity_estimate(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}
