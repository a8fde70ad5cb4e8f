//! Output image formats and page file naming.
//!
//! The caller passes the format as a free-form string (`"png"`, `"JPEG"`,
//! `"jpg"`). It is resolved against the encoders compiled into `image` only
//! when a page is about to be written, so a bad format surfaces as
//! [`RasterError::UnsupportedFormat`] at write time rather than at parse time.

use crate::error::RasterError;
use image::{DynamicImage, ImageFormat};
use std::path::Path;

/// An image encoder the rasterizer can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Resolve a caller-supplied format name (case-insensitive).
    pub fn parse(name: &str) -> Result<Self, RasterError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            _ => Err(RasterError::UnsupportedFormat {
                format: name.to_string(),
            }),
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
        }
    }

    /// Encode `img` to `path` in this format.
    ///
    /// JPEG has no alpha channel; pdfium bitmaps are RGBA, so they are
    /// flattened to RGB first.
    pub fn write(self, img: &DynamicImage, path: &Path) -> Result<(), RasterError> {
        let result = match self {
            OutputFormat::Png => img.save_with_format(path, ImageFormat::Png),
            OutputFormat::Jpeg => {
                DynamicImage::ImageRgb8(img.to_rgb8()).save_with_format(path, ImageFormat::Jpeg)
            }
        };

        result.map_err(|e| match e {
            image::ImageError::IoError(source) => RasterError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => RasterError::Internal(format!(
                "Encoding '{}' failed: {}",
                path.display(),
                other
            )),
        })
    }
}

/// File name for a rendered page: `page_<page>.<format>`.
///
/// `page` is 1-based and `format` keeps the caller's spelling, so
/// `--image-format jpg` produces `page_1.jpg`.
pub fn page_file_name(page: usize, format: &str) -> String {
    format!("page_{}.{}", page, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn parse_known_formats() {
        assert_eq!(OutputFormat::parse("png").unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::parse("PNG").unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::parse("jpeg").unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::parse("jpg").unwrap(), OutputFormat::Jpeg);
    }

    #[test]
    fn parse_unknown_format_fails() {
        let err = OutputFormat::parse("tiff").unwrap_err();
        assert!(matches!(err, RasterError::UnsupportedFormat { ref format } if format == "tiff"));
    }

    #[test]
    fn page_file_name_keeps_format_spelling() {
        assert_eq!(page_file_name(1, "png"), "page_1.png");
        assert_eq!(page_file_name(12, "jpg"), "page_12.jpg");
    }

    #[test]
    fn write_rgba_as_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page_1.jpeg");
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 6, Rgba([10, 20, 30, 255])));

        OutputFormat::Jpeg.write(&img, &path).expect("jpeg write");

        let (w, h) = image::image_dimensions(&path).unwrap();
        assert_eq!((w, h), (8, 6));
    }

    #[test]
    fn write_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("page_1.png");
        let img = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));

        let err = OutputFormat::Png.write(&img, &path).unwrap_err();
        assert!(matches!(err, RasterError::Io { .. }), "got: {err:?}");
    }
}
