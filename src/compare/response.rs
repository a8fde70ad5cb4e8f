//! Decoding the comparison service's answer into displayable images.
//!
//! The service returns `{"images": {"<key>": "<base64>", ...}}`. Each value is
//! base64-decoded and then decoded as an image so a corrupt payload is
//! reported here rather than when something tries to show it.

use crate::error::CompareError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Semantic role of an image returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageKey {
    /// Second image warped onto the first.
    Aligned,
    /// Annotated comparison result.
    Changed,
    /// Difference map.
    Diff,
    /// Any key the client does not know; kept as sent.
    Other(String),
}

impl ImageKey {
    pub fn from_key(key: &str) -> Self {
        match key {
            "aligned" => ImageKey::Aligned,
            "changed" => ImageKey::Changed,
            "diff" => ImageKey::Diff,
            other => ImageKey::Other(other.to_string()),
        }
    }

    /// The key as it appears on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            ImageKey::Aligned => "aligned",
            ImageKey::Changed => "changed",
            ImageKey::Diff => "diff",
            ImageKey::Other(s) => s,
        }
    }

    /// Caption shown next to the image. Unknown keys are captioned with the raw key.
    pub fn caption(&self) -> &str {
        match self {
            ImageKey::Aligned => "Aligned image",
            ImageKey::Changed => "Comparison result",
            ImageKey::Diff => "Difference between images",
            ImageKey::Other(s) => s,
        }
    }
}

/// One decoded image from the service response.
#[derive(Debug, Clone)]
pub struct ResultImage {
    pub key: ImageKey,
    /// Encoded bytes exactly as the service sent them (after base64).
    pub bytes: Vec<u8>,
    pub image: DynamicImage,
    /// Encoding detected from the bytes, if `image` recognises it.
    pub format: Option<ImageFormat>,
}

impl ResultImage {
    pub fn caption(&self) -> &str {
        self.key.caption()
    }

    /// File name used by [`ResultImage::save_to`]: `<key>.<ext>`.
    pub fn file_name(&self) -> String {
        let (stem, ext) = self.file_stem_and_ext();
        format!("{}.{}", stem, ext)
    }

    fn file_stem_and_ext(&self) -> (String, &'static str) {
        let ext = self
            .format
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("img");
        // Keys come from the network; keep them to a single path component.
        let stem = self
            .key
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        (stem, ext)
    }

    /// Write the original bytes into `dir` and return the path.
    pub fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(self.file_name());
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// All images returned for one comparison, in presentation order.
#[derive(Debug, Clone, Default)]
pub struct ComparisonResult {
    pub images: Vec<ResultImage>,
}

impl ComparisonResult {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, key: &ImageKey) -> Option<&ResultImage> {
        self.images.iter().find(|i| &i.key == key)
    }

    /// One file name per image, in order. Keys that sanitise to the same
    /// name get `-2`, `-3`, ... before the extension.
    pub fn file_names(&self) -> Vec<String> {
        let mut taken = HashSet::new();
        self.images
            .iter()
            .map(|img| {
                let (stem, ext) = img.file_stem_and_ext();
                let mut name = format!("{}.{}", stem, ext);
                let mut n = 2;
                while !taken.insert(name.clone()) {
                    name = format!("{}-{}.{}", stem, n, ext);
                    n += 1;
                }
                name
            })
            .collect()
    }

    /// Write every image into `dir` under [`ComparisonResult::file_names`].
    pub fn save_all(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        self.images
            .iter()
            .zip(self.file_names())
            .map(|(img, name)| {
                let path = dir.join(name);
                std::fs::write(&path, &img.bytes)?;
                debug!("Saved '{}' to {}", img.key.as_str(), path.display());
                Ok(path)
            })
            .collect()
    }
}

/// Success body: `{"images": {...}}`. A missing `images` field means no images.
#[derive(Debug, Deserialize)]
pub(crate) struct ImagesBody {
    #[serde(default)]
    pub images: HashMap<String, String>,
}

/// Error body: `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// Parse and decode a 200 response body.
///
/// Images are ordered `aligned`, `changed`, `diff`, then unknown keys
/// alphabetically, independent of the order the service used.
pub fn decode_images(body: &[u8]) -> Result<ComparisonResult, CompareError> {
    let parsed: ImagesBody =
        serde_json::from_slice(body).map_err(|e| CompareError::MalformedResponse(e.to_string()))?;

    let mut images = parsed
        .images
        .into_iter()
        .map(|(key, b64)| decode_one(&key, &b64))
        .collect::<Result<Vec<_>, _>>()?;
    images.sort_by(|a, b| a.key.cmp(&b.key));

    Ok(ComparisonResult { images })
}

/// Extract the server's message from a non-200 body, if it has one.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body).ok().map(|b| b.error)
}

fn decode_one(key: &str, b64: &str) -> Result<ResultImage, CompareError> {
    let bytes = STANDARD
        .decode(b64.trim())
        .map_err(|e| CompareError::InvalidImage {
            key: key.to_string(),
            detail: format!("base64: {}", e),
        })?;

    let format = image::guess_format(&bytes).ok();
    let image = image::load_from_memory(&bytes).map_err(|e| CompareError::InvalidImage {
        key: key.to_string(),
        detail: e.to_string(),
    })?;
    debug!(
        "Decoded '{}' → {}x{} px ({} bytes)",
        key,
        image.width(),
        image.height(),
        bytes.len()
    );

    Ok(ResultImage {
        key: ImageKey::from_key(key),
        bytes,
        image,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_b64(w: u32, h: u32) -> String {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([0, 128, 255, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        STANDARD.encode(&buf)
    }

    #[test]
    fn single_diff_image_gets_difference_caption() {
        let body = format!(r#"{{"images": {{"diff": "{}"}}}}"#, png_b64(4, 3));
        let result = decode_images(body.as_bytes()).unwrap();

        assert_eq!(result.len(), 1);
        let img = &result.images[0];
        assert_eq!(img.key, ImageKey::Diff);
        assert_eq!(img.caption(), "Difference between images");
        assert_eq!((img.image.width(), img.image.height()), (4, 3));
        assert_eq!(img.format, Some(ImageFormat::Png));
    }

    #[test]
    fn known_keys_first_then_unknown_alphabetically() {
        let b64 = png_b64(1, 1);
        let body = format!(
            r#"{{"images": {{"zeta": "{b64}", "diff": "{b64}", "heatmap": "{b64}", "aligned": "{b64}"}}}}"#
        );
        let result = decode_images(body.as_bytes()).unwrap();
        let keys: Vec<&str> = result.images.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["aligned", "diff", "heatmap", "zeta"]);
    }

    #[test]
    fn unknown_key_caption_is_raw_key() {
        assert_eq!(ImageKey::from_key("heatmap").caption(), "heatmap");
        assert_eq!(ImageKey::from_key("changed").caption(), "Comparison result");
        assert_eq!(ImageKey::from_key("aligned").caption(), "Aligned image");
    }

    #[test]
    fn missing_images_field_is_empty_result() {
        let result = decode_images(br#"{"status": "ok"}"#).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn bad_base64_is_invalid_image() {
        let err = decode_images(br#"{"images": {"diff": "***"}}"#).unwrap_err();
        assert!(matches!(err, CompareError::InvalidImage { ref key, .. } if key == "diff"));
    }

    #[test]
    fn base64_of_non_image_is_invalid_image() {
        let body = format!(r#"{{"images": {{"aligned": "{}"}}}}"#, STANDARD.encode(b"hello"));
        let err = decode_images(body.as_bytes()).unwrap_err();
        assert!(matches!(err, CompareError::InvalidImage { .. }));
    }

    #[test]
    fn non_json_success_body_is_malformed() {
        let err = decode_images(b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, CompareError::MalformedResponse(_)));
    }

    #[test]
    fn error_body_message() {
        assert_eq!(
            error_message(br#"{"error": "bad method"}"#),
            Some("bad method".to_string())
        );
        assert_eq!(error_message(b"Internal Server Error"), None);
        assert_eq!(error_message(br#"{"detail": "x"}"#), None);
    }

    #[test]
    fn save_uses_key_and_detected_extension() {
        let body = format!(r#"{{"images": {{"../diff": "{}"}}}}"#, png_b64(2, 2));
        let result = decode_images(body.as_bytes()).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let path = result.images[0].save_to(dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap(), "___diff.png");
        assert_eq!(image::image_dimensions(&path).unwrap(), (2, 2));
    }

    #[test]
    fn colliding_keys_are_saved_under_distinct_names() {
        let b64 = png_b64(1, 1);
        let body = format!(r#"{{"images": {{"a/b": "{b64}", "a_b": "{b64}", "a_b-2": "{b64}"}}}}"#);
        let result = decode_images(body.as_bytes()).unwrap();

        assert_eq!(result.file_names(), ["a_b.png", "a_b-2.png", "a_b-2-2.png"]);

        let dir = tempfile::tempdir().unwrap();
        let paths = result.save_all(dir.path()).unwrap();
        assert_eq!(paths.len(), 3);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }
}
