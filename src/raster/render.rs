//! PDF rasterisation: render pages via pdfium and write them as image files.
//!
//! pdfium is a blocking C++ library with thread-local state, so the async
//! entry points move the work onto `tokio::task::spawn_blocking`. The
//! blocking functions are public as well; the `pdf2img` binary and tests
//! call them directly.
//!
//! Pages are rendered at `dpi / 72` times their natural size, 72 being the
//! number of PDF points per inch. A US-letter page (612 × 792 pt) at 300 DPI
//! becomes 2550 × 3300 px.

use crate::config::RasterOptions;
use crate::engine;
use crate::error::RasterError;
use crate::raster::format::{page_file_name, OutputFormat};
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Basic facts about a PDF, read without rendering anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub pdf_version: String,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Rasterise the selected pages of `pdf_path` into `output_dir`.
///
/// Returns the written paths in page order. Each page is written to
/// `output_dir/page_<n>.<format>`; `output_dir` must already exist.
///
/// # Errors
/// - [`RasterError::DocumentOpen`]: missing, corrupt or locked PDF
/// - [`RasterError::PageOutOfRange`]: `options.pages` names a page outside `[1, total]`
/// - [`RasterError::UnsupportedFormat`]: raised when the first page is written
/// - [`RasterError::Io`]: `output_dir` missing or not writable
pub fn rasterize(
    pdf_path: &Path,
    output_dir: &Path,
    options: &RasterOptions,
) -> Result<Vec<PathBuf>, RasterError> {
    let pdfium = engine::bind()?;
    let document = open_document(&pdfium, pdf_path)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    let selected = options.pages.resolve(total_pages)?;
    info!(
        "PDF loaded: {} pages, rendering {} at {} DPI",
        total_pages,
        selected.len(),
        options.dpi
    );

    let render_config = PdfRenderConfig::new().scale_page_by_factor(options.scale());

    if let Some(ref cb) = options.progress {
        cb.on_render_start(selected.len());
    }

    let mut written = Vec::with_capacity(selected.len());

    for &page_num in &selected {
        let page = pages
            .get((page_num - 1) as u16)
            .map_err(|e| RasterError::RasterisationFailed {
                page: page_num,
                detail: format!("{:?}", e),
            })?;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            RasterError::RasterisationFailed {
                page: page_num,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );

        let format = OutputFormat::parse(&options.format)?;
        let path = output_dir.join(page_file_name(page_num, &options.format));
        format.write(&image, &path)?;

        if let Some(ref cb) = options.progress {
            cb.on_page_rendered(page_num, selected.len(), &path);
        }
        written.push(path);
    }

    if let Some(ref cb) = options.progress {
        cb.on_render_complete(written.len());
    }

    info!(
        "Wrote {} page image(s) to {}",
        written.len(),
        output_dir.display()
    );
    Ok(written)
}

/// Async wrapper around [`rasterize`].
pub async fn rasterize_async(
    pdf_path: &Path,
    output_dir: &Path,
    options: &RasterOptions,
) -> Result<Vec<PathBuf>, RasterError> {
    let path = pdf_path.to_path_buf();
    let out = output_dir.to_path_buf();
    let options = options.clone();

    tokio::task::spawn_blocking(move || rasterize(&path, &out, &options))
        .await
        .map_err(|e| RasterError::Internal(format!("Render task panicked: {}", e)))?
}

/// Read page count and basic metadata.
pub fn inspect(pdf_path: &Path) -> Result<DocumentInfo, RasterError> {
    let pdfium = engine::bind()?;
    let document = open_document(&pdfium, pdf_path)?;

    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentInfo {
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
    })
}

/// Async wrapper around [`inspect`].
pub async fn inspect_async(pdf_path: &Path) -> Result<DocumentInfo, RasterError> {
    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || inspect(&path))
        .await
        .map_err(|e| RasterError::Internal(format!("Inspect task panicked: {}", e)))?
}

fn open_document<'a>(pdfium: &'a Pdfium, pdf_path: &Path) -> Result<PdfDocument<'a>, RasterError> {
    if !pdf_path.exists() {
        return Err(RasterError::DocumentOpen {
            path: pdf_path.to_path_buf(),
            detail: "file does not exist".to_string(),
        });
    }

    pdfium.load_pdf_from_file(pdf_path, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        let detail = if err_str.contains("Password") || err_str.contains("password") {
            "document is password-protected".to_string()
        } else {
            err_str
        };
        RasterError::DocumentOpen {
            path: pdf_path.to_path_buf(),
            detail,
        }
    })
}
