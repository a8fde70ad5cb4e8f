//! Progress-callback trait for per-page rasterisation events.
//!
//! Inject an [`Arc<dyn RasterProgressCallback>`] via
//! [`crate::config::RasterOptionsBuilder::progress`] to be told as each page
//! lands on disk. The `pdf2img` binary uses it to drive its progress bar.
//!
//! # Example
//!
//! ```rust
//! use pagediff::{RasterOptions, RasterProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl RasterProgressCallback for Counter {
//!     fn on_page_rendered(&self, page: usize, total: usize, path: &Path) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("page {page}/{total} → {}", path.display());
//!     }
//! }
//!
//! let options = RasterOptions::builder()
//!     .progress(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the rasterizer as it writes each page.
///
/// Rendering runs on a blocking worker thread when driven through
/// [`crate::raster::rasterize_async`], so implementations must be
/// `Send + Sync`. All methods default to no-ops.
pub trait RasterProgressCallback: Send + Sync {
    /// Called once after the page range is validated, before any page is rendered.
    ///
    /// # Arguments
    /// * `total`: number of pages that will be rendered
    fn on_render_start(&self, total: usize) {
        let _ = total;
    }

    /// Called after a page has been written.
    ///
    /// # Arguments
    /// * `page` : 1-indexed page number
    /// * `total`: number of pages being rendered in this call
    /// * `path` : where the image was written
    fn on_page_rendered(&self, page: usize, total: usize, path: &Path) {
        let _ = (page, total, path);
    }

    /// Called once after the last page was written.
    fn on_render_complete(&self, rendered: usize) {
        let _ = rendered;
    }
}

/// A no-op implementation.
pub struct NoopProgressCallback;

impl RasterProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RasterOptions`].
pub type RasterProgress = Arc<dyn RasterProgressCallback>;
