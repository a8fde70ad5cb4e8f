//! # pagediff
//!
//! Compare two revisions of a drawing set page by page.
//!
//! The crate has two halves:
//!
//! * a **rasterizer** that renders PDF pages to PNG/JPEG files through
//!   pdfium at a chosen DPI, and
//! * a **comparison client** that sends two page images to an external
//!   comparison service (homography, phase correlation or pixel overlay)
//!   and decodes the images it sends back.
//!
//! A [`Session`] ties them together for interactive use: upload two PDFs or
//! two images, pick a page, compare, show the results. Everything a session
//! writes lives in its own temporary directory, removed when the session ends.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (2 files)
//!  │
//!  ├─ 1. Validate  exactly two files, %PDF magic / PNG-JPEG sniffing
//!  ├─ 2. Extract   PDF mode: rasterise page N of each document (spawn_blocking)
//!  ├─ 3. Compare   POST /api/methods/?method=<id> with both image paths
//!  └─ 4. Display   base64 images → captioned ResultImage values
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagediff::{rasterize, RasterOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = RasterOptions::builder().dpi(150).page(2).build()?;
//!     let written = rasterize(Path::new("plan-rev-a.pdf"), Path::new("out"), &options)?;
//!     println!("{}", written[0].display()); // out/page_2.png
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` and `pagediff` binaries (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## PDFium
//!
//! Rendering needs the pdfium shared library at runtime. Set
//! `PDFIUM_LIB_PATH` to the library (or its directory), place it next to the
//! executable, or install it on the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod progress;
pub mod raster;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use compare::{ComparisonClient, ComparisonMethod, ComparisonResult, ImageKey, ResultImage};
pub use config::{ClientConfig, ClientConfigBuilder, PageSelection, RasterOptions, RasterOptionsBuilder};
pub use error::{CompareError, RasterError, SessionError};
pub use progress::{NoopProgressCallback, RasterProgress, RasterProgressCallback};
pub use raster::{inspect, rasterize, rasterize_async, DocumentInfo};
pub use session::{InputMode, Session, Stage, Upload};
