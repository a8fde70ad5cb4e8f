//! The rasterizer: PDF pages → image files.
//!
//! ```text
//! input ──▶ render ──▶ format
//! (%PDF check) (pdfium) (png/jpeg writer)
//! ```
//!
//! 1. [`input`]: typed errors for missing, unreadable or non-PDF files
//! 2. [`render`]: open the document, validate the page range, render at `dpi / 72`
//! 3. [`format`]: resolve the output format and write `page_<n>.<format>`

pub mod format;
pub mod input;
pub mod render;

pub use format::{page_file_name, OutputFormat};
pub use input::{validate_pdf, validate_pdf_bytes};
pub use render::{inspect, inspect_async, rasterize, rasterize_async, DocumentInfo};
