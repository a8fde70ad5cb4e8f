//! Error types for the pagediff library.
//!
//! Three error enums follow the three stages of a comparison run:
//!
//! * [`RasterError`]: the PDF could not be opened, a page number is outside
//!   the document, or a rendered page could not be written.
//!
//! * [`CompareError`]: the comparison service refused the request, could not
//!   be reached, or answered with something that is not a set of images.
//!
//! * [`SessionError`]: the user-driven workflow was given the wrong input
//!   (file count, page number, upload type) or a step was invoked out of
//!   order. Raster and service failures pass through it unchanged so the
//!   message shown to the user is exactly the underlying one.
//!
//! Every error is terminal for the current step; nothing is retried.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors returned by the rasterizer.
#[derive(Debug, Error)]
pub enum RasterError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// pdfium refused to open the document (missing, corrupt, encrypted).
    #[error("Cannot open PDF '{path}': {detail}")]
    DocumentOpen { path: PathBuf, detail: String },

    /// The requested page is outside `[1, total]`.
    #[error("Page number {page} is out of range. The PDF has {total} pages.")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The requested image format cannot be written.
    #[error("Unsupported image format '{format}' (supported: png, jpeg, jpg)")]
    UnsupportedFormat { format: String },

    /// A rendered page could not be written to the output directory.
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Install libpdfium system-wide (e.g. from bblanchon/pdfium-binaries).\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or containing directory).\n"
    )]
    EngineUnavailable(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors returned by the comparison service client.
#[derive(Debug, Error)]
pub enum CompareError {
    /// The service answered with a non-200 status and an `{"error": ...}` body.
    #[error("Comparison service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    /// The service could not be reached, or its error body was unreadable.
    #[error("Error communicating with the comparison service: {0}")]
    Communication(String),

    /// HTTP 200 but the body is not the expected JSON document.
    #[error("Malformed response from the comparison service: {0}")]
    MalformedResponse(String),

    /// An image under `key` is not valid base64 or not a decodable image.
    #[error("Image '{key}' in the service response is invalid: {detail}")]
    InvalidImage { key: String, detail: String },

    /// The configured request timeout elapsed.
    #[error("Comparison request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CompareError {
    /// The text to show the user for this error.
    ///
    /// For [`CompareError::Service`] this is the server-supplied message
    /// verbatim; for everything else it is the `Display` output.
    pub fn user_message(&self) -> String {
        match self {
            CompareError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Errors raised by the interactive comparison session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Anything other than exactly two files was supplied.
    #[error("Exactly two files must be selected (got {got})")]
    WrongFileCount { got: usize },

    /// The page number is not an integer ≥ 1.
    #[error("Enter a valid page number (an integer >= 1), got '{input}'")]
    InvalidPageNumber { input: String },

    /// An uploaded file does not match the selected input mode.
    #[error("Upload '{name}' is not supported: {reason}")]
    UnsupportedUpload { name: String, reason: String },

    /// A step was called in a stage where it does not apply.
    #[error("Cannot {step} now: {reason}")]
    InvalidStep {
        step: &'static str,
        reason: &'static str,
    },

    /// The session's temporary workspace could not be created or written.
    #[error("Session workspace error: {0}")]
    Workspace(#[source] std::io::Error),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Compare(#[from] CompareError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_names_page_and_total() {
        let e = RasterError::PageOutOfRange { page: 6, total: 5 };
        let msg = e.to_string();
        assert!(msg.contains("6"), "got: {msg}");
        assert!(msg.contains("5 pages"), "got: {msg}");
    }

    #[test]
    fn service_error_user_message_is_verbatim() {
        let e = CompareError::Service {
            status: 400,
            message: "bad method".into(),
        };
        assert_eq!(e.user_message(), "bad method");
        assert!(e.to_string().contains("HTTP 400"));
    }

    #[test]
    fn raster_error_passes_through_session_error() {
        let inner = RasterError::PageOutOfRange { page: 4, total: 3 };
        let expected = inner.to_string();
        let e = SessionError::from(inner);
        assert_eq!(e.to_string(), expected);
    }

    #[test]
    fn wrong_file_count_display() {
        let e = SessionError::WrongFileCount { got: 3 };
        assert!(e.to_string().contains("got 3"));
    }

    #[test]
    fn unsupported_format_lists_alternatives() {
        let e = RasterError::UnsupportedFormat {
            format: "tiff".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("tiff"));
        assert!(msg.contains("png"));
    }
}
