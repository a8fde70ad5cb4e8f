//! Input validation: make sure a path points at a readable PDF before pdfium
//! is asked to open it.
//!
//! pdfium reports every failure to open as one opaque error. Checking
//! existence, read permission and the `%PDF` magic bytes first lets callers
//! tell a typo in the path from a JPEG renamed to `.pdf`.

use crate::error::RasterError;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Validate that `path` exists, is readable and starts with `%PDF`.
pub fn validate_pdf(path: &Path) -> Result<(), RasterError> {
    if !path.exists() {
        return Err(RasterError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(f) => {
            let mut head = Vec::with_capacity(PDF_MAGIC.len());
            f.take(PDF_MAGIC.len() as u64)
                .read_to_end(&mut head)
                .map_err(|source| RasterError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            validate_pdf_bytes(path, &head)?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(RasterError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(RasterError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Validated PDF: {}", path.display());
    Ok(())
}

/// Validate in-memory PDF bytes. `name` is used only for the error.
pub fn validate_pdf_bytes(name: &Path, bytes: &[u8]) -> Result<(), RasterError> {
    if bytes.starts_with(PDF_MAGIC) {
        return Ok(());
    }
    let mut magic = [0u8; 4];
    let n = bytes.len().min(magic.len());
    magic[..n].copy_from_slice(&bytes[..n]);
    Err(RasterError::NotAPdf {
        path: name.to_path_buf(),
        magic,
    })
}
