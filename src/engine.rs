//! Binding to the pdfium shared library.
//!
//! Resolution order, first match wins:
//!
//! 1. `PDFIUM_LIB_PATH`: a library file, or a directory containing the
//!    platform library (`libpdfium.so`, `libpdfium.dylib`, `pdfium.dll`).
//! 2. The platform library next to the running executable.
//! 3. The system library search path.

use crate::error::RasterError;
use pdfium_render::prelude::Pdfium;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable pointing at an existing pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to pdfium using the resolution order above.
pub fn bind() -> Result<Pdfium, RasterError> {
    if let Ok(value) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !value.is_empty() {
            let path = library_path_from(Path::new(&value));
            if !path.exists() {
                return Err(RasterError::EngineUnavailable(format!(
                    "{}='{}' does not exist",
                    PDFIUM_LIB_PATH_ENV,
                    path.display()
                )));
            }
            return bind_from_path(&path);
        }
    }

    if let Some(path) = beside_executable() {
        debug!("Binding pdfium next to executable: {}", path.display());
        return bind_from_path(&path);
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| RasterError::EngineUnavailable(format!("{:?}", e)))
}

/// Bind to a pdfium library at an explicit `path`.
pub fn bind_from_path(path: &Path) -> Result<Pdfium, RasterError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| {
            RasterError::EngineUnavailable(format!("'{}': {:?}", path.display(), e))
        })
}

/// Accept either the library file itself or its directory.
fn library_path_from(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(Pdfium::pdfium_platform_library_name())
    } else {
        path.to_path_buf()
    }
}

fn beside_executable() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let candidate = exe.parent()?.join(Pdfium::pdfium_platform_library_name());
    candidate.exists().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_resolves_to_platform_library() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = library_path_from(dir.path());
        assert!(resolved.starts_with(dir.path()));
        let name = resolved.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.contains("pdfium"), "got: {name}");
    }

    #[test]
    fn file_path_is_kept() {
        let p = Path::new("/opt/pdfium/lib/libpdfium.so");
        assert_eq!(library_path_from(p), p.to_path_buf());
    }

    #[test]
    fn binding_missing_library_fails_cleanly() {
        let err = bind_from_path(Path::new("/definitely/not/libpdfium.so")).unwrap_err();
        assert!(matches!(err, RasterError::EngineUnavailable(_)));
    }
}
