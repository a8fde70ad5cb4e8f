//! Configuration types for rasterisation and comparison.
//!
//! [`RasterOptions`] controls a single `rasterize` call; [`ClientConfig`]
//! controls an interactive comparison session (where the service lives and
//! how uploaded PDFs are rasterised before comparison). Both are built via
//! builders that validate their constraints in `build()`.

use crate::error::RasterError;
use crate::progress::RasterProgress;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default rasterisation DPI for the standalone tool.
pub const DEFAULT_DPI: u32 = 300;

/// DPI used when a session extracts a page for comparison.
pub const DEFAULT_EXTRACTION_DPI: u32 = 150;

/// Base URL of the comparison service.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Upper bound on DPI. A4 at 2400 DPI is already ~20k × 28k px.
pub const MAX_DPI: u32 = 2400;

/// Options for a single rasterisation.
///
/// # Example
/// ```rust
/// use pagediff::{PageSelection, RasterOptions};
///
/// let options = RasterOptions::builder()
///     .dpi(150)
///     .format("jpeg")
///     .pages(PageSelection::Single(2))
///     .build()
///     .unwrap();
/// assert_eq!(options.scale(), 150.0 / 72.0);
/// ```
#[derive(Clone)]
pub struct RasterOptions {
    /// Output format name as given by the caller. Default: `"png"`.
    ///
    /// Resolved when the first page is written; also used verbatim as the
    /// file extension.
    pub format: String,

    /// Rendering resolution. Default: 300.
    pub dpi: u32,

    /// Which pages to render. Default: all.
    pub pages: PageSelection,

    /// Optional per-page progress events.
    pub progress: Option<RasterProgress>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            format: "png".to_string(),
            dpi: DEFAULT_DPI,
            pages: PageSelection::default(),
            progress: None,
        }
    }
}

impl fmt::Debug for RasterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterOptions")
            .field("format", &self.format)
            .field("dpi", &self.dpi)
            .field("pages", &self.pages)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn RasterProgressCallback>"))
            .finish()
    }
}

impl RasterOptions {
    pub fn builder() -> RasterOptionsBuilder {
        RasterOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Render scale relative to the PDF's 72 points-per-inch baseline.
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Builder for [`RasterOptions`].
pub struct RasterOptionsBuilder {
    options: RasterOptions,
}

impl RasterOptionsBuilder {
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.options.format = format.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.options.dpi = dpi;
        self
    }

    pub fn pages(mut self, pages: PageSelection) -> Self {
        self.options.pages = pages;
        self
    }

    /// Shorthand for `pages(PageSelection::Single(page))`.
    pub fn page(self, page: usize) -> Self {
        self.pages(PageSelection::Single(page))
    }

    pub fn progress(mut self, cb: RasterProgress) -> Self {
        self.options.progress = Some(cb);
        self
    }

    /// Build the options, validating constraints.
    ///
    /// The format is checked when the first page is written; see
    /// [`crate::raster::format`].
    pub fn build(self) -> Result<RasterOptions, RasterError> {
        let o = &self.options;
        if o.dpi == 0 || o.dpi > MAX_DPI {
            return Err(RasterError::InvalidConfig(format!(
                "DPI must be 1–{}, got {}",
                MAX_DPI, o.dpi
            )));
        }
        if o.format.trim().is_empty() {
            return Err(RasterError::InvalidConfig(
                "Image format must not be empty".into(),
            ));
        }
        Ok(self.options)
    }
}

/// Which pages of the PDF to rasterise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Every page, in order (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
}

impl PageSelection {
    /// Expand into 1-based page numbers, rejecting pages outside `[1, total]`.
    pub fn resolve(&self, total_pages: usize) -> Result<Vec<usize>, RasterError> {
        match *self {
            PageSelection::All => Ok((1..=total_pages).collect()),
            PageSelection::Single(p) if p >= 1 && p <= total_pages => Ok(vec![p]),
            PageSelection::Single(p) => Err(RasterError::PageOutOfRange {
                page: p,
                total: total_pages,
            }),
        }
    }
}

impl From<Option<usize>> for PageSelection {
    fn from(page: Option<usize>) -> Self {
        page.map_or(PageSelection::All, PageSelection::Single)
    }
}

/// Configuration for an interactive comparison session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Comparison service base URL, without the `/api/...` path.
    /// Default: `http://127.0.0.1:8000`.
    pub api_base_url: String,

    /// DPI used to rasterise the selected page of each uploaded PDF. Default: 150.
    pub extraction_dpi: u32,

    /// Image format for extracted pages. Default: `"png"`.
    pub extraction_format: String,

    /// Request timeout in seconds. Default: none; the call waits for the
    /// service however long it takes.
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            extraction_dpi: DEFAULT_EXTRACTION_DPI,
            extraction_format: "png".to_string(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Options for rasterising one page of an uploaded PDF.
    pub fn extraction_options(&self, page: usize) -> RasterOptions {
        RasterOptions {
            format: self.extraction_format.clone(),
            dpi: self.extraction_dpi,
            pages: PageSelection::Single(page),
            progress: None,
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn extraction_dpi(mut self, dpi: u32) -> Self {
        self.config.extraction_dpi = dpi;
        self
    }

    pub fn extraction_format(mut self, format: impl Into<String>) -> Self {
        self.config.extraction_format = format.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn build(mut self) -> Result<ClientConfig, RasterError> {
        let url = self.config.api_base_url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(RasterError::InvalidConfig(
                "Comparison service URL must not be empty".into(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RasterError::InvalidConfig(format!(
                "Comparison service URL must be http(s), got '{}'",
                url
            )));
        }
        self.config.api_base_url = url.to_string();

        let c = &self.config;
        if c.extraction_dpi == 0 || c.extraction_dpi > MAX_DPI {
            return Err(RasterError::InvalidConfig(format!(
                "DPI must be 1–{}, got {}",
                MAX_DPI, c.extraction_dpi
            )));
        }
        if c.timeout_secs == Some(0) {
            return Err(RasterError::InvalidConfig("Timeout must be ≥ 1s".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_standalone_tool() {
        let o = RasterOptions::default();
        assert_eq!(o.dpi, 300);
        assert_eq!(o.format, "png");
        assert_eq!(o.pages, PageSelection::All);
    }

    #[test]
    fn scale_is_dpi_over_72() {
        let o = RasterOptions::builder().dpi(144).build().unwrap();
        assert_eq!(o.scale(), 2.0);
    }

    #[test]
    fn zero_dpi_rejected() {
        assert!(RasterOptions::builder().dpi(0).build().is_err());
        assert!(RasterOptions::builder().dpi(MAX_DPI + 1).build().is_err());
    }

    #[test]
    fn resolve_single_page_in_range() {
        assert_eq!(PageSelection::Single(2).resolve(3).unwrap(), vec![2]);
        assert_eq!(PageSelection::Single(3).resolve(3).unwrap(), vec![3]);
    }

    #[test]
    fn resolve_rejects_zero_and_past_end() {
        for page in [0, 4] {
            let err = PageSelection::Single(page).resolve(3).unwrap_err();
            match err {
                RasterError::PageOutOfRange { page: p, total } => {
                    assert_eq!(p, page);
                    assert_eq!(total, 3);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn resolve_all_is_one_based_and_ordered() {
        assert_eq!(PageSelection::All.resolve(4).unwrap(), vec![1, 2, 3, 4]);
        assert!(PageSelection::All.resolve(0).unwrap().is_empty());
    }

    #[test]
    fn client_config_trims_trailing_slash() {
        let c = ClientConfig::builder()
            .api_base_url("http://localhost:9000/")
            .build()
            .unwrap();
        assert_eq!(c.api_base_url, "http://localhost:9000");
        assert_eq!(c.extraction_dpi, 150);
        assert_eq!(c.timeout_secs, None);
    }

    #[test]
    fn client_config_rejects_non_http_url() {
        assert!(ClientConfig::builder().api_base_url("ftp://x").build().is_err());
        assert!(ClientConfig::builder().api_base_url("  ").build().is_err());
    }

    #[test]
    fn extraction_options_select_one_page() {
        let c = ClientConfig::default();
        let o = c.extraction_options(2);
        assert_eq!(o.pages, PageSelection::Single(2));
        assert_eq!(o.dpi, 150);
        assert_eq!(o.format, "png");
    }
}
