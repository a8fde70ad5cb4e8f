//! CLI binary: rasterise PDF pages to image files.
//!
//! A thin shim over [`pagediff::rasterize`] that maps CLI flags to
//! `RasterOptions` and reports what was written.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pagediff::raster::validate_pdf;
use pagediff::{inspect, rasterize, PageSelection, RasterOptions, RasterProgressCallback};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

struct CliProgress {
    bar: ProgressBar,
    started: Instant,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Opening");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self {
            bar,
            started: Instant::now(),
        })
    }
}

impl RasterProgressCallback for CliProgress {
    fn on_render_start(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Rendering");
    }

    fn on_page_rendered(&self, page: usize, _total: usize, path: &Path) {
        self.bar.println(format!(
            "  {} Page {:>3}  {}",
            green("✓"),
            page,
            dim(&path.display().to_string())
        ));
        self.bar.inc(1);
    }

    fn on_render_complete(&self, rendered: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} page(s) in {:.1}s",
            green("✔"),
            bold(&rendered.to_string()),
            self.started.elapsed().as_secs_f64()
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Every page at 300 DPI as PNG
  pdf2img drawings.pdf out/

  # Page 2 only, JPEG at 150 DPI
  pdf2img --page 2 --image-format jpeg --dpi 150 drawings.pdf out/

  # Page count and metadata
  pdf2img --inspect-only drawings.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  RUST_LOG          Log filter, e.g. pagediff=debug
"#;

/// Convert PDF pages to images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Convert PDF pages to images",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the input PDF file.
    input_pdf: PathBuf,

    /// Path to the output directory for images (created if missing).
    /// Not needed with --inspect-only.
    #[arg(required_unless_present = "inspect_only")]
    output_dir: Option<PathBuf>,

    /// Image format (e.g. png, jpeg).
    #[arg(long, env = "PDF2IMG_IMAGE_FORMAT", default_value = "png")]
    image_format: String,

    /// Resolution in DPI.
    #[arg(long, env = "PDF2IMG_DPI", default_value_t = 300)]
    dpi: u32,

    /// Convert only a specific page (1-based index).
    #[arg(long, env = "PDF2IMG_PAGE")]
    page: Option<usize>,

    /// Print page count and metadata only, no rendering.
    #[arg(long)]
    inspect_only: bool,

    /// Print metadata as JSON (with --inspect-only).
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if !cli.input_pdf.exists() {
        anyhow::bail!(
            "Input PDF file '{}' does not exist.",
            cli.input_pdf.display()
        );
    }
    validate_pdf(&cli.input_pdf).context("Cannot read input PDF")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = inspect(&cli.input_pdf).context("Failed to inspect PDF")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input_pdf.display());
            if let Some(ref t) = info.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = info.author {
                println!("Author:       {}", a);
            }
            println!("Pages:        {}", info.page_count);
            println!("PDF Version:  {}", info.pdf_version);
        }
        return Ok(());
    }

    let Some(output_dir) = cli.output_dir.as_deref() else {
        anyhow::bail!("An output directory is required unless --inspect-only is given.");
    };
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory '{}'",
            output_dir.display()
        )
    })?;

    let mut builder = RasterOptions::builder()
        .format(cli.image_format.clone())
        .dpi(cli.dpi)
        .pages(PageSelection::from(cli.page));
    if show_progress {
        builder = builder.progress(CliProgress::new());
    }
    let options = builder.build().context("Invalid options")?;

    rasterize(&cli.input_pdf, output_dir, &options).context("Conversion failed")?;

    if !cli.quiet {
        match cli.page {
            Some(page) => println!(
                "Successfully converted page {} to {} in '{}'",
                page,
                cli.image_format,
                output_dir.display()
            ),
            None => println!(
                "Successfully converted all PDF pages to {} images in '{}'",
                cli.image_format,
                output_dir.display()
            ),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn inspect_only_needs_no_output_dir() {
        let cli = Cli::try_parse_from(["pdf2img", "--inspect-only", "doc.pdf"]).unwrap();
        assert!(cli.inspect_only);
        assert_eq!(cli.output_dir, None);
    }

    #[test]
    fn rendering_requires_output_dir() {
        let err = Cli::try_parse_from(["pdf2img", "doc.pdf"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from(["pdf2img", "--page", "2", "doc.pdf", "out"]).unwrap();
        assert_eq!(cli.output_dir.as_deref(), Some(Path::new("out")));
        assert_eq!(cli.page, Some(2));
    }
}
