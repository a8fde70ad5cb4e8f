//! CLI binary: compare two drawing revisions through the comparison service.
//!
//! Drives a [`pagediff::Session`] through its steps: upload the two files,
//! extract the chosen page (PDF mode), send the pair to the service, and
//! write every returned image to the output directory with its caption.

use anyhow::{Context, Result};
use clap::Parser;
use pagediff::{
    ClientConfig, ComparisonClient, ComparisonMethod, InputMode, Session, SessionError, Upload,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Page 2 of two PDF revisions, homography alignment
  pagediff --mode pdf rev-a.pdf rev-b.pdf --page 2

  # Two scans, pixel overlay, results into ./diff
  pagediff --mode images a.png b.png --method overlay -o diff

  # Service on another host, give up after 2 minutes
  pagediff --api-url http://10.0.0.5:8000 --timeout 120 --mode pdf a.pdf b.pdf --page 1

METHODS:
  homography   Homography (SIFT) for rotation/scale   (service id: one)
  phase        Phase correlation for exact shift      (service id: three)
  overlay      Pixel-by-pixel image overlay           (service id: two)

ENVIRONMENT VARIABLES:
  PAGEDIFF_API_URL  Comparison service base URL (default http://127.0.0.1:8000)
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
"#;

/// Compare two PDF pages or two images via the comparison service.
#[derive(Parser, Debug)]
#[command(
    name = "pagediff",
    version,
    about = "Compare two drawing revisions via the image comparison service",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// The two files to compare.
    files: Vec<PathBuf>,

    /// Kind of input files.
    #[arg(long, env = "PAGEDIFF_MODE", value_enum, default_value = "pdf")]
    mode: ModeArg,

    /// Page number to compare (PDF mode, 1-based).
    #[arg(short, long, env = "PAGEDIFF_PAGE")]
    page: Option<String>,

    /// Comparison method: homography, phase, overlay (or one, two, three).
    #[arg(short, long, env = "PAGEDIFF_METHOD", default_value = "homography")]
    method: ComparisonMethod,

    /// Comparison service base URL.
    #[arg(long, env = "PAGEDIFF_API_URL", default_value = pagediff::config::DEFAULT_API_BASE_URL)]
    api_url: String,

    /// Directory to write the returned images to.
    #[arg(short, long, env = "PAGEDIFF_OUTPUT", default_value = "pagediff-results")]
    output: PathBuf,

    /// Give up on the service after this many seconds (default: wait indefinitely).
    #[arg(long, env = "PAGEDIFF_TIMEOUT")]
    timeout: Option<u64>,

    /// DPI used to rasterise the selected PDF page.
    #[arg(long, env = "PAGEDIFF_DPI", default_value_t = pagediff::config::DEFAULT_EXTRACTION_DPI)]
    dpi: u32,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAGEDIFF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PAGEDIFF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Pdf,
    Images,
}

impl From<ModeArg> for InputMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Pdf => InputMode::PdfPair,
            ModeArg::Images => InputMode::ImagePair,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", red("✗"), user_message(&e));
            ExitCode::FAILURE
        }
    }
}

/// What the user should read for `e`: the service's own message when it sent
/// one, the session error otherwise, the full context chain for the rest.
fn user_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<SessionError>() {
        Some(SessionError::Compare(inner)) => format!("Error: {}", inner.user_message()),
        Some(other) => format!("Error: {}", other),
        None => format!("{:#}", e),
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = ClientConfig::builder()
        .api_base_url(cli.api_url.clone())
        .extraction_dpi(cli.dpi);
    let config = match cli.timeout {
        Some(secs) => config.timeout_secs(secs),
        None => config,
    }
    .build()
    .context("Invalid configuration")?;

    let client = ComparisonClient::new(&config).context("Failed to create HTTP client")?;
    let mut session = Session::new(config)?;
    let mode = InputMode::from(cli.mode);

    // ── 1. Upload ────────────────────────────────────────────────────────
    let uploads = cli
        .files
        .iter()
        .map(|p| Upload::from_path(p).with_context(|| format!("Failed to read '{}'", p.display())))
        .collect::<Result<Vec<_>>>()?;
    session.upload(mode, uploads)?;
    step(cli, "1", &format!("Uploaded two {}", mode.label().to_lowercase()));

    // ── 2. Extract ───────────────────────────────────────────────────────
    if mode == InputMode::PdfPair {
        let page = cli.page.as_deref().unwrap_or("");
        session.extract_page(page).await?;
        step(cli, "2", &format!("Extracted page {} from both PDFs", page.trim()));
    }

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create '{}'", cli.output.display()))?;

    if let Some(images) = session.ready_images() {
        let captions = match mode {
            InputMode::PdfPair => ["Page from PDF 1", "Page from PDF 2"],
            InputMode::ImagePair => ["Image 1", "Image 2"],
        };
        for (i, (src, caption)) in images.iter().zip(captions).enumerate() {
            let dest = copy_source(src, &cli.output, i + 1)?;
            show(cli, caption, &dest);
        }
    }

    // ── 3. Compare ───────────────────────────────────────────────────────
    step(cli, "3", &format!("Comparing: {}", cli.method.label()));
    let result = session.compare(&client, cli.method).await?;

    // ── 4. Display ───────────────────────────────────────────────────────
    if result.is_empty() {
        step(cli, "4", "The service returned no images");
    } else {
        step(cli, "4", &format!("{} result image(s)", result.len()));
    }
    let saved = result
        .save_all(&cli.output)
        .with_context(|| format!("Failed to save results to '{}'", cli.output.display()))?;
    for (img, path) in result.images.iter().zip(&saved) {
        show(cli, img.caption(), path);
    }

    session.close()?;
    Ok(())
}

fn step(cli: &Cli, n: &str, msg: &str) {
    if !cli.quiet {
        eprintln!("{} {}", cyan(&format!("◆ {n}.")), bold(msg));
    }
}

fn show(cli: &Cli, caption: &str, path: &Path) {
    if cli.quiet {
        return;
    }
    let dims = image::image_dimensions(path)
        .map(|(w, h)| format!("{w}x{h}"))
        .unwrap_or_default();
    println!(
        "  {} {:<28} {}  {}",
        green("✓"),
        caption,
        path.display(),
        dim(&dims)
    );
}

/// Copy a compared input out of the session workspace so it survives the session.
fn copy_source(src: &Path, out_dir: &Path, index: usize) -> Result<PathBuf> {
    let ext = src.extension().and_then(|e| e.to_str()).unwrap_or("png");
    let dest = out_dir.join(format!("source-{index}.{ext}"));
    std::fs::copy(src, &dest)
        .with_context(|| format!("Failed to copy '{}'", src.display()))?;
    Ok(dest)
}
