//! The interactive comparison workflow as an explicit state machine.
//!
//! ```text
//! AwaitingUpload ──upload──▶ Uploaded ──extract_page──▶ Ready ──compare──▶ Displaying
//!                  (PDF pair)                              ▲
//!                ──upload──────────────────────────────────┘
//!                  (image pair)
//! ```
//!
//! A [`Session`] owns a private temporary workspace. Uploaded files and
//! rasterised pages are written there and nowhere else, and the whole
//! directory is removed by [`Session::close`] or when the session is dropped.
//! Each step validates its input before touching state, so a failed step
//! leaves the session where it was and the user can simply retry it.

use crate::compare::{ComparisonClient, ComparisonMethod, ComparisonResult};
use crate::config::ClientConfig;
use crate::error::{RasterError, SessionError};
use crate::raster;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// What kind of files the user is comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Two PDFs; one page of each is rasterised before comparison.
    PdfPair,
    /// Two raster images, compared as they are.
    ImagePair,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            InputMode::PdfPair => "PDF files",
            InputMode::ImagePair => "Images",
        }
    }
}

/// Where a session is in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitingUpload,
    /// Two PDFs uploaded, no page extracted yet.
    Uploaded,
    /// Two images ready for comparison.
    Ready,
    /// A comparison result is available.
    Displaying,
}

/// A file supplied by the user.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original file name, for messages only.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk as an upload.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// The uploaded pair, stored in its own directory inside the workspace.
#[derive(Debug)]
struct UploadedPair {
    mode: InputMode,
    dir: PathBuf,
    inputs: [PathBuf; 2],
}

/// One user's comparison session.
#[derive(Debug)]
pub struct Session {
    config: ClientConfig,
    workspace: TempDir,
    generation: u32,
    pair: Option<UploadedPair>,
    images: Option<[PathBuf; 2]>,
    result: Option<(ComparisonMethod, ComparisonResult)>,
}

impl Session {
    /// Start a session with a fresh temporary workspace.
    pub fn new(config: ClientConfig) -> Result<Self, SessionError> {
        let workspace = tempfile::Builder::new()
            .prefix("pagediff-")
            .tempdir()
            .map_err(SessionError::Workspace)?;
        debug!("Session workspace: {}", workspace.path().display());

        Ok(Self {
            config,
            workspace,
            generation: 0,
            pair: None,
            images: None,
            result: None,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        match (&self.pair, &self.images, &self.result) {
            (None, _, _) => Stage::AwaitingUpload,
            (Some(_), None, _) => Stage::Uploaded,
            (Some(_), Some(_), None) => Stage::Ready,
            (Some(_), Some(_), Some(_)) => Stage::Displaying,
        }
    }

    pub fn mode(&self) -> Option<InputMode> {
        self.pair.as_ref().map(|p| p.mode)
    }

    /// Root of the session's temporary workspace.
    pub fn workspace(&self) -> &Path {
        self.workspace.path()
    }

    /// The uploaded files as stored in the workspace.
    pub fn inputs(&self) -> Option<[&Path; 2]> {
        self.pair
            .as_ref()
            .map(|p| [p.inputs[0].as_path(), p.inputs[1].as_path()])
    }

    /// The two images that will be sent for comparison.
    pub fn ready_images(&self) -> Option<[&Path; 2]> {
        self.images
            .as_ref()
            .map(|i| [i[0].as_path(), i[1].as_path()])
    }

    pub fn result(&self) -> Option<&ComparisonResult> {
        self.result.as_ref().map(|(_, r)| r)
    }

    /// Method used for the current result.
    pub fn result_method(&self) -> Option<ComparisonMethod> {
        self.result.as_ref().map(|(m, _)| *m)
    }

    /// Accept the user's files, replacing any previous pair.
    ///
    /// Exactly two uploads are required. PDFs must start with `%PDF`; images
    /// must be PNG or JPEG. In image mode the session is immediately
    /// [`Stage::Ready`]; in PDF mode a page must be extracted first.
    pub fn upload(&mut self, mode: InputMode, uploads: Vec<Upload>) -> Result<(), SessionError> {
        let [first, second]: [Upload; 2] = uploads
            .try_into()
            .map_err(|v: Vec<Upload>| SessionError::WrongFileCount { got: v.len() })?;

        let ext1 = check_upload(mode, &first)?;
        let ext2 = check_upload(mode, &second)?;
        if first.bytes == second.bytes {
            warn!(
                "'{}' and '{}' have identical contents; the comparison will show no changes",
                first.name, second.name
            );
        }

        self.generation += 1;
        let dir = self.workspace.path().join(format!("upload-{}", self.generation));
        std::fs::create_dir_all(&dir).map_err(SessionError::Workspace)?;

        let inputs = [
            write_input(&dir, 1, ext1, &first)?,
            write_input(&dir, 2, ext2, &second)?,
        ];

        self.discard_pair();
        self.images = match mode {
            InputMode::ImagePair => Some(inputs.clone()),
            InputMode::PdfPair => None,
        };
        self.pair = Some(UploadedPair { mode, dir, inputs });

        info!(
            "Uploaded {} '{}' and '{}'",
            mode.label().to_lowercase(),
            first.name,
            second.name
        );
        Ok(())
    }

    /// Rasterise page `page_input` of both uploaded PDFs.
    ///
    /// `page_input` is the text the user typed; it must be an integer ≥ 1.
    /// Whether the page exists is checked against each document, and the
    /// rasterizer's error is returned unchanged if it does not. Any earlier
    /// extraction is discarded first, so on error the session is back at
    /// [`Stage::Uploaded`].
    pub async fn extract_page(&mut self, page_input: &str) -> Result<[&Path; 2], SessionError> {
        let pair = self.pair.as_ref().ok_or(SessionError::InvalidStep {
            step: "extract a page",
            reason: "no files have been uploaded",
        })?;
        if pair.mode == InputMode::ImagePair {
            return Err(SessionError::InvalidStep {
                step: "extract a page",
                reason: "image uploads have no pages",
            });
        }

        // A failed extraction must not leave an older page pair ready.
        self.images = None;
        self.result = None;

        let page = parse_page_number(page_input)?;
        let options = self.config.extraction_options(page);

        let mut extracted = Vec::with_capacity(2);
        for (i, pdf) in pair.inputs.iter().enumerate() {
            let out_dir = pair.dir.join(format!("pages-{}", i + 1));
            tokio::fs::create_dir_all(&out_dir)
                .await
                .map_err(SessionError::Workspace)?;

            let written = raster::rasterize_async(pdf, &out_dir, &options).await?;
            let image = written.into_iter().next().ok_or_else(|| {
                RasterError::Internal(format!("page {} of {} was not written", page, pdf.display()))
            })?;
            extracted.push(image);
        }

        let [img1, img2]: [PathBuf; 2] = extracted
            .try_into()
            .map_err(|_| RasterError::Internal("expected two extracted pages".into()))?;
        info!("Extracted page {} from both PDFs", page);

        let images = self.images.insert([img1, img2]);
        Ok([images[0].as_path(), images[1].as_path()])
    }

    /// Send the ready pair to the comparison service.
    ///
    /// May be called again from [`Stage::Displaying`] to compare with another
    /// method; the previous result is replaced.
    pub async fn compare(
        &mut self,
        client: &ComparisonClient,
        method: ComparisonMethod,
    ) -> Result<&ComparisonResult, SessionError> {
        let images = self.images.as_ref().ok_or(SessionError::InvalidStep {
            step: "compare",
            reason: "two images are not ready yet",
        })?;

        self.result = None;
        let result = client.compare(&images[0], &images[1], method).await?;

        let (_, result) = self.result.insert((method, result));
        Ok(result)
    }

    /// Delete the workspace now, reporting any I/O error.
    ///
    /// Dropping the session removes it too, silently.
    pub fn close(self) -> Result<(), SessionError> {
        let path = self.workspace.path().to_path_buf();
        self.workspace.close().map_err(SessionError::Workspace)?;
        debug!("Removed session workspace {}", path.display());
        Ok(())
    }

    fn discard_pair(&mut self) {
        self.images = None;
        self.result = None;
        if let Some(old) = self.pair.take() {
            if let Err(e) = std::fs::remove_dir_all(&old.dir) {
                warn!("Could not remove {}: {}", old.dir.display(), e);
            }
        }
    }
}

/// Parse a user-typed page number: an integer ≥ 1.
pub fn parse_page_number(input: &str) -> Result<usize, SessionError> {
    match input.trim().parse::<usize>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(SessionError::InvalidPageNumber {
            input: input.to_string(),
        }),
    }
}

/// Check an upload against the mode and return the extension to store it under.
fn check_upload(mode: InputMode, upload: &Upload) -> Result<&'static str, SessionError> {
    match mode {
        InputMode::PdfPair => {
            raster::validate_pdf_bytes(Path::new(&upload.name), &upload.bytes)?;
            Ok("pdf")
        }
        InputMode::ImagePair => match image::guess_format(&upload.bytes) {
            Ok(ImageFormat::Png) => Ok("png"),
            Ok(ImageFormat::Jpeg) => Ok("jpg"),
            Ok(other) => Err(SessionError::UnsupportedUpload {
                name: upload.name.clone(),
                reason: format!("{:?} images are not supported (use PNG or JPEG)", other),
            }),
            Err(_) => Err(SessionError::UnsupportedUpload {
                name: upload.name.clone(),
                reason: "not a PNG or JPEG image".to_string(),
            }),
        },
    }
}

fn write_input(dir: &Path, index: usize, ext: &str, upload: &Upload) -> Result<PathBuf, SessionError> {
    let path = dir.join(format!("input-{}.{}", index, ext));
    std::fs::write(&path, &upload.bytes).map_err(SessionError::Workspace)?;
    Ok(path)
}
