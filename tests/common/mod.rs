//! Shared helpers for the integration tests: a minimal PDF writer, PNG
//! fixtures and an in-process stand-in for the comparison service.

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Skip the current test when the pdfium library cannot be loaded.
macro_rules! require_pdfium {
    () => {
        if let Err(e) = pagediff::engine::bind() {
            println!("SKIP: pdfium not available ({e})");
            return;
        }
    };
}

// ── PDF fixtures ─────────────────────────────────────────────────────────────

/// A PDF with `pages` blank US-letter pages (612 × 792 pt).
pub fn blank_pdf(pages: usize) -> Vec<u8> {
    pdf_with_pages(&vec![(612, 792); pages])
}

/// A PDF with one blank page per `(width, height)` entry, in points.
pub fn pdf_with_pages(sizes: &[(u32, u32)]) -> Vec<u8> {
    let page_ids: Vec<usize> = (0..sizes.len()).map(|i| i + 3).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", sizes.len()),
    ];
    for (w, h) in sizes {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w} {h}] >>"
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in offsets {
        xref.push_str(&format!("{off:010} 00000 n \n"));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    ));
    out.extend_from_slice(xref.as_bytes());
    out
}

// ── Image fixtures ───────────────────────────────────────────────────────────

/// A small solid-colour PNG.
pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(color));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

pub fn png_base64(width: u32, height: u32, color: [u8; 4]) -> String {
    STANDARD.encode(png_bytes(width, height, color))
}

// ── Mock comparison service ──────────────────────────────────────────────────

/// What the mock answers to every request.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
            delay: None,
        }
    }

    /// HTTP 200 with one PNG per key.
    pub fn images(keys: &[&str]) -> Self {
        let images: serde_json::Map<String, serde_json::Value> = keys
            .iter()
            .map(|k| (k.to_string(), png_base64(8, 6, [200, 30, 30, 255]).into()))
            .collect();
        Self::json(200, serde_json::json!({ "images": images }))
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// One request as the mock received it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct MockState {
    reply: Arc<Reply>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

/// A running mock service; dropped with the test's runtime.
pub struct MockService {
    pub base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockService {
    pub async fn start(reply: Reply) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            reply: Arc::new(reply),
            seen: seen.clone(),
        };
        let app = Router::new()
            .route("/api/methods/", post(handle))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock service");
        let addr = listener.local_addr().expect("mock address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{addr}"),
            seen,
        }
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().expect("mock lock").clone()
    }
}

async fn handle(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    state.seen.lock().expect("mock lock").push(Seen {
        method: query.get("method").cloned(),
        body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
    });

    if let Some(delay) = state.reply.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(state.reply.status).expect("valid status");
    (
        status,
        [(header::CONTENT_TYPE, state.reply.content_type)],
        state.reply.body.clone(),
    )
        .into_response()
}
