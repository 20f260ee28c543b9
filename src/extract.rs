//! Document Reader: extract plain text from a PDF expense request.
//!
//! ## Why spawn_blocking?
//!
//! lopdf parses the whole document synchronously; on a large scanned
//! request that is CPU-bound work that would stall a Tokio worker thread.
//! `tokio::task::spawn_blocking` moves it onto the blocking pool, same as
//! any other CPU-heavy PDF work in an async service.
//!
//! ## Extraction contract
//!
//! Pages are read in page order and their extracted text concatenated with
//! no separator. Extraction is best-effort: a scanned or image-only PDF
//! yields empty or garbled text, and that is passed on unchanged — there
//! is no OCR fallback and no retry. Identical bytes always produce
//! identical output.

use crate::error::AuditError;
use lopdf::Document;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extract the text of every page of the PDF at `path`, in page order.
///
/// The file must exist; callers are expected to have resolved the path
/// through the document store first, so any failure here is an extraction
/// error, not a not-found.
pub async fn extract_text(path: &Path) -> Result<String, AuditError> {
    let name = display_name(path);
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || extract_text_blocking(&path))
        .await
        .map_err(|e| AuditError::Extraction {
            name,
            detail: format!("extraction task panicked: {e}"),
        })?
}

fn extract_text_blocking(path: &Path) -> Result<String, AuditError> {
    let name = display_name(path);

    // Check the magic bytes up front so a mislabeled upload produces a
    // readable error instead of a parser backtrace.
    let mut magic = [0u8; 4];
    let mut file = std::fs::File::open(path).map_err(|e| AuditError::Extraction {
        name: name.clone(),
        detail: e.to_string(),
    })?;
    if file.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
        return Err(AuditError::Extraction {
            name,
            detail: format!("not a PDF (first bytes: {magic:?})"),
        });
    }

    let doc = Document::load(path).map_err(|e| AuditError::Extraction {
        name: name.clone(),
        detail: e.to_string(),
    })?;

    let mut text = String::new();
    for (page_num, _page_id) in doc.get_pages() {
        let content = doc
            .extract_text(&[page_num])
            .map_err(|e| AuditError::Extraction {
                name: name.clone(),
                detail: format!("page {page_num}: {e}"),
            })?;
        text.push_str(&content);
    }

    debug!("extracted {} chars from '{}'", text.len(), name);
    Ok(text)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
