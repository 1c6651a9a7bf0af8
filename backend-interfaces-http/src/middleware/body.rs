use std::io::Read;

use axum::http::{header, HeaderMap};
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use thiserror::Error;

use backend_domain::SheetFormat;

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("upload too large")]
    TooLarge,
    #[error("invalid gzip body: {0}")]
    Gzip(#[from] std::io::Error),
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_json<T: DeserializeOwned>(
    headers: &HeaderMap,
    body: &[u8],
    max_bytes: u64,
) -> Result<T, BodyError> {
    let content = maybe_gunzip(headers, body, max_bytes)?;
    Ok(serde_json::from_slice(&content)?)
}

/// Spreadsheet format from `Content-Type`, falling back to the file signature.
pub fn sheet_format(headers: &HeaderMap, body: &[u8]) -> SheetFormat {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(SheetFormat::from_content_type)
        .unwrap_or_else(|| SheetFormat::sniff(body))
}

/// Inflates a gzip body, stopping once the output passes `max_bytes`.
pub fn maybe_gunzip(headers: &HeaderMap, body: &[u8], max_bytes: u64) -> Result<Vec<u8>, BodyError> {
    if let Some(encoding) = headers.get(header::CONTENT_ENCODING) {
        if encoding.to_str().unwrap_or("").trim().eq_ignore_ascii_case("gzip") {
            let mut decoder = GzDecoder::new(body).take(max_bytes.saturating_add(1));
            let mut out = Vec::new();
            decoder.read_to_end(&mut out)?;
            if out.len() as u64 > max_bytes {
                return Err(BodyError::TooLarge);
            }
            return Ok(out);
        }
    }
    Ok(body.to_vec())
}
