//! `GET /uploads/{filename}`
//!
//! Serves images stored by the disk backend with caching headers and
//! single-range requests.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{
        header::{
            ACCEPT_RANGES, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG,
            IF_NONE_MATCH, IF_RANGE, LAST_MODIFIED, RANGE,
        },
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::ops::RangeInclusive;
use tokio::fs;

use crate::error::ServerError;
use crate::state::AppState;
use crate::storage::{resolve_in, StorageError};

/// Cache lifetime of served images, in seconds
pub const CACHE_MAX_AGE: u32 = 86_400;

/// Serve a stored upload
///
/// # Errors
///
/// - 400 for names that are not plain file names
/// - 404 for unknown files or when the disk backend is not in use
/// - 416 for ranges outside the file
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let dir = state
        .served_dir()
        .ok_or_else(|| ServerError::NotFound(filename.clone()))?;
    let path = resolve_in(dir, &filename).map_err(|_| ServerError::InvalidPath(filename.clone()))?;

    let (data, modified) = match fs::read(&path).await {
        Ok(data) => {
            let modified = fs::metadata(&path).await.ok().and_then(|m| m.modified().ok());
            (data, modified.map(DateTime::<Utc>::from))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(ServerError::NotFound(filename)),
        Err(e) => return Err(ServerError::Internal(StorageError::Io(e))),
    };

    let etag = format!(
        r#""{}-{}""#,
        data.len(),
        modified.map_or(0, |m| m.timestamp_millis())
    );
    let content_type = mime_guess::from_path(&path).first_or_octet_stream().to_string();

    if headers
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == etag)
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let if_range_matches = headers
        .get(IF_RANGE)
        .is_none_or(|v| v.to_str().is_ok_and(|v| v == etag));
    let range = headers
        .get(RANGE)
        .filter(|_| if_range_matches)
        .and_then(|v| v.to_str().ok());

    let mut response = Response::builder()
        .header(CONTENT_TYPE, content_type)
        .header(ETAG, &etag)
        .header(ACCEPT_RANGES, "bytes")
        .header(CACHE_CONTROL, format!("public, max-age={CACHE_MAX_AGE}"));
    if let Some(modified) = modified {
        response = response.header(
            LAST_MODIFIED,
            modified.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        );
    }

    let size = data.len();
    let response = match range.map(|r| parse_range(r, size)) {
        Some(Some(Ok(range))) => response
            .status(StatusCode::PARTIAL_CONTENT)
            .header(CONTENT_RANGE, format!("bytes {}-{}/{size}", range.start(), range.end()))
            .header(CONTENT_LENGTH, range.end() - range.start() + 1)
            .body(Body::from(data[range].to_vec())),
        Some(Some(Err(()))) => return Err(ServerError::RangeNotSatisfiable(size)),
        // absent or malformed ranges get the whole file
        Some(None) | None => response
            .status(StatusCode::OK)
            .header(CONTENT_LENGTH, size)
            .body(Body::from(data)),
    };

    Ok(response.unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}

/// Parse a single `bytes=` range against a file of `size` bytes
///
/// Returns `None` for headers that are not a single byte range and
/// `Some(Err(()))` for ranges that lie outside the file.
fn parse_range(header: &str, size: usize) -> Option<Result<RangeInclusive<usize>, ()>> {
    let ranges = header.strip_prefix("bytes=")?;
    if ranges.contains(',') {
        return None;
    }
    let (start, end) = ranges.split_once('-')?;

    if size == 0 {
        return Some(Err(()));
    }
    let last = size - 1;

    let range = if start.is_empty() {
        let suffix: usize = end.parse().ok()?;
        if suffix == 0 {
            return Some(Err(()));
        }
        size.saturating_sub(suffix)..=last
    } else {
        let start: usize = start.parse().ok()?;
        let end = if end.is_empty() {
            last
        } else {
            end.parse::<usize>().ok()?.min(last)
        };
        start..=end
    };

    if range.start() > range.end() || *range.start() >= size {
        return Some(Err(()));
    }
    Some(Ok(range))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("bytes=0-3", 10), Some(Ok(0..=3)));
        assert_eq!(parse_range("bytes=5-", 10), Some(Ok(5..=9)));
        assert_eq!(parse_range("bytes=-4", 10), Some(Ok(6..=9)));
        assert_eq!(parse_range("bytes=8-100", 10), Some(Ok(8..=9)));
        assert_eq!(parse_range("bytes=10-12", 10), Some(Err(())));
        assert_eq!(parse_range("bytes=4-2", 10), Some(Err(())));
        assert_eq!(parse_range("bytes=0-1,4-5", 10), None);
        assert_eq!(parse_range("items=0-1", 10), None);
        assert_eq!(parse_range("bytes=a-b", 10), None);
    }
}
