//! Content sniffing capability.
//!
//! Classifies file contents (never the extension) into a coarse mime
//! category: magic-byte detection for container formats, then a UTF-8
//! heuristic that separates textual payloads from opaque binaries.
//!
//! License: MIT OR Apache-2.0

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::trace;

use crate::errors::ScrubError;

/// How many leading bytes are inspected.
pub const SNIFF_WINDOW: usize = 8192;

/// Category reported for zero-length files; it belongs to no allow-list.
pub const EMPTY_CATEGORY: &str = "application/x-empty";

/// Sniffs the mime category of the file at `path`.
///
/// A path that vanished between detection and inspection surfaces as
/// `ScrubError::SourceVanished`, which callers treat as "ignore this
/// event" rather than a hard failure.
pub fn sniff(path: &Path) -> Result<String, ScrubError> {
    let mut file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ScrubError::SourceVanished(path.to_path_buf())
        } else {
            ScrubError::IoError(e)
        }
    })?;

    let mut head = vec![0u8; SNIFF_WINDOW];
    let mut filled = 0usize;
    loop {
        let n = file.read(&mut head[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
        if filled == head.len() {
            break;
        }
    }
    let head = &head[..filled];

    if head.is_empty() {
        return Ok(EMPTY_CATEGORY.to_string());
    }

    if let Some(kind) = infer::get(head) {
        trace!("{}: magic bytes report {}", path.display(), kind.mime_type());
        return Ok(kind.mime_type().to_string());
    }

    if looks_textual(head) {
        Ok("text/plain".to_string())
    } else {
        Ok("application/octet-stream".to_string())
    }
}

/// A sample is textual when it decodes as UTF-8 (allowing one truncated
/// trailing character at the window boundary) and contains no NUL bytes.
fn looks_textual(sample: &[u8]) -> bool {
    if sample.contains(&0) {
        return false;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none() && e.valid_up_to() + 4 >= sample.len(),
    }
}
