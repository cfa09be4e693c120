mod pdf;

use std::path::Path;

use crate::error::{AppError, AppResult};

/// Turn an uploaded email file into plain text.
///
/// Dispatch is on the filename extension (case-insensitive): `.txt` is
/// decoded as UTF-8, `.pdf` goes through the text-layer extractor. Anything
/// else is rejected.
pub fn read_text_from_file(filename: &str, bytes: &[u8]) -> AppResult<String> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "txt" => String::from_utf8(bytes.to_vec()).map_err(|e| {
            AppError::BadRequest(format!("file {} is not valid UTF-8: {}", filename, e))
        }),
        "pdf" => pdf::extract_text(bytes),
        other => {
            let shown = if other.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{}", other)
            };
            Err(AppError::UnsupportedFormat(shown))
        }
    }
}
