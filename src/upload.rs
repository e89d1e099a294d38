use bytes::Bytes;

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// One file part of an upload request.
#[derive(Clone, Debug)]
pub struct UploadItem {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadItem {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            data,
        }
    }

    pub fn is_allowed(&self) -> bool {
        is_allowed_file(&self.file_name)
    }
}

/// Whether the file name carries one of [`ALLOWED_EXTENSIONS`], case-insensitive.
pub fn is_allowed_file(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Reduce a client supplied file name to a safe single path component made of
/// ASCII letters, digits, `_`, `-` and `.`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let joined = file_name
        .replace(['/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "frame".to_string()
    } else {
        trimmed.to_string()
    }
}
