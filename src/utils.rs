// src/utils.rs
use std::path::Path;

use crate::error::ValidationError;

/// Upload limit enforced before any network call.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "html", "htm", "txt"];

/// A resume file picked for upload.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume")
            .to_string();
        Ok(Self { file_name, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Size, type and emptiness checks run before the file leaves the client.
pub fn validate_source_file(file: &SourceFile) -> Result<(), ValidationError> {
    if file.size() > MAX_UPLOAD_BYTES {
        return Err(ValidationError::FileTooLarge {
            size: file.size(),
            limit: MAX_UPLOAD_BYTES,
        });
    }

    let ext = get_file_extension(&file.file_name).unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ValidationError::UnsupportedFileType { extension: ext });
    }

    if file.bytes.is_empty() {
        return Err(ValidationError::EmptyFile);
    }

    Ok(())
}

/// Content type for the multipart part
pub fn content_type_for(file_name: &str) -> &'static str {
    match get_file_extension(file_name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("html") | Some("htm") => "text/html",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Cut to at most `max` characters (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("test.pdf"), Some("pdf".to_string()));
        assert_eq!(
            get_file_extension("document.DOCX"),
            Some("docx".to_string())
        );
        assert_eq!(get_file_extension("noext"), None);
    }

    #[test]
    fn test_validate_source_file() {
        assert!(validate_source_file(&SourceFile::new("cv.pdf", vec![1])).is_ok());
        assert!(validate_source_file(&SourceFile::new("cv.TXT", vec![1])).is_ok());
        assert_eq!(
            validate_source_file(&SourceFile::new("cv.png", vec![1])),
            Err(ValidationError::UnsupportedFileType {
                extension: "png".to_string()
            })
        );
        assert_eq!(
            validate_source_file(&SourceFile::new("cv.pdf", Vec::new())),
            Err(ValidationError::EmptyFile)
        );
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let at_limit = SourceFile::new("cv.pdf", vec![0; MAX_UPLOAD_BYTES as usize]);
        assert!(validate_source_file(&at_limit).is_ok());

        let over = SourceFile::new("cv.pdf", vec![0; MAX_UPLOAD_BYTES as usize + 1]);
        assert!(matches!(
            validate_source_file(&over),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.pdf"), "application/pdf");
        assert_eq!(content_type_for("a.htm"), "text/html");
    }
}
