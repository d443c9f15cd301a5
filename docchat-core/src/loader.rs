//! Loading plain-text documents from disk.

use std::path::Path;

use tracing::debug;

use crate::document::Document;
use crate::error::{RagError, Result};

/// Read a UTF-8 text file into a [`Document`].
///
/// The file stem becomes the document id; the path is kept as `source_uri`
/// and as the `source` metadata entry, which every chunk inherits.
///
/// # Errors
///
/// Returns [`RagError::LoadError`] if the file cannot be read and
/// [`RagError::ChunkingError`] if its content is not valid UTF-8.
pub async fn load_text_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| RagError::LoadError { path: path.to_path_buf(), source })?;

    let text = String::from_utf8(bytes).map_err(|e| {
        RagError::ChunkingError(format!(
            "document '{}' is not valid UTF-8 (byte {})",
            path.display(),
            e.utf8_error().valid_up_to()
        ))
    })?;

    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let source = path.display().to_string();

    debug!(document.id = %id, bytes = text.len(), "loaded document");
    Ok(Document::new(id, text).with_metadata("source", source.clone()).with_source_uri(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("docchat-loader-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn loads_text_with_source_metadata() {
        let path = temp_path("chatbot.txt");
        tokio::fs::write(&path, "Baguio is cool.").await.unwrap();

        let doc = load_text_document(&path).await.unwrap();
        assert_eq!(doc.text, "Baguio is cool.");
        assert!(doc.id.ends_with("chatbot"));
        assert_eq!(doc.metadata["source"], path.display().to_string());

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn missing_file_is_load_error() {
        let err = load_text_document(temp_path("missing.txt")).await.unwrap_err();
        assert!(matches!(err, RagError::LoadError { .. }));
    }

    #[tokio::test]
    async fn invalid_utf8_is_chunking_error() {
        let path = temp_path("binary.txt");
        tokio::fs::write(&path, [0x66, 0x6f, 0xff, 0xfe]).await.unwrap();

        let err = load_text_document(&path).await.unwrap_err();
        assert!(matches!(err, RagError::ChunkingError(_)));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
