//! Module source documents

use std::path::Path;
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use crate::utils::errors::{ContentError, ContentResult};

/// Source of raw module text
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load_document_text(&self, path: &Path) -> ContentResult<String>;
}

/// Reads UTF-8 text documents from disk
///
/// PDF text extraction happens outside this service; module PDFs are
/// expected to be converted to `.txt` beforehand.
#[derive(Debug, Clone, Default)]
pub struct FileDocumentLoader;

#[async_trait]
impl DocumentLoader for FileDocumentLoader {
    async fn load_document_text(&self, path: &Path) -> ContentResult<String> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "txt" | "md" => {}
            other => {
                return Err(ContentError::UnsupportedFormat(if other.is_empty() {
                    path.display().to_string()
                } else {
                    format!(".{} ({})", other, path.display())
                }))
            }
        }

        let text = fs::read_to_string(path).await?;
        debug!(path = %path.display(), chars = text.chars().count(), "Loaded document text");
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loads_text_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modulo_1.txt");
        std::fs::write(&path, "\n  Parte 1: O que é empreendedorismo?\n\n").unwrap();

        let text = FileDocumentLoader.load_document_text(&path).await.unwrap();
        assert_eq!(text, "Parte 1: O que é empreendedorismo?");
    }

    #[tokio::test]
    async fn test_pdf_is_unsupported() {
        let result = FileDocumentLoader
            .load_document_text(Path::new("content/modulo_1.pdf"))
            .await;
        assert!(matches!(result, Err(ContentError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileDocumentLoader
            .load_document_text(&dir.path().join("modulo_9.txt"))
            .await;
        assert!(matches!(result, Err(ContentError::Io(_))));
    }
}
