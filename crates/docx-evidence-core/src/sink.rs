//! Packing a patched archive and handing it to a save target.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, instrument};

use crate::archive::{Archive, DOCX_MIME_TYPE};
use crate::error::{DocxError, Result};

/// A finished document, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedDocument {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Pack `archive` into a Word document blob named `file_name`.
pub fn serialize(archive: &Archive, file_name: impl Into<String>) -> Result<PackedDocument> {
    let bytes = archive.pack()?;
    Ok(PackedDocument {
        file_name: file_name.into(),
        mime_type: DOCX_MIME_TYPE,
        bytes,
    })
}

/// Somewhere a generated document can be saved.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Save the document and return where it ended up.
    async fn save(&self, document: &PackedDocument) -> Result<PathBuf>;
}

/// Saves documents as files under a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Target path for a file name; only its final component is used.
    fn target_path(&self, file_name: &str) -> Result<PathBuf> {
        let name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| DocxError::Sink(format!("Invalid file name: {:?}", file_name)))?;
        Ok(self.dir.join(name))
    }
}

#[async_trait]
impl DocumentSink for DirectorySink {
    #[instrument(skip(self, document), level = "debug", fields(file = %document.file_name, len = document.bytes.len()))]
    async fn save(&self, document: &PackedDocument) -> Result<PathBuf> {
        let file_path = self.target_path(&document.file_name)?;

        fs::create_dir_all(&self.dir).await.map_err(|e| {
            DocxError::Sink(format!(
                "Failed to create output directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        // Write via temp file so a reader never sees a half-written document
        let temp_path = file_path.with_extension("docx.tmp");
        fs::write(&temp_path, &document.bytes).await.map_err(|e| {
            DocxError::Sink(format!(
                "Failed to write temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        fs::rename(&temp_path, &file_path).await.map_err(|e| {
            DocxError::Sink(format!(
                "Failed to rename temp file to {}: {}",
                file_path.display(),
                e
            ))
        })?;

        debug!("Saved {} bytes to {}", document.bytes.len(), file_path.display());
        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn document(name: &str) -> PackedDocument {
        let mut archive = Archive::new();
        archive.set_part("[Content_Types].xml", b"<Types></Types>".to_vec());
        serialize(&archive, name).unwrap()
    }

    #[test]
    fn test_serialize_tags_word_mime_type() {
        let doc = document("Evidencia_CP-1.docx");
        assert_eq!(
            doc.mime_type,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(&doc.bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn test_directory_sink_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(temp_dir.path().join("out"));
        let doc = document("Evidencia_CP-1.docx");

        let path = sink.save(&doc).await.unwrap();

        assert_eq!(path, temp_dir.path().join("out").join("Evidencia_CP-1.docx"));
        let content = tokio::fs::read(&path).await.unwrap();
        assert_eq!(content, doc.bytes);
        assert!(!path.with_extension("docx.tmp").exists());
    }

    #[tokio::test]
    async fn test_directory_sink_ignores_directories_in_name() {
        let temp_dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(temp_dir.path());

        let path = sink.save(&document("../escape.docx")).await.unwrap();
        assert_eq!(path, temp_dir.path().join("escape.docx"));
    }

    #[tokio::test]
    async fn test_directory_sink_rejects_empty_name() {
        let temp_dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(temp_dir.path());

        let err = sink.save(&document("..")).await.unwrap_err();
        assert!(err.to_string().contains("Invalid file name"));
    }
}
