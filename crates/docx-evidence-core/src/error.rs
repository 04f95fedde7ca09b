//! Error types for template loading, patching and document generation.

/// Errors raised while loading, patching or saving a Word package.
#[derive(Debug, thiserror::Error)]
pub enum DocxError {
    #[error("Template is not a readable zip container: {0}")]
    Load(#[from] zip::result::ZipError),

    #[error("Required part '{part}' not found in package")]
    MissingPart { part: String },

    #[error("Part '{part}' has no '{marker}' closing marker")]
    MissingMarker { part: String, marker: &'static str },

    #[error("Part '{part}' is not valid UTF-8 XML: {reason}")]
    MalformedPart { part: String, reason: String },

    #[error("Image {position} ('{name}') could not be processed: {reason}")]
    Attachment {
        position: usize,
        name: String,
        reason: String,
    },

    #[error("Identifier {id} already exists in {part}")]
    IdCollision { id: String, part: String },

    #[error("No drawing id left for image {position}: ids above {max} are not valid")]
    IdOutOfRange { position: usize, max: u32 },

    #[error("Form is missing required fields: {}", .0.join(", "))]
    IncompleteForm(Vec<&'static str>),

    #[error("Failed to pack archive: {0}")]
    Pack(String),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocxError {
    /// Whether the error aborts the whole generation, as opposed to a
    /// single attachment.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DocxError::Attachment { .. }
                | DocxError::IdCollision { .. }
                | DocxError::IdOutOfRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DocxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_errors_are_recoverable() {
        let err = DocxError::Attachment {
            position: 2,
            name: "login.png".to_string(),
            reason: "zero width".to_string(),
        };
        assert!(!err.is_fatal());

        let err = DocxError::IdCollision {
            id: "rId5000".to_string(),
            part: "word/_rels/document.xml.rels".to_string(),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_structural_errors_are_fatal() {
        let err = DocxError::MissingPart {
            part: "word/document.xml".to_string(),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn test_incomplete_form_lists_fields() {
        let err = DocxError::IncompleteForm(vec!["CICLO", "ESTADO"]);
        assert_eq!(
            err.to_string(),
            "Form is missing required fields: CICLO, ESTADO"
        );
    }
}
