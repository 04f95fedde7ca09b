//! Parts of a WordprocessingML package the patcher depends on.

use crate::archive::Archive;
use crate::error::Result;
use crate::xml;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Directory media parts live under, relative to the package root.
pub const MEDIA_DIR: &str = "word/media";

pub const BODY_CLOSE: &str = "</w:body>";
pub const RELATIONSHIPS_CLOSE: &str = "</Relationships>";
pub const TYPES_CLOSE: &str = "</Types>";

/// A part that must exist, and the closing tag edits are anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredPart {
    pub name: &'static str,
    pub marker: &'static str,
}

pub const REQUIRED_PARTS: [RequiredPart; 3] = [
    RequiredPart {
        name: DOCUMENT_PART,
        marker: BODY_CLOSE,
    },
    RequiredPart {
        name: DOCUMENT_RELS_PART,
        marker: RELATIONSHIPS_CLOSE,
    },
    RequiredPart {
        name: CONTENT_TYPES_PART,
        marker: TYPES_CLOSE,
    },
];

/// Text of the three parts image injection rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchableParts {
    pub document: String,
    pub relationships: String,
    pub content_types: String,
}

impl PatchableParts {
    /// Read all required parts, failing on the first that is absent, not
    /// UTF-8, or lacks its closing marker.
    pub fn read(archive: &Archive) -> Result<Self> {
        let read = |required: RequiredPart| -> Result<String> {
            let text = archive.part_str(required.name)?;
            xml::find_closing(text, required.name, required.marker)?;
            Ok(text.to_string())
        };

        let [document, relationships, content_types] = REQUIRED_PARTS;
        Ok(Self {
            document: read(document)?,
            relationships: read(relationships)?,
            content_types: read(content_types)?,
        })
    }

    /// Write the parts back into the archive.
    pub fn write(self, archive: &mut Archive) {
        archive.set_part(DOCUMENT_PART, self.document.into_bytes());
        archive.set_part(DOCUMENT_RELS_PART, self.relationships.into_bytes());
        archive.set_part(CONTENT_TYPES_PART, self.content_types.into_bytes());
    }
}

/// Package path of a media part with the given file name.
pub fn media_path(file_name: &str) -> String {
    format!("{}/{}", MEDIA_DIR, file_name)
}

/// Relationship target of a media part, relative to `word/document.xml`.
pub fn media_target(file_name: &str) -> String {
    format!("media/{}", file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocxError;

    fn archive_with(parts: &[(&str, &str)]) -> Archive {
        let mut archive = Archive::new();
        for (name, body) in parts {
            archive.set_part(*name, body.as_bytes().to_vec());
        }
        archive
    }

    #[test]
    fn test_reads_all_required_parts() {
        let archive = archive_with(&[
            (CONTENT_TYPES_PART, "<Types></Types>"),
            (DOCUMENT_PART, "<w:document><w:body></w:body></w:document>"),
            (DOCUMENT_RELS_PART, "<Relationships></Relationships>"),
        ]);

        let parts = PatchableParts::read(&archive).unwrap();
        assert!(parts.document.contains(BODY_CLOSE));
        assert_eq!(parts.relationships, "<Relationships></Relationships>");
        assert_eq!(parts.content_types, "<Types></Types>");
    }

    #[test]
    fn test_missing_relationships_part() {
        let archive = archive_with(&[
            (CONTENT_TYPES_PART, "<Types></Types>"),
            (DOCUMENT_PART, "<w:document><w:body></w:body></w:document>"),
        ]);

        match PatchableParts::read(&archive).unwrap_err() {
            DocxError::MissingPart { part } => assert_eq!(part, DOCUMENT_RELS_PART),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_closed_body_has_no_marker() {
        let archive = archive_with(&[
            (CONTENT_TYPES_PART, "<Types></Types>"),
            (DOCUMENT_PART, "<w:document><w:body/></w:document>"),
            (DOCUMENT_RELS_PART, "<Relationships></Relationships>"),
        ]);

        assert!(matches!(
            PatchableParts::read(&archive),
            Err(DocxError::MissingMarker { marker: BODY_CLOSE, .. })
        ));
    }

    #[test]
    fn test_media_paths() {
        assert_eq!(media_path("a.png"), "word/media/a.png");
        assert_eq!(media_target("a.png"), "media/a.png");
    }
}
