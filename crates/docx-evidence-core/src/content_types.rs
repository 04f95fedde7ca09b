//! `[Content_Types].xml` bookkeeping.

use crate::attachment::ImageKind;
use crate::error::Result;
use crate::package::{CONTENT_TYPES_PART, TYPES_CLOSE};
use crate::xml;

/// Whether a `<Default>` mapping exists for `extension` (case-insensitive,
/// as extensions are in OPC).
pub fn has_default(types_xml: &str, extension: &str) -> Result<bool> {
    let doc = xml::parse(types_xml, CONTENT_TYPES_PART)?;
    Ok(doc
        .descendants()
        .filter(|n| n.tag_name().name() == "Default")
        .filter_map(|n| n.attribute("Extension"))
        .any(|ext| ext.eq_ignore_ascii_case(extension)))
}

/// Ensure a `<Default>` mapping for `kind`. Returns `None` when the mapping
/// was already there and the part needs no rewrite.
pub fn ensure_default(types_xml: &str, kind: ImageKind) -> Result<Option<String>> {
    if has_default(types_xml, kind.extension())? {
        return Ok(None);
    }
    let entry = format!(
        r#"<Default Extension="{}" ContentType="{}"/>"#,
        kind.extension(),
        kind.content_type()
    );
    xml::insert_before_closing(types_xml, CONTENT_TYPES_PART, TYPES_CLOSE, &entry).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="PNG" ContentType="image/png"/></Types>"#;

    fn count_defaults(xml: &str, extension: &str) -> usize {
        xml.matches(&format!(r#"Extension="{}""#, extension)).count()
    }

    #[test]
    fn test_adds_missing_mapping() {
        let out = ensure_default(TYPES, ImageKind::Jpeg).unwrap().unwrap();
        assert!(out.ends_with(r#"<Default Extension="jpeg" ContentType="image/jpeg"/></Types>"#));
        assert!(has_default(&out, "jpeg").unwrap());
    }

    #[test]
    fn test_existing_mapping_is_case_insensitive() {
        assert!(ensure_default(TYPES, ImageKind::Png).unwrap().is_none());
    }

    #[test]
    fn test_idempotent() {
        let once = ensure_default(TYPES, ImageKind::Jpeg).unwrap().unwrap();
        let twice = ensure_default(&once, ImageKind::Jpeg).unwrap();
        assert!(twice.is_none());
        assert_eq!(count_defaults(&once, "jpeg"), 1);
    }
}
