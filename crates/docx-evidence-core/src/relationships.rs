//! `word/_rels/document.xml.rels` bookkeeping.

use std::collections::HashSet;

use crate::error::{DocxError, Result};
use crate::package::{DOCUMENT_RELS_PART, RELATIONSHIPS_CLOSE};
use crate::xml;

pub const IMAGE_RELATIONSHIP_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// One `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: &'static str,
    pub target: String,
}

impl Relationship {
    pub fn image(id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rel_type: IMAGE_RELATIONSHIP_TYPE,
            target: target.into(),
        }
    }

    fn to_xml(&self) -> String {
        format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            xml::escape_attr(&self.id),
            self.rel_type,
            xml::escape_attr(&self.target)
        )
    }
}

/// All relationship ids declared in a relationships part.
pub fn relationship_ids(rels_xml: &str) -> Result<HashSet<String>> {
    let doc = xml::parse(rels_xml, DOCUMENT_RELS_PART)?;
    Ok(doc
        .descendants()
        .filter(|n| n.tag_name().name() == "Relationship")
        .filter_map(|n| n.attribute("Id"))
        .map(str::to_string)
        .collect())
}

/// Append `rel` before `</Relationships>`. An id that is already declared is
/// an `IdCollision`; the table is never rewritten in that case.
pub fn append_relationship(rels_xml: &str, rel: &Relationship) -> Result<String> {
    if relationship_ids(rels_xml)?.contains(&rel.id) {
        return Err(DocxError::IdCollision {
            id: rel.id.clone(),
            part: DOCUMENT_RELS_PART.to_string(),
        });
    }
    xml::insert_before_closing(rels_xml, DOCUMENT_RELS_PART, RELATIONSHIPS_CLOSE, &rel.to_xml())
}
