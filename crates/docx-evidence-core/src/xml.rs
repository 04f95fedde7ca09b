//! Targeted text edits on raw XML parts.
//!
//! Parts are edited as text rather than re-serialized so that everything the
//! template author wrote (namespaces, whitespace, `mc:Ignorable` markup)
//! survives untouched.

use crate::error::{DocxError, Result};

/// Insert `fragment` immediately before the last occurrence of `marker`.
pub fn insert_before_closing(
    xml: &str,
    part: &str,
    marker: &'static str,
    fragment: &str,
) -> Result<String> {
    let pos = find_closing(xml, part, marker)?;
    let mut out = String::with_capacity(xml.len() + fragment.len());
    out.push_str(&xml[..pos]);
    out.push_str(fragment);
    out.push_str(&xml[pos..]);
    Ok(out)
}

/// Byte offset of the last `marker` in `xml`.
pub fn find_closing(xml: &str, part: &str, marker: &'static str) -> Result<usize> {
    xml.rfind(marker).ok_or_else(|| DocxError::MissingMarker {
        part: part.to_string(),
        marker,
    })
}

/// Escape character data for use between tags.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Parse a part for read-only inspection.
pub(crate) fn parse<'a>(xml: &'a str, part: &str) -> Result<roxmltree::Document<'a>> {
    roxmltree::Document::parse(xml).map_err(|e| DocxError::MalformedPart {
        part: part.to_string(),
        reason: e.to_string(),
    })
}
