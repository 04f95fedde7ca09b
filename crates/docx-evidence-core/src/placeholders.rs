//! `{{KEY}}` substitution in the text parts of a Word package.
//!
//! Word frequently splits what the author typed as one tag across several
//! runs (`{{</w:t></w:r><w:r><w:t>FECHA}}`), sometimes between the two braces
//! of a delimiter (`{</w:t></w:r><w:r><w:t>{FECHA}}`). Split delimiters are
//! joined first by moving the second brace in front of the markup. The key is
//! then read from the tag's text with markup stripped, and the markup is put
//! back after the value so the XML stays balanced.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::archive::Archive;
use crate::error::Result;
use crate::package::DOCUMENT_PART;
use crate::xml::escape_text;

/// Flat key → value mapping fed to the template.
pub type Placeholders = BTreeMap<String, String>;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([^{}]*?)\}\}").expect("placeholder pattern is valid")
});

static SPLIT_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{((?:<[^<>]*>)+)\{").expect("split open pattern is valid")
});

static SPLIT_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\}((?:<[^<>]*>)+)\}").expect("split close pattern is valid")
});

static KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("key pattern is valid"));

const LINE_BREAK: &str = r#"</w:t><w:br/><w:t xml:space="preserve">"#;

/// Keys seen while filling a package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    pub replaced: BTreeSet<String>,
    /// Keys found in the template with no value in the mapping. They are
    /// rendered as empty text.
    pub missing: BTreeSet<String>,
}

/// Fill every placeholder in the main document and in any header or footer
/// parts.
pub fn fill_archive(archive: &mut Archive, values: &Placeholders) -> Result<FillReport> {
    let targets: Vec<String> = archive
        .part_names()
        .filter(|name| is_text_part(name))
        .map(str::to_string)
        .collect();

    let mut report = FillReport::default();
    for name in targets {
        let xml = archive.part_str(&name)?;
        let filled = fill_xml(xml, values, &mut report);
        if filled != xml {
            debug!("Filled placeholders in {}", name);
            archive.set_part(name, filled.into_bytes());
        }
    }

    for key in &report.missing {
        warn!("Template placeholder {{{{{}}}}} has no value", key);
    }
    Ok(report)
}

/// Substitute placeholders in one XML part.
pub fn fill_xml(xml: &str, values: &Placeholders, report: &mut FillReport) -> String {
    let joined = join_split_delimiters(xml);
    TAG.replace_all(&joined, |caps: &Captures| {
        let inner = &caps[1];
        let (key, markup) = split_markup(inner);
        if !KEY.is_match(&key) {
            return caps[0].to_string();
        }

        let value = match values.get(&key) {
            Some(v) => {
                report.replaced.insert(key);
                render_value(v)
            }
            None => {
                report.missing.insert(key);
                String::new()
            }
        };
        value + &markup
    })
    .into_owned()
}

/// `{<markup>{` becomes `{{<markup>` and `}<markup>}` becomes `}}<markup>`.
fn join_split_delimiters(xml: &str) -> String {
    let opened = SPLIT_OPEN.replace_all(xml, "{{${1}");
    SPLIT_CLOSE.replace_all(&opened, "}}${1}").into_owned()
}

fn is_text_part(name: &str) -> bool {
    if name == DOCUMENT_PART {
        return true;
    }
    match name.strip_prefix("word/") {
        Some(rest) => {
            !rest.contains('/')
                && rest.ends_with(".xml")
                && (rest.starts_with("header") || rest.starts_with("footer"))
        }
        None => false,
    }
}

/// Separate tag text from any markup it contains.
fn split_markup(inner: &str) -> (String, String) {
    let mut text = String::new();
    let mut markup = String::new();
    let mut in_tag = false;
    for c in inner.chars() {
        match c {
            '<' => {
                in_tag = true;
                markup.push(c);
            }
            '>' if in_tag => {
                in_tag = false;
                markup.push(c);
            }
            _ if in_tag => markup.push(c),
            _ => text.push(c),
        }
    }
    (text.trim().to_string(), markup)
}

fn render_value(value: &str) -> String {
    let normalized = value.replace("\r\n", "\n");
    normalized
        .split('\n')
        .map(escape_text)
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}
