//! Identifier and media-name allocation for injected pictures.
//!
//! Every injected picture needs a relationship id (`rIdN`), a drawing object
//! id shared by `wp:docPr` and `pic:cNvPr`, and a media file name. All three
//! come from an [`IdAllocator`] created once per generation call, so tests can
//! seed it with a fixed token instead of the wall clock.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::archive::Archive;
use crate::attachment::ImageKind;
use crate::error::{DocxError, Result};
use crate::package::{self, DOCUMENT_PART, DOCUMENT_RELS_PART};
use crate::relationships::relationship_ids;
use crate::xml;

pub const DEFAULT_BASE: u64 = 5000;
pub const DEFAULT_STRIDE: u64 = 100;
pub const DEFAULT_SECONDARY_OFFSET: u64 = 50;

/// `docPr`/`cNvPr` ids are `xsd:unsignedInt`.
const MAX_DRAWING_ID: u32 = u32::MAX;

/// How the numeric id range for injected pictures is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum IdStrategy {
    /// Start at `base` regardless of what the template declares.
    FixedRange {
        base: u64,
        stride: u64,
        secondary_offset: u64,
    },
    /// Start at the first multiple of `stride` above every numeric id the
    /// template already uses, but never below `min_base`. Falls back to
    /// `min_base` when that range would leave no valid drawing id.
    AboveExisting {
        min_base: u64,
        stride: u64,
        secondary_offset: u64,
    },
}

impl Default for IdStrategy {
    fn default() -> Self {
        IdStrategy::AboveExisting {
            min_base: DEFAULT_BASE,
            stride: DEFAULT_STRIDE,
            secondary_offset: DEFAULT_SECONDARY_OFFSET,
        }
    }
}

/// Identifiers allocated for one picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingIds {
    pub relationship_id: String,
    pub drawing_id: u32,
}

/// Numeric ids a template already declares.
#[derive(Debug, Default)]
struct ExistingIds {
    relationships: Vec<u64>,
    drawings: HashSet<u64>,
}

impl ExistingIds {
    fn scan(archive: &Archive) -> Result<Self> {
        let mut existing = Self::default();

        if archive.contains(DOCUMENT_RELS_PART) {
            let rels = archive.part_str(DOCUMENT_RELS_PART)?;
            existing.relationships = relationship_ids(rels)?
                .iter()
                .filter_map(|id| numeric_suffix(id))
                .collect();
        }

        if archive.contains(DOCUMENT_PART) {
            let body = archive.part_str(DOCUMENT_PART)?;
            let doc = xml::parse(body, DOCUMENT_PART)?;
            existing.drawings = doc
                .descendants()
                .filter(|n| matches!(n.tag_name().name(), "docPr" | "cNvPr"))
                .filter_map(|n| n.attribute("id"))
                .filter_map(|id| id.parse::<u64>().ok())
                .collect();
        }

        Ok(existing)
    }

    fn highest(&self) -> Option<u64> {
        self.relationships
            .iter()
            .chain(self.drawings.iter())
            .copied()
            .max()
    }
}

/// Hands out ids and media names for a single generation call.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    token: String,
    base: u64,
    stride: u64,
    secondary_offset: u64,
    existing_drawing_ids: HashSet<u64>,
    issued_names: HashSet<String>,
}

impl IdAllocator {
    /// Build an allocator for `archive`. `token` distinguishes media names
    /// across invocations (a millisecond timestamp in production).
    pub fn new(token: impl Into<String>, strategy: &IdStrategy, archive: &Archive) -> Result<Self> {
        let existing = ExistingIds::scan(archive)?;

        let (base, stride, secondary_offset) = match *strategy {
            IdStrategy::FixedRange {
                base,
                stride,
                secondary_offset,
            } => (base, stride.max(1), secondary_offset),
            IdStrategy::AboveExisting {
                min_base,
                stride,
                secondary_offset,
            } => {
                let stride = stride.max(1);
                let above = existing
                    .highest()
                    .map(|max| (max / stride).checked_add(1).and_then(|n| n.checked_mul(stride)));
                let base = match above {
                    None => min_base,
                    Some(Some(above)) if has_drawing_id(above.max(min_base), secondary_offset) => {
                        above.max(min_base)
                    }
                    Some(_) => {
                        warn!(
                            "Template ids leave no room above them; allocating from {}",
                            min_base
                        );
                        min_base
                    }
                };
                (base, stride, secondary_offset)
            }
        };

        let token = token.into();
        debug!(
            "Id allocator: token={} base={} stride={} offset={}",
            token, base, stride, secondary_offset
        );

        Ok(Self {
            token,
            base,
            stride,
            secondary_offset,
            existing_drawing_ids: existing.drawings,
            issued_names: HashSet::new(),
        })
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    /// Ids for the picture at 0-based `index` in processing order.
    ///
    /// Fails with `IdOutOfRange` when the drawing id would not fit an
    /// `unsignedInt`, and with `IdCollision` when the template already uses
    /// it for another drawing.
    pub fn drawing_ids(&self, index: usize) -> Result<DrawingIds> {
        let out_of_range = || DocxError::IdOutOfRange {
            position: index + 1,
            max: MAX_DRAWING_ID,
        };

        let primary = (index as u64)
            .checked_mul(self.stride)
            .and_then(|offset| self.base.checked_add(offset))
            .ok_or_else(out_of_range)?;
        let drawing_id = primary
            .checked_add(self.secondary_offset)
            .and_then(|id| u32::try_from(id).ok())
            .ok_or_else(out_of_range)?;

        if self.existing_drawing_ids.contains(&u64::from(drawing_id)) {
            return Err(DocxError::IdCollision {
                id: drawing_id.to_string(),
                part: DOCUMENT_PART.to_string(),
            });
        }

        Ok(DrawingIds {
            relationship_id: format!("rId{}", primary),
            drawing_id,
        })
    }

    /// Media file name for the picture at 1-based `position`, unique among
    /// names already in `archive` and names issued by this allocator.
    pub fn media_name(&mut self, position: usize, kind: ImageKind, archive: &Archive) -> String {
        let stem = format!("custom_img_{}_{}", self.token, position);
        let mut name = format!("{}.{}", stem, kind.extension());
        let mut suffix = 1;
        while self.issued_names.contains(&name) || archive.contains(&package::media_path(&name)) {
            suffix += 1;
            name = format!("{}_{}.{}", stem, suffix, kind.extension());
        }
        self.issued_names.insert(name.clone());
        name
    }
}

/// Whether a range starting at `base` yields at least one valid drawing id.
fn has_drawing_id(base: u64, secondary_offset: u64) -> bool {
    base.checked_add(secondary_offset)
        .is_some_and(|id| id <= u64::from(MAX_DRAWING_ID))
}

fn numeric_suffix(id: &str) -> Option<u64> {
    let digits = id.trim_start_matches(|c: char| !c.is_ascii_digit());
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
