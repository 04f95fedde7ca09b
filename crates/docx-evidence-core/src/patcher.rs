//! Picture injection into a loaded Word package.
//!
//! All edits are staged against in-memory copies of the three patched parts
//! and written back in one go, so a structural failure leaves the archive
//! exactly as it was loaded.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::allocator::{IdAllocator, IdStrategy};
use crate::archive::Archive;
use crate::attachment::{ImageAttachment, ImageSource};
use crate::content_types;
use crate::error::{DocxError, Result};
use crate::fragment::{numbered_title, PictureBlock};
use crate::geometry::{DisplaySize, DEFAULT_MAX_WIDTH_CM};
use crate::package::{self, PatchableParts, BODY_CLOSE, DOCUMENT_PART};
use crate::relationships::{self, Relationship};
use crate::xml;

/// Tunables for [`inject_images`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionOptions {
    /// Widest a picture may be rendered, in centimetres.
    pub max_width_cm: f64,
    pub id_strategy: IdStrategy,
}

impl Default for InjectionOptions {
    fn default() -> Self {
        Self {
            max_width_cm: DEFAULT_MAX_WIDTH_CM,
            id_strategy: IdStrategy::default(),
        }
    }
}

/// A picture that made it into the document.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectedImage {
    pub position: usize,
    pub title: String,
    pub media_path: String,
    pub relationship_id: String,
    pub drawing_id: u32,
    pub size: DisplaySize,
}

/// A picture that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFailure {
    pub position: usize,
    pub display_name: String,
    pub reason: String,
    /// Set when the picture was skipped because its id was already taken.
    pub collision: bool,
}

impl AttachmentFailure {
    pub fn from_error(position: usize, display_name: &str, err: &DocxError) -> Self {
        Self {
            position,
            display_name: display_name.to_string(),
            reason: err.to_string(),
            collision: matches!(err, DocxError::IdCollision { .. }),
        }
    }
}

/// Outcome of one injection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectionReport {
    pub injected: Vec<InjectedImage>,
    pub failures: Vec<AttachmentFailure>,
}

impl InjectionReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn has_collisions(&self) -> bool {
        self.failures.iter().any(|f| f.collision)
    }
}

/// Staged state shared by the per-picture steps.
struct Staging {
    parts: PatchableParts,
    fragments: String,
    media: Vec<(String, Vec<u8>)>,
}

/// An image waiting to be placed: either an already-decoded attachment or a
/// raw source whose header is read when its turn comes.
pub trait PendingImage<'a> {
    fn order_index(&self) -> u32;
    fn display_name(&self) -> &str;
    /// Produce the attachment for 1-based `position`.
    fn resolve(self, position: usize) -> Result<Cow<'a, ImageAttachment>>;
}

impl<'a> PendingImage<'a> for &'a ImageAttachment {
    fn order_index(&self) -> u32 {
        self.order_index
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn resolve(self, _position: usize) -> Result<Cow<'a, ImageAttachment>> {
        Ok(Cow::Borrowed(self))
    }
}

impl PendingImage<'static> for ImageSource {
    fn order_index(&self) -> u32 {
        self.order_index
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn resolve(self, position: usize) -> Result<Cow<'static, ImageAttachment>> {
        self.decode(position).map(Cow::Owned)
    }
}

/// Append every attachment to the end of the document body, in
/// `order_index` order, together with its media part, relationship and
/// content-type mapping.
///
/// Pictures that cannot be placed are skipped and listed in the report.
/// A missing or unusable body, relationship table or content-type table
/// fails the whole call without touching `archive`.
pub fn inject_images(
    archive: &mut Archive,
    attachments: &[ImageAttachment],
    options: &InjectionOptions,
    allocator: &mut IdAllocator,
) -> Result<InjectionReport> {
    inject_pending(
        archive,
        attachments.iter().collect::<Vec<_>>(),
        options,
        allocator,
    )
}

/// Like [`inject_images`], decoding each source's header as it is reached.
/// Sources that fail to decode are skipped but keep their position, so
/// numbering always follows `order_index` rank.
pub fn inject_sources(
    archive: &mut Archive,
    sources: Vec<ImageSource>,
    options: &InjectionOptions,
    allocator: &mut IdAllocator,
) -> Result<InjectionReport> {
    inject_pending(archive, sources, options, allocator)
}

#[instrument(skip_all, fields(images = items.len()))]
fn inject_pending<'a, P: PendingImage<'a>>(
    archive: &mut Archive,
    mut items: Vec<P>,
    options: &InjectionOptions,
    allocator: &mut IdAllocator,
) -> Result<InjectionReport> {
    let parts = PatchableParts::read(archive)?;

    items.sort_by_key(|item| item.order_index());
    let total = items.len();

    let mut staging = Staging {
        parts,
        fragments: String::new(),
        media: Vec::new(),
    };
    let mut report = InjectionReport::default();

    for (index, item) in items.into_iter().enumerate() {
        let position = index + 1;
        let display_name = item.display_name().to_string();
        let staged = match item.resolve(position) {
            Ok(attachment) => {
                stage_attachment(&mut staging, archive, &attachment, index, options, allocator)
            }
            Err(err) => Err(err),
        };

        match staged {
            Ok(injected) => {
                debug!(
                    "Staged image {} '{}' as {} ({})",
                    position, display_name, injected.media_path, injected.relationship_id
                );
                report.injected.push(injected);
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                if matches!(
                    err,
                    DocxError::IdCollision { .. } | DocxError::IdOutOfRange { .. }
                ) {
                    error!("Skipping image {}: {}", position, err);
                } else {
                    warn!("Skipping image {}: {}", position, err);
                }
                report
                    .failures
                    .push(AttachmentFailure::from_error(position, &display_name, &err));
            }
        }
    }

    if !staging.fragments.is_empty() {
        staging.parts.document = xml::insert_before_closing(
            &staging.parts.document,
            DOCUMENT_PART,
            BODY_CLOSE,
            &staging.fragments,
        )?;
    }

    let media_count = staging.media.len();
    for (path, bytes) in staging.media {
        archive.set_part(path, bytes);
    }
    staging.parts.write(archive);

    info!(
        "Injected {} of {} images ({} skipped)",
        media_count,
        total,
        report.failures.len()
    );
    Ok(report)
}

fn stage_attachment(
    staging: &mut Staging,
    archive: &Archive,
    attachment: &ImageAttachment,
    index: usize,
    options: &InjectionOptions,
    allocator: &mut IdAllocator,
) -> Result<InjectedImage> {
    let position = index + 1;
    let fail = |reason: &str| DocxError::Attachment {
        position,
        name: attachment.display_name.clone(),
        reason: reason.to_string(),
    };

    if attachment.raw_bytes.is_empty() {
        return Err(fail("image is empty"));
    }
    let size = DisplaySize::fit(
        attachment.pixel_width,
        attachment.pixel_height,
        options.max_width_cm,
    )
    .ok_or_else(|| fail("image has a zero dimension"))?;

    let kind = attachment.kind();
    let ids = allocator.drawing_ids(index)?;

    // Table edits first: a collision must leave no trace of this picture.
    let media_name = allocator.media_name(position, kind, archive);
    let rel = Relationship::image(ids.relationship_id.clone(), package::media_target(&media_name));
    let relationships = relationships::append_relationship(&staging.parts.relationships, &rel)?;
    let content_types = content_types::ensure_default(&staging.parts.content_types, kind)?;

    let title = numbered_title(position, &attachment.display_name);
    let block = PictureBlock {
        title: &title,
        media_name: &media_name,
        ids: &ids,
        size,
    };
    staging.fragments.push_str(&block.to_xml());

    staging.parts.relationships = relationships;
    if let Some(content_types) = content_types {
        staging.parts.content_types = content_types;
    }
    let media_path = package::media_path(&media_name);
    staging
        .media
        .push((media_path.clone(), attachment.raw_bytes.clone()));

    Ok(InjectedImage {
        position,
        title,
        media_path,
        relationship_id: ids.relationship_id,
        drawing_id: ids.drawing_id,
        size,
    })
}
