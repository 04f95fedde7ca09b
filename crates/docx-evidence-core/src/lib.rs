//! Template-driven generation of Word (OOXML) documents.
//!
//! A `.docx` template is treated as a ZIP of XML parts. This crate:
//! - fills `{{KEY}}` placeholders in the body, headers and footers
//! - appends numbered screenshots after the body content, registering the
//!   media part, its relationship and its content type
//! - packs the result and hands it to a `DocumentSink`
//!
//! Every edit is staged and only written back once all required parts
//! have been patched, so a template is never left half-modified.

mod allocator;
mod archive;
mod attachment;
mod content_types;
mod error;
mod forms;
mod fragment;
mod generate;
mod geometry;
mod package;
mod patcher;
mod placeholders;
mod relationships;
mod sink;
mod xml;

pub use allocator::{
    DrawingIds, IdAllocator, IdStrategy, DEFAULT_BASE, DEFAULT_SECONDARY_OFFSET, DEFAULT_STRIDE,
};
pub use archive::{Archive, DOCX_MIME_TYPE};
pub use attachment::{guess_mime_type, ImageAttachment, ImageKind, ImageSource};
pub use error::{DocxError, Result};
pub use forms::{long_date_es, EvidenceForm, RequirementForm};
pub use fragment::numbered_title;
pub use generate::{
    generate_evidence, generate_requirement, read_image_sources, read_template,
    GeneratedDocument, GenerationOptions,
};
pub use geometry::{DisplaySize, DEFAULT_MAX_WIDTH_CM, EMU_PER_CM};
pub use package::{
    media_path, CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART, MEDIA_DIR,
};
pub use patcher::{
    inject_images, inject_sources, AttachmentFailure, InjectedImage, InjectionOptions,
    InjectionReport, PendingImage,
};
pub use placeholders::{fill_archive, FillReport, Placeholders};
pub use relationships::IMAGE_RELATIONSHIP_TYPE;
pub use sink::{serialize, DirectorySink, DocumentSink, PackedDocument};
