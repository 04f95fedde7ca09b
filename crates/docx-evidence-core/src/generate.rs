//! End-to-end document generation: load the template, fill placeholders,
//! inject screenshots and pack the result.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::allocator::IdAllocator;
use crate::archive::Archive;
use crate::attachment::{guess_mime_type, ImageSource};
use crate::error::Result;
use crate::forms::{EvidenceForm, RequirementForm};
use crate::patcher::{inject_sources, InjectionOptions, InjectionReport};
use crate::placeholders::{fill_archive, FillReport};
use crate::sink::{serialize, PackedDocument};

/// Options for a generation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub injection: InjectionOptions,
    /// Fixed media-name token; the generation time in milliseconds when unset.
    pub id_token: Option<String>,
}

/// A generated document and what happened while building it.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub document: PackedDocument,
    pub fill: FillReport,
    pub injection: InjectionReport,
}

/// Build a QA evidence document from `template` bytes.
#[instrument(skip_all, fields(caso = %form.caso_prueba, images = images.len()))]
pub fn generate_evidence(
    template: &[u8],
    form: &EvidenceForm,
    images: Vec<ImageSource>,
    options: &GenerationOptions,
    now: DateTime<Utc>,
) -> Result<GeneratedDocument> {
    form.validate()?;

    let mut archive = Archive::from_bytes(template)?;
    info!("Template loaded ({} parts)", archive.len());

    let fill = fill_archive(&mut archive, &form.placeholders())?;

    let token = options
        .id_token
        .clone()
        .unwrap_or_else(|| now.timestamp_millis().to_string());
    let mut allocator = IdAllocator::new(token, &options.injection.id_strategy, &archive)?;
    let injection = inject_sources(&mut archive, images, &options.injection, &mut allocator)?;

    let document = serialize(&archive, form.file_name(now))?;
    info!(
        "Generated {} ({} bytes, {} images)",
        document.file_name,
        document.bytes.len(),
        injection.injected.len()
    );

    Ok(GeneratedDocument {
        document,
        fill,
        injection,
    })
}

/// Build a requirement-request document from `template` bytes.
#[instrument(skip_all, fields(id = %form.id))]
pub fn generate_requirement(template: &[u8], form: &RequirementForm) -> Result<GeneratedDocument> {
    let mut archive = Archive::from_bytes(template)?;
    let fill = fill_archive(&mut archive, &form.placeholders())?;
    let document = serialize(&archive, form.file_name())?;
    info!("Generated {} ({} bytes)", document.file_name, document.bytes.len());

    Ok(GeneratedDocument {
        document,
        fill,
        injection: InjectionReport::default(),
    })
}

/// Read template bytes from disk.
pub async fn read_template(path: &Path) -> Result<Vec<u8>> {
    Ok(fs::read(path).await?)
}

/// Read screenshots from disk; argument order becomes `order_index`.
///
/// An unreadable file is logged and kept as an empty source, so it is
/// reported as a skipped picture and later pictures keep their numbers.
pub async fn read_image_sources<P: AsRef<Path>>(paths: &[P]) -> Vec<ImageSource> {
    let mut sources = Vec::with_capacity(paths.len());
    for (i, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read image {}: {}", path.display(), e);
                Vec::new()
            }
        };

        sources.push(ImageSource {
            order_index: i as u32,
            mime_type: guess_mime_type(&display_name).to_string(),
            display_name,
            bytes,
        });
    }
    sources
}
