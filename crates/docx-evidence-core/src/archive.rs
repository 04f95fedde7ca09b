//! In-memory view of a .docx zip container.
//!
//! Entries keep the order they had in the template so that repacking leaves
//! `[Content_Types].xml` where Word expects it (first) and everything else
//! untouched byte-for-byte.

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{DocxError, Result};

/// MIME type of a WordprocessingML document.
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
}

/// Mutable path → bytes container loaded from a zip archive.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Archive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every file entry of a zip container into memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))?;
        let mut archive = Self::new();

        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let compression = file.compression();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| DocxError::Load(zip::result::ZipError::Io(e)))?;

            archive.insert(name, data, compression);
        }

        debug!("Loaded archive with {} entries", archive.len());
        Ok(archive)
    }

    /// Raw bytes of an entry, if present.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].data.as_slice())
    }

    /// An entry decoded as UTF-8 text. Absent entries are `MissingPart`.
    pub fn part_str(&self, name: &str) -> Result<&str> {
        let bytes = self.part(name).ok_or_else(|| DocxError::MissingPart {
            part: name.to_string(),
        })?;
        std::str::from_utf8(bytes).map_err(|e| DocxError::MalformedPart {
            part: name.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Create or replace an entry. Replaced entries keep their position and
    /// compression; new ones are appended and deflated.
    pub fn set_part(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&i) => self.entries[i].data = data,
            None => self.insert(name, data, CompressionMethod::Deflated),
        }
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-pack all entries into a single zip blob.
    pub fn pack(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);
            writer
                .start_file(entry.name.as_str(), options)
                .map_err(|e| DocxError::Pack(e.to_string()))?;
            writer.write_all(&entry.data)?;
        }

        let bytes = writer
            .finish()
            .map_err(|e| DocxError::Pack(e.to_string()))?
            .into_inner();
        debug!("Packed {} entries into {} bytes", self.len(), bytes.len());
        Ok(bytes)
    }

    fn insert(&mut self, name: String, data: Vec<u8>, compression: CompressionMethod) {
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(Entry {
            name,
            data,
            compression,
        });
    }
}
