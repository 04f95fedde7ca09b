//! Screenshot inputs and their decoding into attachments.

use std::io::Cursor;
use std::path::Path;

use image::ImageReader;
use serde::{Deserialize, Serialize};

use crate::error::{DocxError, Result};

/// Picture formats the media parts are stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Classify a declared MIME type. Anything that does not mention
    /// jpeg/jpg is treated as PNG.
    pub fn from_mime(mime_type: &str) -> Self {
        let mime = mime_type.to_ascii_lowercase();
        if mime.contains("jpeg") || mime.contains("jpg") {
            ImageKind::Jpeg
        } else {
            ImageKind::Png
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpeg",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
        }
    }
}

/// Best-effort MIME type from a file name, for callers without one.
pub fn guess_mime_type(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// An image as the caller supplies it, before its header is decoded.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub order_index: u32,
    pub display_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// A decoded screenshot ready to be placed in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub order_index: u32,
    pub display_name: String,
    pub raw_bytes: Vec<u8>,
    pub mime_type: String,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl ImageAttachment {
    pub fn kind(&self) -> ImageKind {
        ImageKind::from_mime(&self.mime_type)
    }
}

impl ImageSource {
    /// Read the natural pixel size from the image header. Only the header is
    /// parsed; pixel data is never decoded.
    pub fn decode(self, position: usize) -> Result<ImageAttachment> {
        let fail = |reason: String| DocxError::Attachment {
            position,
            name: self.display_name.clone(),
            reason,
        };

        if self.bytes.is_empty() {
            return Err(fail("image is empty".to_string()));
        }

        let (pixel_width, pixel_height) = ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()
            .map_err(|e| fail(e.to_string()))?
            .into_dimensions()
            .map_err(|e| fail(e.to_string()))?;

        if pixel_width == 0 || pixel_height == 0 {
            return Err(fail(format!(
                "degenerate size {}x{}",
                pixel_width, pixel_height
            )));
        }

        Ok(ImageAttachment {
            order_index: self.order_index,
            display_name: self.display_name,
            raw_bytes: self.bytes,
            mime_type: self.mime_type,
            pixel_width,
            pixel_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut buf), format)
            .unwrap();
        buf
    }

    #[test]
    fn test_mime_classification() {
        assert_eq!(ImageKind::from_mime("image/jpeg"), ImageKind::Jpeg);
        assert_eq!(ImageKind::from_mime("image/jpg"), ImageKind::Jpeg);
        assert_eq!(ImageKind::from_mime("IMAGE/JPEG"), ImageKind::Jpeg);
        assert_eq!(ImageKind::from_mime("image/png"), ImageKind::Png);
        assert_eq!(ImageKind::from_mime("image/webp"), ImageKind::Png);
        assert_eq!(ImageKind::from_mime(""), ImageKind::Png);
    }

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type("login.JPG"), "image/jpeg");
        assert_eq!(guess_mime_type("step 1.png"), "image/png");
        assert_eq!(guess_mime_type("notes"), "application/octet-stream");
    }

    #[test]
    fn test_decode_reads_png_dimensions() {
        let source = ImageSource {
            order_index: 0,
            display_name: "login.png".to_string(),
            bytes: encoded(8, 4, ImageFormat::Png),
            mime_type: "image/png".to_string(),
        };

        let attachment = source.decode(1).unwrap();
        assert_eq!((attachment.pixel_width, attachment.pixel_height), (8, 4));
        assert_eq!(attachment.kind(), ImageKind::Png);
    }

    #[test]
    fn test_decode_reads_jpeg_dimensions() {
        let source = ImageSource {
            order_index: 3,
            display_name: "checkout.jpg".to_string(),
            bytes: encoded(6, 10, ImageFormat::Jpeg),
            mime_type: "image/jpeg".to_string(),
        };

        let attachment = source.decode(1).unwrap();
        assert_eq!((attachment.pixel_width, attachment.pixel_height), (6, 10));
        assert_eq!(attachment.kind(), ImageKind::Jpeg);
    }

    #[test]
    fn test_decode_rejects_empty_and_garbage() {
        let empty = ImageSource {
            order_index: 0,
            display_name: "empty.png".to_string(),
            bytes: Vec::new(),
            mime_type: "image/png".to_string(),
        };
        let err = empty.decode(1).unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert!(!err.is_fatal());

        let garbage = ImageSource {
            order_index: 1,
            display_name: "broken.png".to_string(),
            bytes: b"not an image at all".to_vec(),
            mime_type: "image/png".to_string(),
        };
        assert!(matches!(
            garbage.decode(2),
            Err(DocxError::Attachment { position: 2, .. })
        ));
    }
}
