//! WordprocessingML markup for an injected picture: a numbered heading
//! paragraph followed by a centered paragraph holding an inline drawing.

use crate::allocator::DrawingIds;
use crate::geometry::DisplaySize;
use crate::xml::{escape_attr, escape_text};

/// `"<position>. <display name without extension>"`.
pub fn numbered_title(position: usize, display_name: &str) -> String {
    format!("{}. {}", position, strip_extension(display_name))
}

/// Drop a trailing `.ext` (the last dot segment, if it does not contain a
/// path separator).
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() && !name[dot + 1..].contains('/') => &name[..dot],
        _ => name,
    }
}

/// Everything needed to render one picture block.
#[derive(Debug, Clone)]
pub struct PictureBlock<'a> {
    pub title: &'a str,
    pub media_name: &'a str,
    pub ids: &'a DrawingIds,
    pub size: DisplaySize,
}

impl PictureBlock<'_> {
    /// Heading paragraph, picture paragraph and a trailing empty paragraph.
    /// The picture refers to its media part only through `r:embed`.
    pub fn to_xml(&self) -> String {
        let cx = self.size.width_emu();
        let cy = self.size.height_emu();
        let id = self.ids.drawing_id;
        let name = escape_attr(self.media_name);
        let rel_id = escape_attr(&self.ids.relationship_id);

        let mut out = String::with_capacity(2048);
        out.push_str(&format!(
            concat!(
                "<w:p>",
                "<w:pPr><w:pStyle w:val=\"Heading3\"/><w:ind w:left=\"567\"/></w:pPr>",
                "<w:r><w:rPr><w:rFonts w:ascii=\"Calibri\" w:hAnsi=\"Calibri\"/><w:sz w:val=\"22\"/></w:rPr>",
                "<w:t xml:space=\"preserve\">{title}</w:t></w:r>",
                "<w:r><w:br/></w:r>",
                "</w:p>"
            ),
            title = escape_text(self.title)
        ));
        out.push_str(&format!(
            concat!(
                "<w:p>",
                "<w:pPr><w:jc w:val=\"center\"/></w:pPr>",
                "<w:r><w:rPr><w:noProof/></w:rPr>",
                "<w:drawing>",
                "<wp:inline distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\" ",
                "xmlns:wp=\"http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing\">",
                "<wp:extent cx=\"{cx}\" cy=\"{cy}\"/>",
                "<wp:docPr id=\"{id}\" name=\"{name}\"/>",
                "<a:graphic xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\">",
                "<a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">",
                "<pic:pic xmlns:pic=\"http://schemas.openxmlformats.org/drawingml/2006/picture\">",
                "<pic:nvPicPr><pic:cNvPr id=\"{id}\" name=\"{name}\"/><pic:cNvPicPr/></pic:nvPicPr>",
                "<pic:blipFill><a:blip r:embed=\"{rel_id}\" ",
                "xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\"/>",
                "<a:stretch><a:fillRect/></a:stretch></pic:blipFill>",
                "<pic:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>",
                "<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></pic:spPr>",
                "</pic:pic>",
                "</a:graphicData>",
                "</a:graphic>",
                "</wp:inline>",
                "</w:drawing>",
                "</w:r>",
                "</w:p>",
                "<w:p/>"
            ),
            cx = cx,
            cy = cy,
            id = id,
            name = name,
            rel_id = rel_id
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DEFAULT_MAX_WIDTH_CM;

    #[test]
    fn test_numbered_title() {
        assert_eq!(numbered_title(1, "login screen.png"), "1. login screen");
        assert_eq!(numbered_title(3, "archive.tar.gz"), "3. archive.tar");
        assert_eq!(numbered_title(2, "no-extension"), "2. no-extension");
        assert_eq!(numbered_title(4, "trailing."), "4. trailing.");
        assert_eq!(numbered_title(5, "dir.v2/file"), "5. dir.v2/file");
    }

    #[test]
    fn test_block_references_relationship_not_path() {
        let ids = DrawingIds {
            relationship_id: "rId5000".to_string(),
            drawing_id: 5050,
        };
        let block = PictureBlock {
            title: "1. Login & logout",
            media_name: "custom_img_1_1.png",
            ids: &ids,
            size: DisplaySize::fit(4000, 2000, DEFAULT_MAX_WIDTH_CM).unwrap(),
        };

        let xml = block.to_xml();
        assert!(xml.contains("1. Login &amp; logout"));
        assert!(xml.contains(r#"r:embed="rId5000""#));
        assert!(!xml.contains("media/custom_img_1_1.png"));
        assert!(xml.contains(r#"<wp:extent cx="5400000" cy="2700000"/>"#));
        assert!(xml.contains(r#"<a:ext cx="5400000" cy="2700000"/>"#));
        assert_eq!(xml.matches(r#"id="5050""#).count(), 2);
        assert!(xml.contains(r#"<w:jc w:val="center"/>"#));
    }

    #[test]
    fn test_block_is_well_formed() {
        let ids = DrawingIds {
            relationship_id: "rId5100".to_string(),
            drawing_id: 5150,
        };
        let block = PictureBlock {
            title: "2. <weird> \"name\"",
            media_name: "custom_img_1_2.jpeg",
            ids: &ids,
            size: DisplaySize::fit(1000, 2000, DEFAULT_MAX_WIDTH_CM).unwrap(),
        };

        let wrapped = format!(
            r#"<w:body xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:body>"#,
            block.to_xml()
        );
        let doc = roxmltree::Document::parse(&wrapped).unwrap();
        let paragraphs = doc
            .root_element()
            .children()
            .filter(|n| n.tag_name().name() == "p")
            .count();
        assert_eq!(paragraphs, 3);
    }
}
