//! # PDF Serializer
//!
//! Takes the recorded canvas pages and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. Tables only need stroked
//! rectangles and single-line text in the standard fonts, so the subset of
//! the format we emit is small: a catalog, a page tree, one Type1 font
//! object per family used, and one content stream per page.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, pages, fonts, content streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```

use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::canvas::{CanvasPage, DrawOp};
use crate::error::Result;
use crate::font::{encoding, FontFamily};

/// Document metadata written to the Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
}

pub struct PdfWriter {
    compress: bool,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
    /// Font families in resource-name order (F1, F2, ...) with object ids.
    font_objects: Vec<(FontFamily, usize)>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self { compress: true }
    }

    /// Deflate content streams (on by default).
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Write pages to a PDF byte vector.
    ///
    /// Page coordinates are in user units with a top-left origin; `scale`
    /// is points per user unit and `line_width` is the border stroke width
    /// in user units.
    pub fn write(
        &self,
        pages: &[CanvasPage],
        metadata: &Metadata,
        scale: f64,
        line_width: f64,
    ) -> Result<Vec<u8>> {
        // Object 0 is the free-list head, 1 the catalog, 2 the page tree.
        let mut builder = PdfBuilder {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
            font_objects: Vec::new(),
        };

        self.register_fonts(&mut builder, pages);
        let font_resources = self.build_font_resource_dict(&builder.font_objects);

        let mut page_obj_ids: Vec<usize> = Vec::with_capacity(pages.len());
        for page in pages {
            let content = self.build_content_stream(page, &builder.font_objects, scale, line_width)?;

            let mut content_data: Vec<u8> = Vec::new();
            if self.compress {
                let compressed = compress_to_vec_zlib(&content, 6);
                write!(
                    content_data,
                    "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                    compressed.len()
                )?;
                content_data.extend_from_slice(&compressed);
            } else {
                write!(content_data, "<< /Length {} >>\nstream\n", content.len())?;
                content_data.extend_from_slice(&content);
            }
            content_data.extend_from_slice(b"\nendstream");
            let content_obj_id = builder.push(content_data);

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                page.width * scale,
                page.height * scale,
                content_obj_id,
                font_resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let mut info: Vec<u8> = b"<< ".to_vec();
        if let Some(ref title) = metadata.title {
            info.extend_from_slice(b"/Title (");
            info.extend_from_slice(&Self::escape_pdf_bytes(&encoding::encode(
                &encoding::sanitize(title),
            )));
            info.extend_from_slice(b") ");
        }
        info.extend_from_slice(b"/Producer (datasweep) /Creator (datasweep) >>");
        let info_obj_id = builder.push(info);

        self.serialize(&builder, info_obj_id)
    }

    /// Build the PDF content stream for a single page.
    ///
    /// PDF space has its origin bottom-left, so every y is flipped against
    /// the page height.
    fn build_content_stream(
        &self,
        page: &CanvasPage,
        font_objects: &[(FontFamily, usize)],
        k: f64,
        line_width: f64,
    ) -> Result<Vec<u8>> {
        let mut stream: Vec<u8> = Vec::new();
        let h = page.height;
        write!(stream, "{:.2} w\n0 G\n0 g\n", line_width * k)?;

        for op in &page.ops {
            match op {
                DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                } => {
                    write!(
                        stream,
                        "{:.2} {:.2} {:.2} {:.2} re S\n",
                        x * k,
                        (h - y) * k,
                        width * k,
                        -height * k
                    )?;
                }
                DrawOp::Text {
                    x,
                    y,
                    height,
                    padding,
                    text,
                    font,
                    font_size,
                    ..
                } => {
                    let font_idx = Self::font_index(*font, font_objects);
                    // Baseline sits a little below the middle of the line box.
                    let baseline = y + 0.5 * height + 0.3 * font_size / k;
                    write!(
                        stream,
                        "BT /F{} {:.2} Tf {:.2} {:.2} Td (",
                        font_idx,
                        font_size,
                        (x + padding) * k,
                        (h - baseline) * k
                    )?;
                    stream.extend_from_slice(&Self::escape_pdf_bytes(&encoding::encode(text)));
                    stream.extend_from_slice(b") Tj ET\n");
                }
            }
        }

        Ok(stream)
    }

    /// Register one Type1 font object per family used across all pages.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[CanvasPage]) {
        let mut families: Vec<FontFamily> = Vec::new();
        for op in pages.iter().flat_map(|p| p.ops.iter()) {
            if let DrawOp::Text { font, .. } = op {
                if !families.contains(font) {
                    families.push(*font);
                }
            }
        }

        for family in families {
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                family.pdf_name()
            );
            let obj_id = builder.push(font_dict.into_bytes());
            builder.font_objects.push((family, obj_id));
        }
    }

    fn build_font_resource_dict(&self, font_objects: &[(FontFamily, usize)]) -> String {
        font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i + 1, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Resource index (1-based) of a registered font family.
    fn font_index(family: FontFamily, font_objects: &[(FontFamily, usize)]) -> usize {
        font_objects
            .iter()
            .position(|(f, _)| *f == family)
            .map(|i| i + 1)
            .unwrap_or(1)
    }

    /// Escape special characters in a PDF literal string.
    fn escape_pdf_bytes(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(bytes.len());
        for &b in bytes {
            if matches!(b, b'\\' | b'(' | b')') {
                out.push(b'\\');
            }
            out.push(b);
        }
        out
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Result<Vec<u8>> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            write!(output, "{} 0 obj\n", i)?;
            output.extend_from_slice(obj);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        write!(output, "xref\n0 {}\n", builder.objects.len())?;
        write!(output, "0000000000 65535 f \n")?;
        for offset in offsets.iter().skip(1) {
            write!(output, "{:010} 00000 n \n", offset)?;
        }

        write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        )?;

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ops: Vec<DrawOp>) -> CanvasPage {
        CanvasPage {
            width: 297.0,
            height: 210.0,
            ops,
        }
    }

    fn text_op(text: &str, font: FontFamily) -> DrawOp {
        DrawOp::Text {
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 5.0,
            padding: 1.0,
            text: text.to_string(),
            font,
            font_size: 8.0,
        }
    }

    fn write_plain(pages: &[CanvasPage], metadata: &Metadata) -> Vec<u8> {
        PdfWriter::new()
            .compress(false)
            .write(pages, metadata, 72.0 / 25.4, 0.2)
            .unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_escape_pdf_bytes() {
        assert_eq!(
            PdfWriter::escape_pdf_bytes(b"Hello (World)"),
            b"Hello \\(World\\)".to_vec()
        );
        assert_eq!(
            PdfWriter::escape_pdf_bytes(b"back\\slash"),
            b"back\\\\slash".to_vec()
        );
    }

    #[test]
    fn test_empty_page_produces_valid_pdf() {
        let bytes = write_plain(&[page(vec![])], &Metadata::default());
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(contains(&bytes, b"%%EOF"));
        assert!(contains(&bytes, b"xref"));
        assert!(contains(&bytes, b"trailer"));
        assert!(contains(&bytes, b"/Count 1"));
    }

    #[test]
    fn test_media_box_in_points() {
        let bytes = write_plain(&[page(vec![])], &Metadata::default());
        assert!(contains(&bytes, b"/MediaBox [0 0 841.89 595.28]"));
    }

    #[test]
    fn test_rect_is_flipped_to_pdf_space() {
        let bytes = write_plain(
            &[page(vec![DrawOp::Rect {
                x: 10.0,
                y: 10.0,
                width: 100.0,
                height: 5.0,
            }])],
            &Metadata::default(),
        );
        // 10mm = 28.35pt, (210 - 10)mm = 566.93pt
        assert!(contains(&bytes, b"28.35 566.93 283.46 -14.17 re S"));
    }

    #[test]
    fn test_title_in_info_dictionary() {
        let metadata = Metadata {
            title: Some("Report (Q1)".to_string()),
        };
        let bytes = write_plain(&[page(vec![])], &metadata);
        assert!(contains(&bytes, b"/Title (Report \\(Q1\\))"));
    }

    #[test]
    fn test_text_encoded_as_winansi() {
        let bytes = write_plain(&[page(vec![text_op("café €", FontFamily::Helvetica)])], &Metadata::default());
        assert!(contains(&bytes, b"(caf\xe9 \x80) Tj"));
        assert!(contains(&bytes, b"/BaseFont /Helvetica"));
        assert!(contains(&bytes, b"/WinAnsiEncoding"));
    }

    #[test]
    fn test_one_font_object_per_family() {
        let bytes = write_plain(
            &[page(vec![
                text_op("a", FontFamily::Courier),
                text_op("b", FontFamily::Courier),
                text_op("c", FontFamily::Helvetica),
            ])],
            &Metadata::default(),
        );
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("/Subtype /Type1").count(), 2);
        assert!(text.contains("/F1 "));
        assert!(text.contains("/F2 "));
    }

    #[test]
    fn test_compressed_stream_uses_flate() {
        let bytes = PdfWriter::new()
            .write(&[page(vec![text_op("x", FontFamily::Helvetica)])], &Metadata::default(), 1.0, 0.5)
            .unwrap();
        assert!(contains(&bytes, b"/Filter /FlateDecode"));
    }
}
