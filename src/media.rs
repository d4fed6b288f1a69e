//! Document decoding that runs on the worker.
//!
//! The viewers only receive the finished result: pixels ready for a
//! texture upload, or the facts read out of a PDF.

use eframe::egui;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

use crate::error::PdfError;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%PDF-(\d+\.\d+)").expect("PDF header pattern is valid"));
static PAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u)/Type\s*/Page\b").expect("PDF page pattern is valid"));
static COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u)/Count\s+(\d+)").expect("PDF count pattern is valid"));

/// Decode any format the `image` crate understands into straight RGBA.
pub fn decode_image(bytes: &[u8]) -> Result<egui::ColorImage, image::ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        size,
        rgba.as_flat_samples().as_slice(),
    ))
}

/// What can be learned about a document without rendering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInfo {
    pub version: String,
    /// Page objects found in the file; approximate for compressed object streams.
    pub pages: usize,
    pub size_bytes: usize,
}

pub fn inspect_pdf(bytes: &[u8]) -> Result<PdfInfo, PdfError> {
    let header = HEADER_RE.captures(bytes).ok_or(PdfError::NotPdf)?;
    let version = String::from_utf8_lossy(&header[1]).into_owned();

    let mut pages = PAGE_RE.find_iter(bytes).count();
    if pages == 0 {
        // Page tree counts survive even when page objects are compressed
        pages = COUNT_RE
            .captures_iter(bytes)
            .filter_map(|c| std::str::from_utf8(&c[1]).ok()?.parse::<usize>().ok())
            .max()
            .unwrap_or(0);
    }

    Ok(PdfInfo {
        version,
        pages,
        size_bytes: bytes.len(),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Cursor;

    pub(crate) const TWO_PAGES: &[u8] = b"%PDF-1.7\n\
        1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
        2 0 obj << /Type /Pages /Kids [3 0 R 4 0 R] /Count 2 >> endobj\n\
        3 0 obj << /Type /Page /Parent 2 0 R >> endobj\n\
        4 0 obj << /Type/Page /Parent 2 0 R >> endobj\n\
        %%EOF\n";

    /// A solid red PNG of the given size.
    pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{png, TWO_PAGES};
    use super::*;

    #[test]
    fn test_decode_png() {
        let pixels = decode_image(&png(3, 2)).unwrap();
        assert_eq!(pixels.size, [3, 2]);
        assert_eq!(pixels.pixels[0], egui::Color32::from_rgb(200, 10, 10));
    }

    #[test]
    fn test_decode_rejects_text() {
        assert!(decode_image(b"plain text").is_err());
    }

    #[test]
    fn test_inspect_counts_pages_not_page_tree() {
        let info = inspect_pdf(TWO_PAGES).unwrap();
        assert_eq!(info.version, "1.7");
        assert_eq!(info.pages, 2);
        assert_eq!(info.size_bytes, TWO_PAGES.len());
    }

    #[test]
    fn test_inspect_falls_back_to_count() {
        let info = inspect_pdf(b"%PDF-2.0\n<< /Type /Pages /Count 12 >>\n\xff\xfe").unwrap();
        assert_eq!(info.version, "2.0");
        assert_eq!(info.pages, 12);
    }

    #[test]
    fn test_inspect_rejects_non_pdf() {
        assert_eq!(inspect_pdf(b"hello world"), Err(PdfError::NotPdf));
        assert_eq!(inspect_pdf(b" %PDF-1.4"), Err(PdfError::NotPdf));
    }
}
