use crate::document::DocumentBuilder;
use anyhow::{bail, Context, Result};
use image::DynamicImage;
use printpdf::{
    Image, ImageTransform, Mm, PdfDocument as Pdf, PdfDocumentReference, PdfLayerIndex,
    PdfPageIndex,
};
use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;

// A4 portrait
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
const MM_PER_INCH: f32 = 25.4;

pub struct PdfDocument {
    doc: PdfDocumentReference,
    /// printpdf creates the first page along with the document; the first
    /// image lands there instead of on a fresh page.
    first_page: Option<(PdfPageIndex, PdfLayerIndex)>,
    pages: usize,
}

/// Where an image of the given pixel size sits on the page
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    /// Resolution at which the image spans exactly the content width
    dpi: f32,
    height_mm: f32,
    /// Distance from the bottom edge, since PDF measures upwards
    bottom_mm: f32,
}

fn fit_to_content_width(width_px: u32, height_px: u32) -> Placement {
    let height_mm = CONTENT_WIDTH_MM * height_px as f32 / width_px as f32;
    Placement {
        dpi: width_px as f32 * MM_PER_INCH / CONTENT_WIDTH_MM,
        height_mm,
        bottom_mm: PAGE_HEIGHT_MM - MARGIN_MM - height_mm,
    }
}

impl PdfDocument {
    pub fn new(title: &str) -> Self {
        let (doc, page, layer) = Pdf::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Page 1");
        Self {
            doc,
            first_page: Some((page, layer)),
            pages: 0,
        }
    }
}

impl DocumentBuilder for PdfDocument {
    fn add_image(&mut self, label: &str, data: &mut dyn Read) -> Result<()> {
        let mut bytes = Vec::new();
        data.read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read image {}", label))?;

        // Decode before touching the document so a bad image never leaves a blank page
        let decoded = image::load_from_memory(&bytes)
            .with_context(|| format!("Failed to decode image {}", label))?;
        if decoded.width() == 0 || decoded.height() == 0 {
            bail!("Image {} has no pixels", label);
        }
        let placement = fit_to_content_width(decoded.width(), decoded.height());

        // printpdf does not handle alpha channels, flatten to RGB
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

        let (page, layer) = match self.first_page.take() {
            Some(first) => first,
            None => self
                .doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), label),
        };
        let layer = self.doc.get_page(page).get_layer(layer);

        Image::from_dynamic_image(&rgb).add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(MARGIN_MM)),
                translate_y: Some(Mm(placement.bottom_mm)),
                dpi: Some(placement.dpi),
                ..Default::default()
            },
        );

        self.pages += 1;
        tracing::debug!(
            "Placed {} on page {} ({:.1} mm tall)",
            label,
            self.pages,
            placement.height_mm
        );
        Ok(())
    }

    fn pages(&self) -> usize {
        self.pages
    }

    fn finish(self, output: &Path) -> Result<()> {
        let file = File::create(output)
            .with_context(|| format!("Failed to save PDF file {}", output.display()))?;

        self.doc
            .save(&mut BufWriter::new(file))
            .with_context(|| format!("Failed to save PDF file {}", output.display()))?;

        Ok(())
    }
}
