use crate::document::DocumentBuilder;
use anyhow::{bail, Context, Result};
use epub_builder::{EpubBuilder, EpubContent, EpubVersion, ReferenceType, ZipLibrary};
use html_escape::{encode_double_quoted_attribute, encode_text};
use image::ImageFormat;
use std::error::Error as StdError;
use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// File name prefix of spooled image copies
pub const SPOOL_PREFIX: &str = "cbz-to-image-";

const STYLESHEET: &str = "body { margin: 0; padding: 0; }
div.page { text-align: center; }
img { width: 100%; height: auto; }
";

pub struct EpubDocument {
    builder: EpubBuilder<ZipLibrary>,
    spool_dir: PathBuf,
    /// On-disk copies of every registered image, closed but not yet deleted.
    /// Dropping the document deletes them, whichever way the conversion ends.
    spooled: Vec<TempPath>,
    /// Numbers assets and sections; bumped on every attempt so names stay
    /// unique even after a failed one
    next_index: usize,
    pages: usize,
}

/// epub-builder reports `eyre` errors, which are not `std::error::Error`.
/// Boxing them keeps their source chain under anyhow's context.
fn builder_error(e: impl Into<Box<dyn StdError + Send + Sync>>) -> anyhow::Error {
    anyhow::Error::from_boxed(e.into())
}

impl EpubDocument {
    pub fn new(title: &str, spool_dir: &Path) -> Result<Self> {
        let zip = ZipLibrary::new()
            .map_err(builder_error)
            .context("Failed to create EPUB container")?;
        let mut builder = EpubBuilder::new(zip)
            .map_err(builder_error)
            .context("Failed to create EPUB builder")?;

        builder.epub_version(EpubVersion::V30);
        builder
            .metadata("title", title)
            .map_err(builder_error)
            .context("Failed to set EPUB title")?;
        builder
            .metadata("generator", concat!("cbz-to ", env!("CARGO_PKG_VERSION")))
            .map_err(builder_error)
            .context("Failed to set EPUB generator")?;
        builder
            .stylesheet(STYLESHEET.as_bytes())
            .map_err(builder_error)
            .context("Failed to add EPUB stylesheet")?;

        Ok(Self {
            builder,
            spool_dir: spool_dir.to_path_buf(),
            spooled: Vec::new(),
            next_index: 1,
            pages: 0,
        })
    }

    /// Copy the image to disk so it can be handed to the builder by path.
    /// The handle is closed on return; only the path is kept.
    fn spool(&self, ext: &str, bytes: &[u8]) -> Result<TempPath> {
        let mut file = tempfile::Builder::new()
            .prefix(SPOOL_PREFIX)
            .suffix(&format!(".{}", ext))
            .tempfile_in(&self.spool_dir)
            .context("Failed to create temporary file")?;
        file.write_all(bytes)
            .context("Failed to copy image to temporary file")?;
        Ok(file.into_temp_path())
    }
}

/// Identify the image by its leading bytes, the way the PDF builder decodes
/// it, so both formats accept the same entries whatever they are named.
fn sniff_image(label: &str, bytes: &[u8]) -> Result<ImageFormat> {
    let format =
        image::guess_format(bytes).with_context(|| format!("{} is not an image", label))?;
    let (width, height) = image::io::Reader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .with_context(|| format!("{} is not an image", label))?;
    if width == 0 || height == 0 {
        bail!("{} has no pixels", label);
    }
    Ok(format)
}

fn page_markup(label: &str, asset: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
<title>{title}</title>
<link rel="stylesheet" type="text/css" href="stylesheet.css"/>
</head>
<body>
<div class="page"><img src="{src}" alt="{alt}"/></div>
</body>
</html>
"#,
        title = encode_text(label),
        src = encode_double_quoted_attribute(asset),
        alt = encode_double_quoted_attribute(label),
    )
}

impl DocumentBuilder for EpubDocument {
    fn add_image(&mut self, label: &str, data: &mut dyn Read) -> Result<()> {
        let mut bytes = Vec::new();
        data.read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read image {}", label))?;
        let format = sniff_image(label, &bytes)?;
        let ext = format.extensions_str().first().copied().unwrap_or("img");

        let index = self.next_index;
        self.next_index += 1;

        let spooled = self.spool(ext, &bytes)?;
        let source = File::open(&spooled)
            .with_context(|| format!("Failed to reopen {}", spooled.display()))?;

        let asset = format!("images/{:04}.{}", index, ext);
        self.builder
            .add_resource(&asset, source, format.to_mime_type())
            .map_err(builder_error)
            .with_context(|| format!("Failed to add image {} to EPUB", label))?;

        let markup = page_markup(label, &asset);
        self.builder
            .add_content(
                EpubContent::new(format!("page-{:04}.xhtml", index), markup.as_bytes())
                    .title(label)
                    .reftype(ReferenceType::Text),
            )
            .map_err(builder_error)
            .with_context(|| format!("Failed to add section for image {}", label))?;

        self.spooled.push(spooled);
        self.pages += 1;
        Ok(())
    }

    fn pages(&self) -> usize {
        self.pages
    }

    fn finish(self, output: &Path) -> Result<()> {
        let EpubDocument {
            mut builder,
            spooled,
            ..
        } = self;

        let mut file = File::create(output)
            .with_context(|| format!("Failed to save EPUB file {}", output.display()))?;
        builder
            .generate(&mut file)
            .map_err(builder_error)
            .with_context(|| format!("Failed to save EPUB file {}", output.display()))?;

        drop(spooled);
        Ok(())
    }
}
