use crate::cbr_reader::CbrArchive;
use crate::cbz_reader::CbzArchive;
use crate::cli::{Cli, Format};
use crate::document::DocumentBuilder;
use crate::epub_document::EpubDocument;
use crate::mobi;
use crate::pdf_document::PdfDocument;
use crate::reader::{ArchiveKind, ArchiveReader};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Everything a single file conversion needs besides the input
pub struct Settings {
    pub format: Format,
    pub converter: PathBuf,
    pub spool_dir: PathBuf,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            converter: cli.converter.clone(),
            spool_dir: cli.temp_dir.clone().unwrap_or_else(std::env::temp_dir),
        }
    }
}

/// Outcome of converting one archive
#[derive(Debug)]
pub struct Conversion {
    pub output: PathBuf,
    pub pages: usize,
    /// Entries that were read but could not be added
    pub skipped: usize,
    /// Set when the EPUB was passed on to the MOBI converter
    pub mobi: Option<PathBuf>,
}

/// Convert every input in order. The first fatal error ends the run and
/// leaves the remaining inputs untouched.
pub fn convert(cli: &Cli) -> Result<()> {
    let jobs = plan(&cli.inputs)?;
    let settings = Settings::from_cli(cli);

    for (input, kind) in jobs {
        let conversion = convert_file(&input, kind, &settings)?;

        println!(
            "Converted {} to {} ({} pages{})",
            input.display(),
            conversion.output.display(),
            conversion.pages,
            if conversion.skipped > 0 {
                format!(", {} skipped", conversion.skipped)
            } else {
                String::new()
            }
        );
        if let Some(ref mobi) = conversion.mobi {
            println!(
                "Converted {} to {}",
                conversion.output.display(),
                mobi.display()
            );
        }
    }

    Ok(())
}

/// Check every input's extension before anything is written
pub fn plan(inputs: &[PathBuf]) -> Result<Vec<(PathBuf, ArchiveKind)>> {
    inputs
        .iter()
        .map(|input| Ok((input.clone(), ArchiveKind::from_path(input)?)))
        .collect()
}

pub fn convert_file(input: &Path, kind: ArchiveKind, settings: &Settings) -> Result<Conversion> {
    tracing::info!("Converting {} to {:?}", input.display(), settings.format);

    match kind {
        ArchiveKind::Cbz => convert_archive(CbzArchive::open(input)?, input, settings),
        ArchiveKind::Cbr => convert_archive(CbrArchive::open(input)?, input, settings),
    }
}

fn convert_archive<A: ArchiveReader>(
    archive: A,
    input: &Path,
    settings: &Settings,
) -> Result<Conversion> {
    let title = input
        .file_stem()
        .context("Input file has no name")?
        .to_string_lossy()
        .to_string();

    match settings.format {
        Format::Pdf => assemble(
            archive,
            PdfDocument::new(&title),
            output_path(input, "pdf"),
        ),
        Format::Epub => assemble(
            archive,
            EpubDocument::new(&title, &settings.spool_dir)?,
            output_path(input, "epub"),
        ),
        Format::Mobi => {
            let mut conversion = assemble(
                archive,
                EpubDocument::new(&title, &settings.spool_dir)?,
                output_path(input, "epub"),
            )?;

            let mobi = output_path(input, "mobi");
            mobi::convert_epub_to_mobi(&settings.converter, &conversion.output, &mobi)?;
            conversion.mobi = Some(mobi);
            Ok(conversion)
        }
    }
}

/// Feed every entry into the document, skipping the ones it rejects
fn assemble<A: ArchiveReader, D: DocumentBuilder>(
    archive: A,
    mut document: D,
    output: PathBuf,
) -> Result<Conversion> {
    let mut skipped = 0;

    archive.read_entries(&mut |entry| {
        if let Err(e) = document.add_image(&entry.name, entry.data) {
            tracing::warn!("Failed to add image from {}: {:#}", entry.name, e);
            skipped += 1;
        }
    })?;

    let pages = document.pages();
    document.finish(&output)?;

    Ok(Conversion {
        output,
        pages,
        skipped,
        mobi: None,
    })
}

fn output_path(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}
