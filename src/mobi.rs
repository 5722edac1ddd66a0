use crate::error::ConvertError;
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

/// Run the external converter (Calibre's `ebook-convert` by default) on an
/// EPUB that is already on disk. Blocks until the converter exits.
pub fn convert_epub_to_mobi(converter: &Path, epub: &Path, mobi: &Path) -> Result<()> {
    tracing::debug!(
        "Running {} {} {}",
        converter.display(),
        epub.display(),
        mobi.display()
    );

    let status = match Command::new(converter).arg(epub).arg(mobi).status() {
        Ok(status) => status,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConvertError::ConverterNotFound {
                program: converter.to_path_buf(),
            }
            .into());
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to launch {}", converter.display()));
        }
    };

    if !status.success() {
        return Err(ConvertError::ConverterFailed {
            program: converter.to_path_buf(),
            status,
        })
        .with_context(|| format!("Failed to convert {} to MOBI", epub.display()));
    }

    Ok(())
}
