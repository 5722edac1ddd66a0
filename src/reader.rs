use crate::error::ConvertError;
use anyhow::Result;
use std::io::Read;
use std::path::Path;

/// Shared entry representation across all archive formats
pub struct Entry<'a> {
    /// Path of the entry inside the container
    pub name: String,
    /// Forward-only stream over the entry's bytes
    pub data: &'a mut dyn Read,
}

/// Trait for reading comic archive formats (CBZ, CBR)
pub trait ArchiveReader {
    /// Hand every file entry to `visit` in the order the container stores them.
    /// Consumes the reader so the archive is closed on every exit path.
    /// Returns the number of entries handed over.
    fn read_entries(self, visit: &mut dyn FnMut(Entry<'_>)) -> Result<usize>;
}

/// Container kind, decided by file extension alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Cbz,
    Cbr,
}

impl ArchiveKind {
    pub fn from_path(path: &Path) -> Result<Self, ConvertError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "cbz" => Ok(Self::Cbz),
            "cbr" => Ok(Self::Cbr),
            _ => Err(ConvertError::UnsupportedInput {
                path: path.to_path_buf(),
                extension: ext,
            }),
        }
    }
}
