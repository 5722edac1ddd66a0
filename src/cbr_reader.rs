use crate::reader::{ArchiveReader, Entry};
use anyhow::{Context, Result};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use unrar::{Archive, CursorBeforeHeader, OpenArchive, Process};

/// RAR archives can only be walked front to back: once a header fails
/// there is no way past it, so every read error ends the conversion.
pub struct CbrArchive {
    path: PathBuf,
    archive: OpenArchive<Process, CursorBeforeHeader>,
}

impl CbrArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let archive = Archive::new(path)
            .open_for_processing()
            .with_context(|| format!("Failed to create RAR reader for {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }
}

impl ArchiveReader for CbrArchive {
    fn read_entries(self, visit: &mut dyn FnMut(Entry<'_>)) -> Result<usize> {
        let path = self.path;
        let mut archive = self.archive;
        let mut handed = 0;

        while let Some(header) = archive
            .read_header()
            .with_context(|| format!("Failed to read file from CBR {}", path.display()))?
        {
            if header.entry().is_directory() {
                archive = header
                    .skip()
                    .with_context(|| format!("Failed to read file from CBR {}", path.display()))?;
                continue;
            }

            let name = header.entry().filename.to_string_lossy().to_string();
            let (data, next) = header
                .read()
                .with_context(|| format!("Failed to read {} from CBR {}", name, path.display()))?;
            archive = next;

            visit(Entry {
                name,
                data: &mut Cursor::new(data),
            });
            handed += 1;
        }

        Ok(handed)
    }
}
