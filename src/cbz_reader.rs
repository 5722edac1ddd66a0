use crate::reader::{ArchiveReader, Entry};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use zip::ZipArchive;

pub struct CbzArchive {
    zip: ZipArchive<BufReader<File>>,
}

impl CbzArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open CBZ file {}", path.display()))?;
        let zip = ZipArchive::new(BufReader::new(file))
            .with_context(|| format!("Failed to open CBZ file {}", path.display()))?;
        Ok(Self { zip })
    }
}

impl ArchiveReader for CbzArchive {
    fn read_entries(mut self, visit: &mut dyn FnMut(Entry<'_>)) -> Result<usize> {
        let mut handed = 0;

        // Central directory order is the stored order
        for index in 0..self.zip.len() {
            let mut file = match self.zip.by_index(index) {
                Ok(file) => file,
                Err(e) => {
                    tracing::warn!("Failed to open entry #{}: {}", index, e);
                    continue;
                }
            };

            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            visit(Entry {
                name,
                data: &mut file,
            });
            handed += 1;
        }

        Ok(handed)
    }
}
