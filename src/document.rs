use anyhow::Result;
use std::io::Read;
use std::path::Path;

/// Trait for output document formats (PDF, EPUB)
pub trait DocumentBuilder: Sized {
    /// Append one page holding the image read from `data`.
    /// On error the document is left as it was before the call.
    fn add_image(&mut self, label: &str, data: &mut dyn Read) -> Result<()>;

    /// Pages added so far
    fn pages(&self) -> usize;

    /// Serialize the document to `output`
    fn finish(self, output: &Path) -> Result<()>;
}
