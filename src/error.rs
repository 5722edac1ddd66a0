//! Fatal conditions the caller may want to tell apart

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input is neither `.cbz` nor `.cbr`
    #[error("Unsupported file format: {path} (extension {extension:?})")]
    UnsupportedInput { path: PathBuf, extension: String },

    /// The MOBI converter could not be launched
    #[error("MOBI converter {program} not found on PATH")]
    ConverterNotFound { program: PathBuf },

    /// The MOBI converter ran but reported failure
    #[error("MOBI converter {program} failed with {status}")]
    ConverterFailed { program: PathBuf, status: ExitStatus },
}
