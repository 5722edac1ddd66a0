use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Convert CBZ and CBR comic archives to PDF, EPUB or MOBI
#[derive(Parser, Debug)]
#[command(name = "cbz-to", version, about)]
pub struct Cli {
    /// Comic archives to convert (.cbz or .cbr). Each output is written
    /// next to its input with the extension replaced.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pdf)]
    pub format: Format,

    /// External EPUB to MOBI converter, called as `<converter> <epub> <mobi>`
    #[arg(long, env = "CBZ_TO_EBOOK_CONVERT", default_value = "ebook-convert")]
    pub converter: PathBuf,

    /// Directory for temporary image copies made while building EPUBs.
    /// Defaults to the system temp directory.
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Pdf,
    Epub,
    /// EPUB, then converted with the external converter
    Mobi,
}
