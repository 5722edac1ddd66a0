mod cbr_reader;
mod cbz_reader;
mod cli;
mod converter;
mod document;
mod epub_document;
mod error;
mod mobi;
mod pdf_document;
mod reader;

#[cfg(test)]
mod fixtures;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cbz_to=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = cli::Cli::parse();
    converter::convert(&cli)
}
