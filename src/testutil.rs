// Shared fixtures for unit tests.
use std::io::{Cursor, Write};

use tracing_subscriber::{EnvFilter, FmtSubscriber};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,zipcsv=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Build an in-memory zip holding `files` in the given order.
pub fn zip_bytes(files: &[(&str, &[u8])]) -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buf));
        for (name, content) in files {
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            zip.start_file(*name, options)?;
            zip.write_all(content)?;
        }
        zip.finish()?;
    }
    Ok(buf)
}
