//! Rotated legacy logs are rarely read again; gzip keeps them for forensics at a
//! fraction of the size.

use crate::Error;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Compresses `path` into `<path>.gz` and removes the original.
/// Returns the path of the compressed file.
pub(super) fn compress_file(path: &Path) -> Result<PathBuf, Error> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut gz_path = path.as_os_str().to_owned();
    gz_path.push(".gz");
    let gz_path = PathBuf::from(gz_path);

    let writer = BufWriter::new(File::create(&gz_path)?);
    let mut encoder = GzEncoder::new(writer, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;

    // The .gz now holds all content
    fs::remove_file(path)?;

    Ok(gz_path)
}
