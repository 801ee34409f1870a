//! Archive Operations

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use globset::Glob;
use std::fs::{File, create_dir_all};
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::instrument;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DEFLATE_LEVEL: i64 = 9;

/// Build an in-memory ZIP archive holding exactly one deflated entry.
///
/// # Examples
///
/// ```
/// let archive = arcadedb_compress::zip_single("db.json", b"{}").unwrap();
/// let contents = arcadedb_compress::read_entry(&archive, "db.json").unwrap();
/// assert_eq!(contents, b"{}");
/// ```
#[instrument(skip(contents), fields(input_size = contents.len(), output_size))]
pub fn zip_single(entry: &str, contents: &[u8]) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(DEFLATE_LEVEL));
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(entry, options).or_raise(|| ErrorKind::Encoder)?;
    writer.write_all(contents).or_raise(|| ErrorKind::Io)?;
    let output = writer.finish().or_raise(|| ErrorKind::Io)?.into_inner();
    tracing::Span::current().record("output_size", output.len());
    Ok(output)
}

/// Read a single named entry out of an in-memory ZIP archive.
#[instrument(skip(archive), fields(archive_size = archive.len()))]
pub fn read_entry(archive: &[u8], entry: &str) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(archive)).or_raise(|| ErrorKind::InvalidData)?;
    let mut file = match archive.by_name(entry) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => exn::bail!(ErrorKind::EntryNotFound(entry.to_string())),
        Err(e) => return Err(e).or_raise(|| ErrorKind::InvalidData),
    };
    let mut output = Vec::new();
    file.read_to_end(&mut output).or_raise(|| ErrorKind::InvalidData)?;
    Ok(output)
}

/// Extract every entry whose name matches `pattern` below `destination`,
/// keeping each entry's path inside the archive.
///
/// The pattern is either an exact entry name or a glob in which `*` also
/// matches path separators. Directory entries are created but not reported.
/// Entries whose names would escape `destination` are skipped.
///
/// Returns the paths of the extracted files; matching nothing is an
/// [`ErrorKind::EntryNotFound`] error.
#[instrument(skip(archive))]
pub fn extract_matching<R: Read + Seek>(archive: R, pattern: &str, destination: &Path) -> Result<Vec<PathBuf>> {
    let matcher = Glob::new(pattern).or_raise(|| ErrorKind::InvalidPattern(pattern.to_string()))?.compile_matcher();
    let mut archive = ZipArchive::new(archive).or_raise(|| ErrorKind::InvalidData)?;
    let mut extracted = Vec::new();
    for index in 0..archive.len() {
        let mut file = archive.by_index(index).or_raise(|| ErrorKind::InvalidData)?;
        if file.name() != pattern && !matcher.is_match(file.name()) {
            continue;
        }
        let Some(relative) = file.enclosed_name() else {
            tracing::warn!(entry = file.name(), "Skipping archive entry with unsafe path");
            continue;
        };
        let target = destination.join(relative);
        if file.is_dir() {
            create_dir_all(&target).or_raise(|| ErrorKind::Io)?;
            continue;
        }
        let parent = target.parent().ok_or_raise(|| ErrorKind::Io)?;
        create_dir_all(parent).or_raise(|| ErrorKind::Io)?;
        let mut output = File::create(&target).or_raise(|| ErrorKind::Io)?;
        std::io::copy(&mut file, &mut output).or_raise(|| ErrorKind::Io)?;
        tracing::trace!(entry = file.name(), target = %target.display(), "Extracted archive entry");
        extracted.push(target);
    }
    if extracted.is_empty() {
        exn::bail!(ErrorKind::EntryNotFound(pattern.to_string()));
    }
    Ok(extracted)
}
