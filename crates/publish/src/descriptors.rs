use crate::Fetcher;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Downloads every descriptor pack and unpacks the wanted entries below
/// `destination`.
///
/// `packs` pairs a pack URL with the entry name, or glob, to extract from it.
/// A pack that cannot be fetched, or that has no matching entry, is an error.
/// Returns every extracted file.
#[instrument(skip_all, fields(destination = %destination.display()))]
pub fn download_packs<'a, F: Fetcher>(
    fetcher: &F,
    packs: impl IntoIterator<Item = (&'a str, &'a str)>,
    destination: &Path,
) -> Result<Vec<PathBuf>> {
    let mut extracted = Vec::new();
    for (url, pattern) in packs {
        let download = tempfile::NamedTempFile::new().or_raise(|| ErrorKind::Io(std::env::temp_dir()))?;
        fetcher.fetch(url, download.path()).or_raise(|| ErrorKind::DescriptorPack(url.to_string()))?;
        let archive = File::open(download.path()).or_raise(|| ErrorKind::Io(download.path().to_path_buf()))?;
        let files = arcadedb_compress::extract_matching(archive, pattern, destination)
            .or_raise(|| ErrorKind::DescriptorPack(url.to_string()))?;
        tracing::info!(url, pattern, count = files.len(), "Unpacked descriptor pack");
        extracted.extend(files);
    }
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticFetcher;
    use std::io::{Cursor, Write};

    fn pack(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip_writer();
        for (name, contents) in entries {
            writer.start_file(*name, zip_options()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn zip_writer() -> zip::ZipWriter<Cursor<Vec<u8>>> {
        zip::ZipWriter::new(Cursor::new(Vec::new()))
    }

    fn zip_options() -> zip::write::SimpleFileOptions {
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored)
    }

    #[test]
    fn test_download_packs() {
        let fetcher = StaticFetcher::with([
            ("https://a/pack.zip", pack(&[("_Arcade/a.mra", "<a/>"), ("_Arcade/_alternatives/b.mra", "<b/>")])),
            ("https://b/pack.zip", pack(&[("menu.rbf", "x"), ("c.mra", "<c/>")])),
        ]);
        let destination = tempfile::tempdir().unwrap();
        let mut files = download_packs(
            &fetcher,
            [("https://a/pack.zip", "_Arcade/*"), ("https://b/pack.zip", "c.mra")],
            destination.path(),
        )
        .unwrap();
        files.sort();
        assert_eq!(
            files,
            [
                destination.path().join("_Arcade/_alternatives/b.mra"),
                destination.path().join("_Arcade/a.mra"),
                destination.path().join("c.mra"),
            ]
        );
        assert!(!destination.path().join("menu.rbf").exists());
    }

    #[test]
    fn test_failed_fetch_is_fatal() {
        let destination = tempfile::tempdir().unwrap();
        let err = download_packs(&StaticFetcher::default(), [("https://gone/pack.zip", "*")], destination.path())
            .unwrap_err();
        assert_eq!(*err, ErrorKind::DescriptorPack("https://gone/pack.zip".to_string()));
    }

    #[test]
    fn test_pack_without_matches_is_fatal() {
        let fetcher = StaticFetcher::with([("https://a/pack.zip", pack(&[("readme.txt", "hi")]))]);
        let destination = tempfile::tempdir().unwrap();
        assert!(download_packs(&fetcher, [("https://a/pack.zip", "_Arcade/*")], destination.path()).is_err());
    }
}
