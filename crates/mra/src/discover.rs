//! Descriptor discovery and processing order.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tracing::instrument;
use walkdir::WalkDir;

const EXTENSION: &str = ".mra";
const ALTERNATIVES_MARKER: &str = "_alternatives";

/// Finds every descriptor below `root` in processing order.
///
/// See [`find_all`] and [`processing_order`].
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    Ok(processing_order(find_all(root)?))
}

/// Recursively lists descriptor files below `root`, sorted by case-insensitive path.
///
/// Symbolic links are not followed into, but a link whose name ends in
/// `.mra` is listed like any other file. Any unreadable directory is an
/// [`ErrorKind::Inaccessible`] error: a partial listing would silently drop
/// games from the database.
#[instrument(fields(root = %root.display()))]
pub fn find_all(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        exn::bail!(ErrorKind::Inaccessible(root.to_path_buf()));
    }
    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.or_raise(|| ErrorKind::Inaccessible(root.to_path_buf()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().to_lowercase().ends_with(EXTENSION) {
            found.push(entry.into_path());
        }
    }
    found.sort_by_cached_key(|path| sort_key(path));
    tracing::debug!(count = found.len(), "Discovered descriptors");
    Ok(found)
}

/// Returns `true` for descriptors of alternative game variants.
pub fn is_alternative(path: &Path) -> bool {
    sort_key(path).contains(ALTERNATIVES_MARKER)
}

/// Moves alternatives after every other descriptor, keeping each group in
/// case-insensitive path order.
///
/// The first descriptor to claim a catalog path wins it, and new core tags
/// are numbered in order of first use, so this order decides both.
pub fn processing_order(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort_by_cached_key(|path| (is_alternative(path), sort_key(path)));
    paths
}

fn sort_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs::{create_dir_all, write};

    #[test]
    fn test_find_all_recursive_and_case_insensitive() {
        let root = tempfile::tempdir().unwrap();
        let base = root.path();
        create_dir_all(base.join("_Arcade/_alternatives/_Foo")).unwrap();
        write(base.join("_Arcade/b.MRA"), "").unwrap();
        write(base.join("_Arcade/A.mra"), "").unwrap();
        write(base.join("_Arcade/readme.txt"), "").unwrap();
        write(base.join("_Arcade/_alternatives/_Foo/foo (bootleg).mra"), "").unwrap();
        let found = find_all(base).unwrap();
        assert_eq!(
            found,
            vec![
                base.join("_Arcade/_alternatives/_Foo/foo (bootleg).mra"),
                base.join("_Arcade/A.mra"),
                base.join("_Arcade/b.MRA"),
            ]
        );
    }

    #[test]
    fn test_find_all_missing_root() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("delme");
        let err = find_all(&missing).unwrap_err();
        assert_eq!(*err, ErrorKind::Inaccessible(missing));
    }

    #[rstest]
    #[case("_Arcade/_alternatives/_Foo/foo.mra", true)]
    #[case("_Arcade/_Alternatives/foo.mra", true)]
    #[case("_Arcade/foo_alternatives.mra", true)]
    #[case("_Arcade/foo.mra", false)]
    fn test_is_alternative(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(is_alternative(Path::new(path)), expected);
    }

    #[test]
    fn test_processing_order_puts_alternatives_last() {
        let ordered = processing_order(
            ["_Arcade/_alternatives/a.mra", "_Arcade/Z.mra", "_Arcade/_Alternatives/B.mra", "_Arcade/m.mra"]
                .into_iter()
                .map(PathBuf::from)
                .collect(),
        );
        assert_eq!(
            ordered,
            ["_Arcade/m.mra", "_Arcade/Z.mra", "_Arcade/_alternatives/a.mra", "_Arcade/_Alternatives/B.mra"]
                .into_iter()
                .map(PathBuf::from)
                .collect::<Vec<_>>()
        );
    }
}
