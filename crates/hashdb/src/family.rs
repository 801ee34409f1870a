use std::fmt::{Display, Formatter, Result as FmtResult};

/// Marker inside an archive name placing it in the homebrew family.
const HBMAME_MARKER: &str = "hbmame/";

/// Top-level classification of archives.
///
/// The family decides which snapshot documents and mirror base URLs apply,
/// which version resolution falls back to, and where the archive lands in the
/// catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// Official MAME releases.
    #[default]
    Mame,
    /// HBMAME homebrew and hack releases.
    HbMame,
}

impl Display for Family {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl Family {
    /// Classifies a descriptor's archive name.
    #[must_use]
    pub fn of_archive(name: &str) -> Self {
        if name.contains(HBMAME_MARKER) { Family::HbMame } else { Family::Mame }
    }

    /// Folder name for the family, in catalog paths and snapshot keys.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Mame => "mame",
            Family::HbMame => "hbmame",
        }
    }

    /// Version resolution falls back to when the requested one is unusable.
    #[inline]
    #[must_use]
    pub fn fallback_version(&self) -> &'static str {
        match self {
            Family::Mame => "fallback",
            Family::HbMame => "0220",
        }
    }

    /// Name of the family-specific snapshot document for `version`.
    #[must_use]
    pub fn snapshot_name(&self, version: &str) -> String {
        format!("{}merged{version}.json", self.as_str())
    }

    /// Family-qualified snapshot key for an archive (`mame/foo.zip`).
    #[must_use]
    pub fn qualify(&self, archive: &str) -> String {
        format!("{}/{archive}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("foo.zip", Family::Mame)]
    #[case("hbmame/foo.zip", Family::HbMame)]
    #[case("roms/hbmame/foo.zip", Family::HbMame)]
    #[case("hbmame.zip", Family::Mame)]
    fn test_of_archive(#[case] name: &str, #[case] expected: Family) {
        assert_eq!(Family::of_archive(name), expected);
    }

    #[rstest]
    #[case(Family::Mame, "0245", "mamemerged0245.json", "fallback")]
    #[case(Family::HbMame, "0245", "hbmamemerged0245.json", "0220")]
    fn test_naming(#[case] family: Family, #[case] version: &str, #[case] name: &str, #[case] fallback: &str) {
        assert_eq!(family.snapshot_name(version), name);
        assert_eq!(family.fallback_version(), fallback);
        assert_eq!(family.qualify("foo.zip"), format!("{family}/foo.zip"));
    }
}
