use std::collections::BTreeSet;

/// One parsed MRA descriptor.
///
/// Every value is lower-cased; the reader lower-cases the whole document
/// before parsing so that tag and attribute matching is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArcadeDescriptor {
    /// Core release the descriptor targets (`<mameversion>`), if declared.
    pub core_version: Option<String>,
    /// Archive file names from every `<rom zip="...">`, split on `|`.
    ///
    /// Names may carry a family folder (e.g. `hbmame/foo.zip`).
    pub archives: BTreeSet<String>,
    /// Hardware core the descriptor targets (`<rbf>`), if declared.
    pub core_id: Option<String>,
}
impl ArcadeDescriptor {
    /// Archive names in processing order.
    pub fn archive_names(&self) -> impl Iterator<Item = &str> {
        self.archives.iter().map(String::as_str)
    }
}
