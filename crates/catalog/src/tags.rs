use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Base tags every dictionary starts with. `arcade` and `arcadecores` share
/// an ordinal.
const SEED: [(&str, u32); 5] = [("mame", 0), ("hbmame", 1), ("games", 2), ("arcade", 3), ("arcadecores", 3)];

/// Ordinal of the official family tag.
pub const MAME_TAG: u32 = 0;
/// Ordinal of the homebrew family tag.
pub const HBMAME_TAG: u32 = 1;
pub const GAMES_TAG: u32 = 2;
pub const ARCADE_TAG: u32 = 3;

const CORE_PREFIX: &str = "arcade";
const JOTEGO_PREFIX: &str = "jt";

/// Maps tag names to small integer ordinals.
///
/// Tags are only ever appended. A new tag gets the current number of entries
/// as its ordinal, so ordinals depend on first-encounter order and are stable
/// for a fixed processing order.
///
/// # Examples
///
/// ```
/// use arcadedb_catalog::TagDictionary;
///
/// let mut tags = TagDictionary::default();
/// assert_eq!(tags.tag_for("cps2"), 5);
/// assert_eq!(tags.tag_for("jtcps2"), 6);
/// assert_eq!(tags.tag_for("cps2"), 5);
/// assert_eq!(tags.get("arcadecps2"), Some(5));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TagDictionary(IndexMap<String, u32>);

impl Default for TagDictionary {
    fn default() -> Self {
        Self(SEED.iter().map(|(name, ordinal)| (name.to_string(), *ordinal)).collect())
    }
}

impl TagDictionary {
    /// Ordinal for a core id, allocating one on first sight.
    ///
    /// Ids of Jotego cores (`jt...`) are used as-is; anything else is prefixed
    /// with `arcade`.
    pub fn tag_for(&mut self, core_id: &str) -> u32 {
        let name =
            if core_id.starts_with(JOTEGO_PREFIX) { core_id.to_string() } else { format!("{CORE_PREFIX}{core_id}") };
        let next = u32::try_from(self.0.len()).unwrap_or(u32::MAX);
        *self.0.entry(name).or_insert_with(|| {
            tracing::debug!(core_id, ordinal = next, "Allocated tag");
            next
        })
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tags in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(name, ordinal)| (name.as_str(), *ordinal))
    }
}

// Published documents carry sorted keys.
impl Serialize for TagDictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.iter().map(|(name, ordinal)| (name.as_str(), ordinal)).collect::<BTreeMap<_, _>>().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_seed() {
        let tags = TagDictionary::default();
        assert_eq!(tags.len(), 5);
        assert_eq!(
            tags.iter().collect::<Vec<_>>(),
            [("mame", 0), ("hbmame", 1), ("games", 2), ("arcade", 3), ("arcadecores", 3)]
        );
    }

    #[rstest]
    #[case("cps2", "arcadecps2")]
    #[case("jtcps2", "jtcps2")]
    #[case("cores", "arcadecores")]
    #[case("", "arcade")]
    fn test_names(#[case] core_id: &str, #[case] name: &str) {
        let mut tags = TagDictionary::default();
        let ordinal = tags.tag_for(core_id);
        assert_eq!(tags.get(name), Some(ordinal));
    }

    #[test]
    fn test_prefixed_id_can_hit_a_seed_tag() {
        let mut tags = TagDictionary::default();
        assert_eq!(tags.tag_for("cores"), ARCADE_TAG);
        assert_eq!(tags.len(), 5);
    }

    #[test]
    fn test_ordinals_follow_first_encounter() {
        let mut tags = TagDictionary::default();
        let ordinals: Vec<_> = ["neogeo", "jtkiwi", "neogeo", "cps1"].iter().map(|id| tags.tag_for(id)).collect();
        assert_eq!(ordinals, [5, 6, 5, 7]);
    }

    #[test]
    fn test_serializes_sorted() {
        let mut tags = TagDictionary::default();
        tags.tag_for("cps2");
        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, r#"{"arcade":3,"arcadecores":3,"arcadecps2":5,"games":2,"hbmame":1,"mame":0}"#);
    }
}
