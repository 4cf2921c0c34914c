//! Typed arena ids.
//!
//! Every cross-entity edge in a layout is one of these ids indexing a flat
//! table owned by the layout root. Ids are only meaningful for the layout
//! (or builder) that created them; indexing a different layout with them is
//! a logic error.

use serde::{Deserialize, Serialize};

/// Arena id of a Group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

/// Arena id of a Bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleId(pub u32);

/// Arena id of a File.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u32);

/// Arena id of an ExplicitAsset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u32);

/// Arena id of an ImplicitAssetData record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImplicitId(pub u32);

impl GroupId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl BundleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl AssetId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ImplicitId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_comparable_and_hashable() {
        let a = BundleId(3);
        let b = BundleId(3);
        assert_eq!(a, b);
        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_index() {
        assert_eq!(FileId(7).index(), 7);
        assert_eq!(GroupId(0).index(), 0);
    }
}
