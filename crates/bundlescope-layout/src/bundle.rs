use serde::{Deserialize, Serialize};

use bundlescope_core::{BundleId, FileId, GroupId};

/// Compression algorithm a bundle was packed with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compression {
    #[default]
    Uncompressed,
    Lz4,
    Lzma,
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::Uncompressed => write!(f, "uncompressed"),
            Compression::Lz4 => write!(f, "lz4"),
            Compression::Lzma => write!(f, "lzma"),
        }
    }
}

/// A physical packed output artifact containing one or more files.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Bundle name, unique across the whole layout.
    pub name: String,
    /// Size of the packed bundle on disk, in bytes.
    pub file_size: u64,
    pub compression: Compression,
    /// Owning group, or `None` for a built-in bundle.
    pub group: Option<GroupId>,
    /// Files written for this bundle, in write order.
    pub files: Vec<FileId>,
    /// Direct dependency bundles, in first-added order, deduplicated.
    /// Never contains the bundle itself.
    pub dependencies: Vec<BundleId>,
    /// Transitive closure of `dependencies` in depth-first discovery order,
    /// deduplicated, never containing the bundle itself. Computed once at
    /// `finalize()`.
    pub expanded_dependencies: Vec<BundleId>,
}

impl Bundle {
    pub(crate) fn new(
        name: impl Into<String>,
        file_size: u64,
        compression: Compression,
        group: Option<GroupId>,
    ) -> Self {
        Self {
            name: name.into(),
            file_size,
            compression,
            group,
            files: Vec::new(),
            dependencies: Vec::new(),
            expanded_dependencies: Vec::new(),
        }
    }

    /// Whether this bundle is a built-in (group-less) bundle.
    pub fn is_builtin(&self) -> bool {
        self.group.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_display() {
        assert_eq!(Compression::Lz4.to_string(), "lz4");
        assert_eq!(Compression::Uncompressed.to_string(), "uncompressed");
    }

    #[test]
    fn test_builtin_flag() {
        let owned = Bundle::new("a", 0, Compression::Lz4, Some(GroupId(0)));
        let builtin = Bundle::new("b", 0, Compression::Lz4, None);
        assert!(!owned.is_builtin());
        assert!(builtin.is_builtin());
    }
}
