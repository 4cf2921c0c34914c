use bundlescope_core::{AssetId, FileId, ImplicitId};

/// An asset directly included in a file due to user configuration.
#[derive(Debug, Clone)]
pub struct ExplicitAsset {
    /// Asset guid, unique across the whole layout.
    pub guid: String,
    /// Source path of the asset.
    pub asset_path: String,
    /// Address the asset was published under, if any.
    pub addressable_name: Option<String>,
    pub serialized_size: u64,
    pub streamed_size: u64,
    /// Owning file. Always consistent: `file.assets` contains this asset.
    pub file: FileId,
    /// Implicit asset data this asset references, packed into the same file.
    pub internal_referenced_implicit_assets: Vec<ImplicitId>,
    /// Explicit assets this asset references, packed into the same file.
    pub internal_referenced_explicit_assets: Vec<AssetId>,
    /// Explicit assets this asset references that were packed into a
    /// different file.
    pub externally_referenced_assets: Vec<AssetId>,
}

impl ExplicitAsset {
    pub(crate) fn new(
        guid: impl Into<String>,
        asset_path: impl Into<String>,
        file: FileId,
    ) -> Self {
        Self {
            guid: guid.into(),
            asset_path: asset_path.into(),
            addressable_name: None,
            serialized_size: 0,
            streamed_size: 0,
            file,
            internal_referenced_implicit_assets: Vec::new(),
            internal_referenced_explicit_assets: Vec::new(),
            externally_referenced_assets: Vec::new(),
        }
    }

    /// Total footprint of this asset in its file.
    pub fn total_size(&self) -> u64 {
        self.serialized_size + self.streamed_size
    }
}

/// Asset data pulled into a file only because explicit assets reference it.
///
/// Implicit records are per-file: the same source asset dragged into two
/// files produces two records, and `asset_guid` is only unique within the
/// owning file.
#[derive(Debug, Clone)]
pub struct ImplicitAssetData {
    pub asset_guid: String,
    pub asset_path: String,
    /// Back-links to every explicit asset that pulled this data in.
    /// Derived from the explicit assets' internal reference lists.
    pub referencing_assets: Vec<AssetId>,
    pub object_count: u32,
    pub serialized_size: u64,
    pub streamed_size: u64,
    /// Owning file.
    pub file: FileId,
}

impl ImplicitAssetData {
    pub(crate) fn new(
        asset_guid: impl Into<String>,
        asset_path: impl Into<String>,
        file: FileId,
    ) -> Self {
        Self {
            asset_guid: asset_guid.into(),
            asset_path: asset_path.into(),
            referencing_assets: Vec::new(),
            object_count: 0,
            serialized_size: 0,
            streamed_size: 0,
            file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_size() {
        let mut asset = ExplicitAsset::new("guid-1", "Assets/hero.prefab", FileId(0));
        asset.serialized_size = 1024;
        asset.streamed_size = 4096;
        assert_eq!(asset.total_size(), 5120);
    }
}
