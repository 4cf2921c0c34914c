use serde::{Deserialize, Serialize};

use bundlescope_core::{AssetId, BundleId, ImplicitId};

/// A physical resource fragment inside an output file (e.g. a serialized
/// file section or a `.resS` blob).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubFile {
    pub name: String,
    pub is_serialized_file: bool,
    pub size: u64,
}

impl SubFile {
    pub fn new(name: impl Into<String>, is_serialized_file: bool, size: u64) -> Self {
        Self {
            name: name.into(),
            is_serialized_file,
            size,
        }
    }
}

/// A single output file written for a bundle.
#[derive(Debug, Clone)]
pub struct File {
    /// File name, unique across the whole layout.
    pub name: String,
    /// Owning bundle. Always consistent: `bundle.files` contains this file.
    pub bundle: BundleId,
    /// Physical resource fragments, in write order.
    pub sub_files: Vec<SubFile>,
    /// Explicit assets owned by this file, in pack order.
    pub assets: Vec<AssetId>,
    /// Implicit asset data pulled into this file, in discovery order.
    pub other_assets: Vec<ImplicitId>,
    /// Name of the file as reported by the write result.
    pub write_result_filename: String,
    pub bundle_object_size: u64,
    pub preload_info_size: u64,
    pub script_count: u32,
    pub script_size: u64,
}

impl File {
    pub(crate) fn new(name: impl Into<String>, bundle: BundleId) -> Self {
        Self {
            name: name.into(),
            bundle,
            sub_files: Vec::new(),
            assets: Vec::new(),
            other_assets: Vec::new(),
            write_result_filename: String::new(),
            bundle_object_size: 0,
            preload_info_size: 0,
            script_count: 0,
            script_size: 0,
        }
    }

    /// Total size of all sub-files.
    pub fn sub_file_size(&self) -> u64 {
        self.sub_files.iter().map(|s| s.size).sum()
    }
}
