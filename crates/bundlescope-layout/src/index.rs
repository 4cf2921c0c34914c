//! Key-based lookup over a finalized layout.

use std::collections::HashMap;

use bundlescope_core::{AssetId, BundleId, FileId, GroupId};

use crate::asset::ExplicitAsset;
use crate::bundle::Bundle;
use crate::file::File;
use crate::group::Group;
use crate::layout::Layout;

/// O(1) retrieval of layout entities by stable key, built in one pass over
/// a finalized [`Layout`]. A lookup miss returns `None`.
///
/// Duplicate keys cannot occur through [`crate::builder::LayoutBuilder`]
/// except for group names, which carry no uniqueness guarantee; on any
/// duplicate the last-inserted entity wins.
pub struct LayoutIndex<'a> {
    layout: &'a Layout,
    bundles: HashMap<&'a str, BundleId>,
    files: HashMap<&'a str, FileId>,
    assets: HashMap<&'a str, AssetId>,
    groups: HashMap<&'a str, GroupId>,
}

impl<'a> LayoutIndex<'a> {
    /// Index every keyed entity of `layout`.
    pub fn new(layout: &'a Layout) -> Self {
        let mut bundles = HashMap::with_capacity(layout.bundle_count());
        let mut files = HashMap::with_capacity(layout.file_count());
        let mut assets = HashMap::with_capacity(layout.asset_count());
        let mut groups = HashMap::with_capacity(layout.group_count());

        for (i, group) in layout.groups.iter().enumerate() {
            groups.insert(group.name.as_str(), GroupId(i as u32));
        }
        for (i, bundle) in layout.bundles.iter().enumerate() {
            bundles.insert(bundle.name.as_str(), BundleId(i as u32));
        }
        for (i, file) in layout.files.iter().enumerate() {
            files.insert(file.name.as_str(), FileId(i as u32));
        }
        for (i, asset) in layout.assets.iter().enumerate() {
            assets.insert(asset.guid.as_str(), AssetId(i as u32));
        }

        Self {
            layout,
            bundles,
            files,
            assets,
            groups,
        }
    }

    pub fn bundle_by_name(&self, name: &str) -> Option<&'a Bundle> {
        self.bundles.get(name).map(|&id| self.layout.bundle(id))
    }

    pub fn file_by_name(&self, name: &str) -> Option<&'a File> {
        self.files.get(name).map(|&id| self.layout.file(id))
    }

    pub fn asset_by_guid(&self, guid: &str) -> Option<&'a ExplicitAsset> {
        self.assets.get(guid).map(|&id| self.layout.asset(id))
    }

    pub fn group_by_name(&self, name: &str) -> Option<&'a Group> {
        self.groups.get(name).map(|&id| self.layout.group(id))
    }

    /// Id variants, for callers that need to follow edges afterwards.
    pub fn bundle_id_by_name(&self, name: &str) -> Option<BundleId> {
        self.bundles.get(name).copied()
    }

    pub fn file_id_by_name(&self, name: &str) -> Option<FileId> {
        self.files.get(name).copied()
    }

    pub fn asset_id_by_guid(&self, guid: &str) -> Option<AssetId> {
        self.assets.get(guid).copied()
    }
}
