use bundlescope_core::{
    AssetId, BundleId, ContentHash, FileId, GroupId, ImplicitId, LayoutResult,
};

use crate::asset::{ExplicitAsset, ImplicitAssetData};
use crate::bundle::Bundle;
use crate::file::File;
use crate::group::Group;

/// The frozen build layout graph — root of the entity arena.
///
/// All entities live in flat tables owned here; every cross-entity edge is
/// a typed id into those tables, so "two fields point at the same entity"
/// means "two fields hold the same id". A `Layout` can only be obtained
/// from [`crate::builder::LayoutBuilder::finalize`] (or by loading a
/// serialized document, which goes through the same builder), after which
/// it is immutable and safe to share across threads.
///
/// The id accessors panic if handed an id minted by a different layout.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Version of the tool that produced the build.
    pub tool_version: String,
    /// Version of the bundling package that produced the build.
    pub package_version: String,
    /// Identifier of the build run that produced this layout.
    pub build_guid: String,
    pub(crate) groups: Vec<Group>,
    pub(crate) bundles: Vec<Bundle>,
    pub(crate) files: Vec<File>,
    pub(crate) assets: Vec<ExplicitAsset>,
    pub(crate) implicits: Vec<ImplicitAssetData>,
    /// Bundles not owned by any group, in stored order.
    pub(crate) builtin_bundles: Vec<BundleId>,
}

impl Layout {
    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.index()]
    }

    pub fn bundle(&self, id: BundleId) -> &Bundle {
        &self.bundles[id.index()]
    }

    pub fn file(&self, id: FileId) -> &File {
        &self.files[id.index()]
    }

    pub fn asset(&self, id: AssetId) -> &ExplicitAsset {
        &self.assets[id.index()]
    }

    pub fn implicit(&self, id: ImplicitId) -> &ImplicitAssetData {
        &self.implicits[id.index()]
    }

    /// All groups in declaration order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Ids of the built-in (group-less) bundles, in stored order.
    pub fn builtin_bundle_ids(&self) -> &[BundleId] {
        &self.builtin_bundles
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn bundle_count(&self) -> usize {
        self.bundles.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn implicit_count(&self) -> usize {
        self.implicits.len()
    }

    /// SHA-256 over the canonical serialized document of this layout.
    ///
    /// Two layouts with identical structure (including `build_guid`) hash
    /// identically; a reloaded layout hashes the same as its source.
    pub fn content_hash(&self) -> LayoutResult<ContentHash> {
        let json = crate::doc::to_json(self)?;
        Ok(bundlescope_core::hash::hash_bytes(json.as_bytes()))
    }
}
