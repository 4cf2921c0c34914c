//! Single-writer construction contract for the layout graph.
//!
//! Every "add child" operation takes the logical parent id and wires the
//! back-reference itself, so an inconsistent back-reference is not
//! representable through this API. Key uniqueness (bundle name, file name,
//! asset guid, group id) is checked at the operation that introduces the
//! key. After `finalize()` the builder is spent: any further construction
//! call fails with `FrozenModel`.

use std::collections::HashMap;

use bundlescope_core::{
    AssetId, BundleId, FileId, GroupId, ImplicitId, LayoutError, LayoutResult,
};

use crate::asset::{ExplicitAsset, ImplicitAssetData};
use crate::bundle::{Bundle, Compression};
use crate::closure;
use crate::file::{File, SubFile};
use crate::group::{Group, PackingMode, SchemaData};
use crate::layout::Layout;

/// Builder for a [`Layout`]. One per build run; not shareable.
pub struct LayoutBuilder {
    layout: Layout,
    frozen: bool,
    group_ids: HashMap<String, GroupId>,
    bundle_names: HashMap<String, BundleId>,
    file_names: HashMap<String, FileId>,
    asset_guids: HashMap<String, AssetId>,
}

impl LayoutBuilder {
    /// Start a new layout for one build run. A fresh `build_guid` is
    /// generated; loaders restore the persisted one via
    /// [`LayoutBuilder::set_build_guid`].
    pub fn new(tool_version: impl Into<String>, package_version: impl Into<String>) -> Self {
        Self {
            layout: Layout {
                tool_version: tool_version.into(),
                package_version: package_version.into(),
                build_guid: uuid::Uuid::new_v4().to_string(),
                ..Layout::default()
            },
            frozen: false,
            group_ids: HashMap::new(),
            bundle_names: HashMap::new(),
            file_names: HashMap::new(),
            asset_guids: HashMap::new(),
        }
    }

    fn ensure_open(&self) -> LayoutResult<()> {
        if self.frozen {
            Err(LayoutError::FrozenModel)
        } else {
            Ok(())
        }
    }

    fn group_exists(&self, id: GroupId) -> LayoutResult<()> {
        if id.index() >= self.layout.groups.len() {
            return Err(LayoutError::invalid_key(format!(
                "unknown group id {:?}",
                id
            )));
        }
        Ok(())
    }

    fn bundle_exists(&self, id: BundleId) -> LayoutResult<()> {
        if id.index() >= self.layout.bundles.len() {
            return Err(LayoutError::invalid_key(format!(
                "unknown bundle id {:?}",
                id
            )));
        }
        Ok(())
    }

    fn file_exists(&self, id: FileId) -> LayoutResult<()> {
        if id.index() >= self.layout.files.len() {
            return Err(LayoutError::invalid_key(format!("unknown file id {:?}", id)));
        }
        Ok(())
    }

    fn asset_exists(&self, id: AssetId) -> LayoutResult<()> {
        if id.index() >= self.layout.assets.len() {
            return Err(LayoutError::invalid_key(format!(
                "unknown asset id {:?}",
                id
            )));
        }
        Ok(())
    }

    fn implicit_exists(&self, id: ImplicitId) -> LayoutResult<()> {
        if id.index() >= self.layout.implicits.len() {
            return Err(LayoutError::invalid_key(format!(
                "unknown implicit asset id {:?}",
                id
            )));
        }
        Ok(())
    }

    /// Override the generated build guid (used by the document loader to
    /// restore the persisted one, or by producers stamping their own run id).
    pub fn set_build_guid(&mut self, guid: impl Into<String>) -> LayoutResult<()> {
        self.ensure_open()?;
        self.layout.build_guid = guid.into();
        Ok(())
    }

    /// Add a group. `id` must be unique within the layout.
    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        id: impl Into<String>,
        packing_mode: PackingMode,
    ) -> LayoutResult<GroupId> {
        self.ensure_open()?;
        let id = id.into();
        if self.group_ids.contains_key(&id) {
            return Err(LayoutError::invalid_key(format!(
                "duplicate group id '{}'",
                id
            )));
        }
        let gid = GroupId(self.layout.groups.len() as u32);
        self.layout.groups.push(Group::new(name, id.clone(), packing_mode));
        self.group_ids.insert(id, gid);
        Ok(gid)
    }

    /// Attach a schema configuration snapshot to a group.
    pub fn add_schema(&mut self, group: GroupId, schema: SchemaData) -> LayoutResult<()> {
        self.ensure_open()?;
        self.group_exists(group)?;
        self.layout.groups[group.index()].schemas.push(schema);
        Ok(())
    }

    /// Add a bundle owned by `group`. The bundle name must be unique across
    /// the whole layout.
    pub fn add_bundle(
        &mut self,
        group: GroupId,
        name: impl Into<String>,
        file_size: u64,
        compression: Compression,
    ) -> LayoutResult<BundleId> {
        self.ensure_open()?;
        self.group_exists(group)?;
        let bid = self.insert_bundle(name, file_size, compression, Some(group))?;
        self.layout.groups[group.index()].bundles.push(bid);
        Ok(bid)
    }

    /// Add a built-in bundle, owned by no group.
    pub fn add_builtin_bundle(
        &mut self,
        name: impl Into<String>,
        file_size: u64,
        compression: Compression,
    ) -> LayoutResult<BundleId> {
        self.ensure_open()?;
        let bid = self.insert_bundle(name, file_size, compression, None)?;
        self.layout.builtin_bundles.push(bid);
        Ok(bid)
    }

    fn insert_bundle(
        &mut self,
        name: impl Into<String>,
        file_size: u64,
        compression: Compression,
        group: Option<GroupId>,
    ) -> LayoutResult<BundleId> {
        let name = name.into();
        if self.bundle_names.contains_key(&name) {
            return Err(LayoutError::invalid_key(format!(
                "duplicate bundle name '{}'",
                name
            )));
        }
        let bid = BundleId(self.layout.bundles.len() as u32);
        self.layout
            .bundles
            .push(Bundle::new(name.clone(), file_size, compression, group));
        self.bundle_names.insert(name, bid);
        Ok(bid)
    }

    /// Add a file written for `bundle`. The file name must be unique across
    /// the whole layout. Scalar fields default to zero/empty and are filled
    /// in through [`LayoutBuilder::file_mut`].
    pub fn add_file(&mut self, bundle: BundleId, name: impl Into<String>) -> LayoutResult<FileId> {
        self.ensure_open()?;
        self.bundle_exists(bundle)?;
        let name = name.into();
        if self.file_names.contains_key(&name) {
            return Err(LayoutError::invalid_key(format!(
                "duplicate file name '{}'",
                name
            )));
        }
        let fid = FileId(self.layout.files.len() as u32);
        self.layout.files.push(File::new(name.clone(), bundle));
        self.layout.bundles[bundle.index()].files.push(fid);
        self.file_names.insert(name, fid);
        Ok(fid)
    }

    /// Mutable access to a file's scalar fields, pre-freeze only.
    pub fn file_mut(&mut self, file: FileId) -> LayoutResult<&mut File> {
        self.ensure_open()?;
        self.file_exists(file)?;
        Ok(&mut self.layout.files[file.index()])
    }

    /// Append a sub-file record to a file.
    pub fn add_sub_file(&mut self, file: FileId, sub_file: SubFile) -> LayoutResult<()> {
        self.ensure_open()?;
        self.file_exists(file)?;
        self.layout.files[file.index()].sub_files.push(sub_file);
        Ok(())
    }

    /// Add an explicit asset owned by `file`. The guid must be unique
    /// across the whole layout.
    pub fn add_asset(
        &mut self,
        file: FileId,
        guid: impl Into<String>,
        asset_path: impl Into<String>,
    ) -> LayoutResult<AssetId> {
        self.ensure_open()?;
        self.file_exists(file)?;
        let guid = guid.into();
        if self.asset_guids.contains_key(&guid) {
            return Err(LayoutError::invalid_key(format!(
                "duplicate asset guid '{}'",
                guid
            )));
        }
        let aid = AssetId(self.layout.assets.len() as u32);
        self.layout
            .assets
            .push(ExplicitAsset::new(guid.clone(), asset_path, file));
        self.layout.files[file.index()].assets.push(aid);
        self.asset_guids.insert(guid, aid);
        Ok(aid)
    }

    /// Mutable access to an explicit asset's scalar fields, pre-freeze only.
    pub fn asset_mut(&mut self, asset: AssetId) -> LayoutResult<&mut ExplicitAsset> {
        self.ensure_open()?;
        self.asset_exists(asset)?;
        Ok(&mut self.layout.assets[asset.index()])
    }

    /// Add an implicit asset record pulled into `file`. Implicit guids are
    /// scoped to the owning file and may repeat across files.
    pub fn add_implicit(
        &mut self,
        file: FileId,
        asset_guid: impl Into<String>,
        asset_path: impl Into<String>,
    ) -> LayoutResult<ImplicitId> {
        self.ensure_open()?;
        self.file_exists(file)?;
        let iid = ImplicitId(self.layout.implicits.len() as u32);
        self.layout
            .implicits
            .push(ImplicitAssetData::new(asset_guid, asset_path, file));
        self.layout.files[file.index()].other_assets.push(iid);
        Ok(iid)
    }

    /// Mutable access to an implicit record's scalar fields, pre-freeze only.
    pub fn implicit_mut(&mut self, implicit: ImplicitId) -> LayoutResult<&mut ImplicitAssetData> {
        self.ensure_open()?;
        self.implicit_exists(implicit)?;
        Ok(&mut self.layout.implicits[implicit.index()])
    }

    /// Record a direct dependency edge. Self-edges are rejected; re-adding
    /// an existing edge is a no-op.
    pub fn add_dependency(&mut self, bundle: BundleId, dep: BundleId) -> LayoutResult<()> {
        self.ensure_open()?;
        self.bundle_exists(bundle)?;
        self.bundle_exists(dep)?;
        if bundle == dep {
            return Err(LayoutError::invalid_key(format!(
                "bundle '{}' cannot depend on itself",
                self.layout.bundles[bundle.index()].name
            )));
        }
        let deps = &mut self.layout.bundles[bundle.index()].dependencies;
        if !deps.contains(&dep) {
            deps.push(dep);
        }
        Ok(())
    }

    /// Record that `asset` references `implicit`, which lives in the same
    /// file. Appends the back-link to `implicit.referencing_assets`.
    pub fn link_internal_implicit(
        &mut self,
        asset: AssetId,
        implicit: ImplicitId,
    ) -> LayoutResult<()> {
        self.ensure_open()?;
        self.asset_exists(asset)?;
        self.implicit_exists(implicit)?;
        if self.layout.assets[asset.index()].file != self.layout.implicits[implicit.index()].file {
            return Err(LayoutError::invalid_key(format!(
                "asset '{}' and implicit '{}' are not in the same file",
                self.layout.assets[asset.index()].guid,
                self.layout.implicits[implicit.index()].asset_guid
            )));
        }
        let refs = &mut self.layout.assets[asset.index()].internal_referenced_implicit_assets;
        if !refs.contains(&implicit) {
            refs.push(implicit);
        }
        let back = &mut self.layout.implicits[implicit.index()].referencing_assets;
        if !back.contains(&asset) {
            back.push(asset);
        }
        Ok(())
    }

    /// Record that `asset` references another explicit asset packed into
    /// the same file.
    pub fn link_internal_explicit(&mut self, asset: AssetId, other: AssetId) -> LayoutResult<()> {
        self.ensure_open()?;
        self.asset_exists(asset)?;
        self.asset_exists(other)?;
        if asset == other {
            return Err(LayoutError::invalid_key(format!(
                "asset '{}' cannot reference itself",
                self.layout.assets[asset.index()].guid
            )));
        }
        if self.layout.assets[asset.index()].file != self.layout.assets[other.index()].file {
            return Err(LayoutError::invalid_key(format!(
                "asset '{}' is not in the same file as '{}'",
                self.layout.assets[other.index()].guid,
                self.layout.assets[asset.index()].guid
            )));
        }
        let refs = &mut self.layout.assets[asset.index()].internal_referenced_explicit_assets;
        if !refs.contains(&other) {
            refs.push(other);
        }
        Ok(())
    }

    /// Record that `asset` references an explicit asset packed into a
    /// different file.
    pub fn link_external(&mut self, asset: AssetId, other: AssetId) -> LayoutResult<()> {
        self.ensure_open()?;
        self.asset_exists(asset)?;
        self.asset_exists(other)?;
        if self.layout.assets[asset.index()].file == self.layout.assets[other.index()].file {
            return Err(LayoutError::invalid_key(format!(
                "asset '{}' is in the same file as '{}'; use link_internal_explicit",
                self.layout.assets[other.index()].guid,
                self.layout.assets[asset.index()].guid
            )));
        }
        let refs = &mut self.layout.assets[asset.index()].externally_referenced_assets;
        if !refs.contains(&other) {
            refs.push(other);
        }
        Ok(())
    }

    /// Compute every bundle's expanded dependency closure and freeze the
    /// model. Must be called exactly once; the second call (and any
    /// construction call afterwards) fails with `FrozenModel`.
    pub fn finalize(&mut self) -> LayoutResult<Layout> {
        self.ensure_open()?;
        self.frozen = true;
        let mut layout = std::mem::take(&mut self.layout);
        closure::expand_all(&mut layout);
        tracing::debug!(
            groups = layout.group_count(),
            bundles = layout.bundle_count(),
            files = layout.file_count(),
            assets = layout.asset_count(),
            implicit = layout.implicit_count(),
            "layout finalized"
        );
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> LayoutBuilder {
        LayoutBuilder::new("2022.3.10f1", "1.21.2")
    }

    #[test]
    fn test_duplicate_bundle_name_rejected() {
        let mut b = builder();
        let g = b.add_group("Default", "default-id", PackingMode::PackTogether).unwrap();
        b.add_bundle(g, "shared", 10, Compression::Lz4).unwrap();
        let err = b.add_bundle(g, "shared", 20, Compression::Lz4).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidKey(_)));
    }

    #[test]
    fn test_duplicate_group_id_rejected() {
        let mut b = builder();
        b.add_group("A", "gid", PackingMode::PackTogether).unwrap();
        let err = b.add_group("B", "gid", PackingMode::PackSeparately).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidKey(_)));
    }

    #[test]
    fn test_duplicate_file_and_asset_keys_rejected() {
        let mut b = builder();
        let g = b.add_group("A", "a", PackingMode::PackTogether).unwrap();
        let bundle = b.add_bundle(g, "bundleA", 0, Compression::Lz4).unwrap();
        let other = b.add_bundle(g, "bundleB", 0, Compression::Lz4).unwrap();
        let file = b.add_file(bundle, "archive0").unwrap();
        assert!(b.add_file(other, "archive0").is_err());
        b.add_asset(file, "guid-1", "Assets/a.png").unwrap();
        assert!(b.add_asset(file, "guid-1", "Assets/b.png").is_err());
    }

    #[test]
    fn test_back_references_wired_by_construction() {
        let mut b = builder();
        let g = b.add_group("A", "a", PackingMode::PackTogether).unwrap();
        let bundle = b.add_bundle(g, "bundleA", 0, Compression::Lz4).unwrap();
        let file = b.add_file(bundle, "archive0").unwrap();
        let asset = b.add_asset(file, "guid-1", "Assets/a.png").unwrap();
        let layout = b.finalize().unwrap();

        assert_eq!(layout.file(file).bundle, bundle);
        assert!(layout.bundle(bundle).files.contains(&file));
        assert_eq!(layout.asset(asset).file, file);
        assert!(layout.file(file).assets.contains(&asset));
        assert_eq!(layout.bundle(bundle).group, Some(g));
        assert!(layout.group(g).bundles.contains(&bundle));
    }

    #[test]
    fn test_self_dependency_rejected() {
        let mut b = builder();
        let g = b.add_group("A", "a", PackingMode::PackTogether).unwrap();
        let bundle = b.add_bundle(g, "bundleA", 0, Compression::Lz4).unwrap();
        assert!(b.add_dependency(bundle, bundle).is_err());
    }

    #[test]
    fn test_duplicate_dependency_coalesced() {
        let mut b = builder();
        let g = b.add_group("A", "a", PackingMode::PackTogether).unwrap();
        let x = b.add_bundle(g, "x", 0, Compression::Lz4).unwrap();
        let y = b.add_bundle(g, "y", 0, Compression::Lz4).unwrap();
        b.add_dependency(x, y).unwrap();
        b.add_dependency(x, y).unwrap();
        let layout = b.finalize().unwrap();
        assert_eq!(layout.bundle(x).dependencies, vec![y]);
    }

    #[test]
    fn test_internal_link_requires_same_file() {
        let mut b = builder();
        let g = b.add_group("A", "a", PackingMode::PackTogether).unwrap();
        let bundle = b.add_bundle(g, "bundleA", 0, Compression::Lz4).unwrap();
        let f1 = b.add_file(bundle, "archive0").unwrap();
        let f2 = b.add_file(bundle, "archive1").unwrap();
        let a1 = b.add_asset(f1, "guid-1", "Assets/a.png").unwrap();
        let a2 = b.add_asset(f2, "guid-2", "Assets/b.png").unwrap();
        let imp = b.add_implicit(f2, "guid-3", "Assets/c.mat").unwrap();

        assert!(b.link_internal_implicit(a1, imp).is_err());
        assert!(b.link_internal_explicit(a1, a2).is_err());
        assert!(b.link_external(a1, a2).is_ok());

        b.link_internal_implicit(a2, imp).unwrap();
        let layout = b.finalize().unwrap();
        assert_eq!(layout.implicit(imp).referencing_assets, vec![a2]);
        assert_eq!(
            layout.asset(a2).internal_referenced_implicit_assets,
            vec![imp]
        );
    }

    #[test]
    fn test_frozen_after_finalize() {
        let mut b = builder();
        b.add_group("A", "a", PackingMode::PackTogether).unwrap();
        b.finalize().unwrap();
        assert!(matches!(
            b.add_group("B", "b", PackingMode::PackTogether),
            Err(LayoutError::FrozenModel)
        ));
        assert!(matches!(b.finalize(), Err(LayoutError::FrozenModel)));
    }
}
