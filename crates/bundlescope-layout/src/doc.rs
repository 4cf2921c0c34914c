//! Serialized document form of a layout.
//!
//! The in-memory graph is cyclic, so the document writes each entity body
//! once under its owning parent and every cross-reference as a stable key
//! (bundle name, file name, asset guid). Loading rebuilds the owned tree
//! first, then resolves keys against maps filled during the rebuild, so
//! two fields naming the same entity resolve to the same arena slot.
//!
//! Unknown fields are ignored and missing fields default. A key that does
//! not resolve is recorded in [`LoadedLayout::dangling`], never dropped
//! silently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use bundlescope_core::{AssetId, BundleId, FileId, ImplicitId, LayoutError, LayoutResult};

use crate::builder::LayoutBuilder;
use crate::bundle::Compression;
use crate::file::SubFile;
use crate::group::{PackingMode, SchemaData};
use crate::layout::Layout;

/// Root of the serialized layout document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutDoc {
    pub tool_version: String,
    pub package_version: String,
    pub build_guid: String,
    pub groups: Vec<GroupDoc>,
    pub built_in_bundles: Vec<BundleDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupDoc {
    pub name: String,
    pub id: String,
    pub packing_mode: PackingMode,
    pub schemas: Vec<SchemaData>,
    pub bundles: Vec<BundleDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BundleDoc {
    pub name: String,
    pub file_size: u64,
    pub compression: Compression,
    /// Owning group id, absent for built-in bundles. Derivable from
    /// nesting; checked against the enclosing group on load.
    pub group: Option<String>,
    pub files: Vec<FileDoc>,
    /// Direct dependencies, as bundle names.
    pub dependencies: Vec<String>,
    /// Persisted closure, as bundle names. Recomputed at load; consumers
    /// reading the document directly get the producer's computation.
    pub expanded_dependencies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileDoc {
    pub name: String,
    /// Owning bundle name. Derivable from nesting; checked against the
    /// enclosing bundle on load.
    pub bundle: String,
    pub write_result_filename: String,
    pub bundle_object_size: u64,
    pub preload_info_size: u64,
    pub script_count: u32,
    pub script_size: u64,
    pub sub_files: Vec<SubFile>,
    pub assets: Vec<AssetDoc>,
    pub other_assets: Vec<ImplicitDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetDoc {
    pub guid: String,
    pub asset_path: String,
    pub addressable_name: Option<String>,
    pub serialized_size: u64,
    pub streamed_size: u64,
    /// Owning file name. Derivable from nesting; checked against the
    /// enclosing file on load.
    pub file: String,
    /// Implicit guids, scoped to the owning file.
    pub internal_referenced_implicit_assets: Vec<String>,
    /// Explicit asset guids in the same file.
    pub internal_referenced_explicit_assets: Vec<String>,
    /// Explicit asset guids in other files.
    pub externally_referenced_assets: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImplicitDoc {
    pub asset_guid: String,
    pub asset_path: String,
    /// Explicit asset guids that pulled this data in. The in-memory
    /// back-links are rederived from the explicit assets' forward lists;
    /// on load these keys must name an asset of the owning file.
    pub referencing_assets: Vec<String>,
    pub object_count: u32,
    pub serialized_size: u64,
    pub streamed_size: u64,
}

/// Result of loading a document: the finalized layout plus every reference
/// key that failed to resolve, reported per entity.
#[derive(Debug)]
pub struct LoadedLayout {
    pub layout: Layout,
    /// `LayoutError::DanglingReference` entries, in document order.
    pub dangling: Vec<LayoutError>,
}

impl LoadedLayout {
    /// Treat any dangling reference as fatal, yielding the first one.
    pub fn into_result(mut self) -> LayoutResult<Layout> {
        if self.dangling.is_empty() {
            Ok(self.layout)
        } else {
            Err(self.dangling.remove(0))
        }
    }
}

/// Serialize a finalized layout into its document form.
pub fn to_document(layout: &Layout) -> LayoutDoc {
    let bundle_doc = |id: BundleId| -> BundleDoc {
        let bundle = layout.bundle(id);
        BundleDoc {
            name: bundle.name.clone(),
            file_size: bundle.file_size,
            compression: bundle.compression,
            group: bundle.group.map(|g| layout.group(g).id.clone()),
            files: bundle
                .files
                .iter()
                .map(|&fid| file_doc(layout, fid))
                .collect(),
            dependencies: bundle
                .dependencies
                .iter()
                .map(|&d| layout.bundle(d).name.clone())
                .collect(),
            expanded_dependencies: bundle
                .expanded_dependencies
                .iter()
                .map(|&d| layout.bundle(d).name.clone())
                .collect(),
        }
    };

    LayoutDoc {
        tool_version: layout.tool_version.clone(),
        package_version: layout.package_version.clone(),
        build_guid: layout.build_guid.clone(),
        groups: layout
            .groups()
            .iter()
            .map(|group| GroupDoc {
                name: group.name.clone(),
                id: group.id.clone(),
                packing_mode: group.packing_mode,
                schemas: group.schemas.clone(),
                bundles: group.bundles.iter().map(|&b| bundle_doc(b)).collect(),
            })
            .collect(),
        built_in_bundles: layout
            .builtin_bundle_ids()
            .iter()
            .map(|&b| bundle_doc(b))
            .collect(),
    }
}

fn file_doc(layout: &Layout, id: FileId) -> FileDoc {
    let file = layout.file(id);
    FileDoc {
        name: file.name.clone(),
        bundle: layout.bundle(file.bundle).name.clone(),
        write_result_filename: file.write_result_filename.clone(),
        bundle_object_size: file.bundle_object_size,
        preload_info_size: file.preload_info_size,
        script_count: file.script_count,
        script_size: file.script_size,
        sub_files: file.sub_files.clone(),
        assets: file
            .assets
            .iter()
            .map(|&aid| {
                let asset = layout.asset(aid);
                AssetDoc {
                    guid: asset.guid.clone(),
                    asset_path: asset.asset_path.clone(),
                    addressable_name: asset.addressable_name.clone(),
                    serialized_size: asset.serialized_size,
                    streamed_size: asset.streamed_size,
                    file: file.name.clone(),
                    internal_referenced_implicit_assets: asset
                        .internal_referenced_implicit_assets
                        .iter()
                        .map(|&i| layout.implicit(i).asset_guid.clone())
                        .collect(),
                    internal_referenced_explicit_assets: asset
                        .internal_referenced_explicit_assets
                        .iter()
                        .map(|&a| layout.asset(a).guid.clone())
                        .collect(),
                    externally_referenced_assets: asset
                        .externally_referenced_assets
                        .iter()
                        .map(|&a| layout.asset(a).guid.clone())
                        .collect(),
                }
            })
            .collect(),
        other_assets: file
            .other_assets
            .iter()
            .map(|&iid| {
                let implicit = layout.implicit(iid);
                ImplicitDoc {
                    asset_guid: implicit.asset_guid.clone(),
                    asset_path: implicit.asset_path.clone(),
                    referencing_assets: implicit
                        .referencing_assets
                        .iter()
                        .map(|&a| layout.asset(a).guid.clone())
                        .collect(),
                    object_count: implicit.object_count,
                    serialized_size: implicit.serialized_size,
                    streamed_size: implicit.streamed_size,
                }
            })
            .collect(),
    }
}

/// Serialize a finalized layout to a JSON document string.
pub fn to_json(layout: &Layout) -> LayoutResult<String> {
    Ok(serde_json::to_string_pretty(&to_document(layout))?)
}

/// Parse a JSON document string and rebuild the layout graph.
pub fn from_json(json: &str) -> LayoutResult<LoadedLayout> {
    let doc: LayoutDoc = serde_json::from_str(json)?;
    from_document(&doc)
}

/// Rebuild the layout graph from its document form.
///
/// Pass 1 reconstructs the owned tree through [`LayoutBuilder`] (which
/// rederives every ownership back-reference) while filling key→id maps.
/// Pass 2 resolves every reference list against those maps, checks the
/// persisted back-ref keys against the enclosing parents, and `finalize()`
/// recomputes the dependency closure. Duplicate keys or structurally
/// malformed references (a self-dependency, an "internal" reference that
/// crosses files) abort the load; unresolvable or contradictory keys are
/// collected in [`LoadedLayout::dangling`].
pub fn from_document(doc: &LayoutDoc) -> LayoutResult<LoadedLayout> {
    let mut builder = LayoutBuilder::new(&doc.tool_version, &doc.package_version);
    if !doc.build_guid.is_empty() {
        builder.set_build_guid(&doc.build_guid)?;
    }

    let mut bundle_ids: HashMap<&str, BundleId> = HashMap::new();
    let mut asset_ids: HashMap<&str, (AssetId, FileId)> = HashMap::new();
    let mut implicit_ids: HashMap<(FileId, &str), ImplicitId> = HashMap::new();
    // Docs revisited in pass 2, paired with the ids minted in pass 1 and
    // the enclosing parent keys the persisted back-refs must match.
    let mut bundle_docs: Vec<(BundleId, Option<&str>, &BundleDoc)> = Vec::new();
    let mut asset_docs: Vec<(AssetId, FileId, &str, &AssetDoc)> = Vec::new();
    let mut implicit_docs: Vec<(FileId, &ImplicitDoc)> = Vec::new();

    // Pass 1: owned tree.
    for group_doc in &doc.groups {
        let gid = builder.add_group(&group_doc.name, &group_doc.id, group_doc.packing_mode)?;
        for schema in &group_doc.schemas {
            builder.add_schema(gid, schema.clone())?;
        }
        for bundle_doc in &group_doc.bundles {
            let bid = builder.add_bundle(
                gid,
                &bundle_doc.name,
                bundle_doc.file_size,
                bundle_doc.compression,
            )?;
            load_bundle_tree(
                &mut builder,
                bid,
                bundle_doc,
                &mut asset_ids,
                &mut implicit_ids,
                &mut asset_docs,
                &mut implicit_docs,
            )?;
            bundle_ids.insert(bundle_doc.name.as_str(), bid);
            bundle_docs.push((bid, Some(group_doc.id.as_str()), bundle_doc));
        }
    }
    for bundle_doc in &doc.built_in_bundles {
        let bid = builder.add_builtin_bundle(
            &bundle_doc.name,
            bundle_doc.file_size,
            bundle_doc.compression,
        )?;
        load_bundle_tree(
            &mut builder,
            bid,
            bundle_doc,
            &mut asset_ids,
            &mut implicit_ids,
            &mut asset_docs,
            &mut implicit_docs,
        )?;
        bundle_ids.insert(bundle_doc.name.as_str(), bid);
        bundle_docs.push((bid, None, bundle_doc));
    }

    // Pass 2: reference resolution.
    let mut dangling: Vec<LayoutError> = Vec::new();
    let mut report = |entity: &str, field: &'static str, key: &str| {
        tracing::warn!(entity, field, key, "dangling reference in layout document");
        dangling.push(LayoutError::dangling(entity, field, key));
    };

    for &(bid, group_key, bundle_doc) in &bundle_docs {
        // The persisted back-ref keys are derivable from nesting, but a
        // key that contradicts the enclosing parent must not load cleanly.
        if let Some(claimed) = bundle_doc.group.as_deref() {
            if group_key != Some(claimed) {
                report(&bundle_doc.name, "group", claimed);
            }
        }
        for file_doc in &bundle_doc.files {
            if !file_doc.bundle.is_empty() && file_doc.bundle != bundle_doc.name {
                report(&file_doc.name, "bundle", &file_doc.bundle);
            }
        }
        for dep_name in &bundle_doc.dependencies {
            match bundle_ids.get(dep_name.as_str()) {
                Some(&dep) => builder.add_dependency(bid, dep)?,
                None => report(&bundle_doc.name, "dependencies", dep_name),
            }
        }
    }

    for &(aid, fid, file_name, asset_doc) in &asset_docs {
        if !asset_doc.file.is_empty() && asset_doc.file != file_name {
            report(&asset_doc.guid, "file", &asset_doc.file);
        }
        for guid in &asset_doc.internal_referenced_implicit_assets {
            match implicit_ids.get(&(fid, guid.as_str())) {
                Some(&imp) => builder.link_internal_implicit(aid, imp)?,
                None => report(&asset_doc.guid, "internalReferencedImplicitAssets", guid),
            }
        }
        for guid in &asset_doc.internal_referenced_explicit_assets {
            match asset_ids.get(guid.as_str()) {
                Some(&(other, _)) => builder.link_internal_explicit(aid, other)?,
                None => report(&asset_doc.guid, "internalReferencedExplicitAssets", guid),
            }
        }
        for guid in &asset_doc.externally_referenced_assets {
            match asset_ids.get(guid.as_str()) {
                Some(&(other, _)) => builder.link_external(aid, other)?,
                None => report(&asset_doc.guid, "externallyReferencedAssets", guid),
            }
        }
    }

    // Back-links were rederived above; the persisted ones are checked to
    // name an explicit asset of the owning file, since an implicit record
    // can only be referenced from within its own file.
    for &(fid, implicit_doc) in &implicit_docs {
        for guid in &implicit_doc.referencing_assets {
            match asset_ids.get(guid.as_str()) {
                Some(&(_, asset_file)) if asset_file == fid => {}
                _ => report(&implicit_doc.asset_guid, "referencingAssets", guid),
            }
        }
    }

    let layout = builder.finalize()?;
    tracing::debug!(
        bundles = layout.bundle_count(),
        dangling = dangling.len(),
        "layout document loaded"
    );
    Ok(LoadedLayout { layout, dangling })
}

#[allow(clippy::too_many_arguments)]
fn load_bundle_tree<'d>(
    builder: &mut LayoutBuilder,
    bundle: BundleId,
    bundle_doc: &'d BundleDoc,
    asset_ids: &mut HashMap<&'d str, (AssetId, FileId)>,
    implicit_ids: &mut HashMap<(FileId, &'d str), ImplicitId>,
    asset_docs: &mut Vec<(AssetId, FileId, &'d str, &'d AssetDoc)>,
    implicit_docs: &mut Vec<(FileId, &'d ImplicitDoc)>,
) -> LayoutResult<()> {
    for file_doc in &bundle_doc.files {
        let fid = builder.add_file(bundle, &file_doc.name)?;
        {
            let file = builder.file_mut(fid)?;
            file.write_result_filename = file_doc.write_result_filename.clone();
            file.bundle_object_size = file_doc.bundle_object_size;
            file.preload_info_size = file_doc.preload_info_size;
            file.script_count = file_doc.script_count;
            file.script_size = file_doc.script_size;
        }
        for sub_file in &file_doc.sub_files {
            builder.add_sub_file(fid, sub_file.clone())?;
        }
        for asset_doc in &file_doc.assets {
            let aid = builder.add_asset(fid, &asset_doc.guid, &asset_doc.asset_path)?;
            let asset = builder.asset_mut(aid)?;
            asset.addressable_name = asset_doc.addressable_name.clone();
            asset.serialized_size = asset_doc.serialized_size;
            asset.streamed_size = asset_doc.streamed_size;
            asset_ids.insert(asset_doc.guid.as_str(), (aid, fid));
            asset_docs.push((aid, fid, file_doc.name.as_str(), asset_doc));
        }
        for implicit_doc in &file_doc.other_assets {
            let iid =
                builder.add_implicit(fid, &implicit_doc.asset_guid, &implicit_doc.asset_path)?;
            let implicit = builder.implicit_mut(iid)?;
            implicit.object_count = implicit_doc.object_count;
            implicit.serialized_size = implicit_doc.serialized_size;
            implicit.streamed_size = implicit_doc.streamed_size;
            implicit_ids.insert((fid, implicit_doc.asset_guid.as_str()), iid);
            implicit_docs.push((fid, implicit_doc));
        }
    }
    Ok(())
}
