//! Post-hoc structural audit of an already-built layout.
//!
//! A layout produced by [`crate::builder::LayoutBuilder`] cannot fail this
//! audit; the construction contract already guarantees every property
//! checked here. The audit exists for hand-assembled test fixtures and for
//! layouts whose documents came from a non-conforming producer.

use std::collections::HashSet;

use bundlescope_core::{AssetId, BundleId, FileId, LayoutError};

use crate::layout::Layout;

/// Check every structural invariant of `layout`, collecting all violations.
pub fn validate_layout(layout: &Layout) -> Result<(), Vec<LayoutError>> {
    let mut errors = Vec::new();

    // Key uniqueness across the whole layout.
    let mut group_ids = HashSet::new();
    for group in layout.groups() {
        if !group_ids.insert(group.id.as_str()) {
            errors.push(LayoutError::invalid_key(format!(
                "duplicate group id '{}'",
                group.id
            )));
        }
    }
    let mut bundle_names = HashSet::new();
    for bundle in &layout.bundles {
        if !bundle_names.insert(bundle.name.as_str()) {
            errors.push(LayoutError::invalid_key(format!(
                "duplicate bundle name '{}'",
                bundle.name
            )));
        }
    }
    let mut file_names = HashSet::new();
    for file in &layout.files {
        if !file_names.insert(file.name.as_str()) {
            errors.push(LayoutError::invalid_key(format!(
                "duplicate file name '{}'",
                file.name
            )));
        }
    }
    let mut asset_guids = HashSet::new();
    for asset in &layout.assets {
        if !asset_guids.insert(asset.guid.as_str()) {
            errors.push(LayoutError::invalid_key(format!(
                "duplicate asset guid '{}'",
                asset.guid
            )));
        }
    }

    // Ownership back-references must be mutually consistent.
    for (i, file) in layout.files.iter().enumerate() {
        let fid = FileId(i as u32);
        if !layout.bundle(file.bundle).files.contains(&fid) {
            errors.push(LayoutError::Inconsistent(format!(
                "file '{}' points at bundle '{}' which does not list it",
                file.name,
                layout.bundle(file.bundle).name
            )));
        }
    }
    for (i, asset) in layout.assets.iter().enumerate() {
        let aid = AssetId(i as u32);
        if !layout.file(asset.file).assets.contains(&aid) {
            errors.push(LayoutError::Inconsistent(format!(
                "asset '{}' points at file '{}' which does not list it",
                asset.guid,
                layout.file(asset.file).name
            )));
        }
    }
    for implicit in &layout.implicits {
        for &aid in &implicit.referencing_assets {
            let asset = layout.asset(aid);
            if asset.file != implicit.file {
                errors.push(LayoutError::Inconsistent(format!(
                    "implicit '{}' is back-linked from asset '{}' in another file",
                    implicit.asset_guid, asset.guid
                )));
            }
        }
    }

    // Every bundle is either owned by exactly one group or built-in.
    for (i, bundle) in layout.bundles.iter().enumerate() {
        let bid = BundleId(i as u32);
        let in_builtin = layout.builtin_bundles.contains(&bid);
        match bundle.group {
            Some(gid) => {
                if !layout.group(gid).bundles.contains(&bid) {
                    errors.push(LayoutError::Inconsistent(format!(
                        "bundle '{}' points at group '{}' which does not list it",
                        bundle.name,
                        layout.group(gid).name
                    )));
                }
                if in_builtin {
                    errors.push(LayoutError::Inconsistent(format!(
                        "bundle '{}' is both grouped and built-in",
                        bundle.name
                    )));
                }
            }
            None => {
                if !in_builtin {
                    errors.push(LayoutError::Inconsistent(format!(
                        "bundle '{}' has no group and is not built-in",
                        bundle.name
                    )));
                }
            }
        }
    }

    // Closure invariants: superset of direct deps, no self, no duplicates.
    for (i, bundle) in layout.bundles.iter().enumerate() {
        let bid = BundleId(i as u32);
        let expanded: HashSet<BundleId> = bundle.expanded_dependencies.iter().copied().collect();
        if expanded.len() != bundle.expanded_dependencies.len() {
            errors.push(LayoutError::Inconsistent(format!(
                "bundle '{}' has duplicate entries in its expanded dependencies",
                bundle.name
            )));
        }
        if expanded.contains(&bid) {
            errors.push(LayoutError::Inconsistent(format!(
                "bundle '{}' contains itself in its expanded dependencies",
                bundle.name
            )));
        }
        for dep in &bundle.dependencies {
            if !expanded.contains(dep) {
                errors.push(LayoutError::Inconsistent(format!(
                    "bundle '{}' direct dependency '{}' missing from expanded dependencies",
                    bundle.name,
                    layout.bundle(*dep).name
                )));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LayoutBuilder;
    use crate::bundle::Compression;
    use crate::group::PackingMode;

    fn sample_layout() -> Layout {
        let mut b = LayoutBuilder::new("t", "p");
        let g = b.add_group("A", "a", PackingMode::PackTogether).unwrap();
        let b1 = b.add_bundle(g, "bundleA", 0, Compression::Lz4).unwrap();
        let b2 = b.add_bundle(g, "bundleB", 0, Compression::Lz4).unwrap();
        b.add_dependency(b1, b2).unwrap();
        let f = b.add_file(b1, "archive0").unwrap();
        b.add_asset(f, "guid-1", "Assets/a.png").unwrap();
        b.finalize().unwrap()
    }

    #[test]
    fn test_builder_layout_passes() {
        assert!(validate_layout(&sample_layout()).is_ok());
    }

    #[test]
    fn test_self_in_closure_detected() {
        let mut layout = sample_layout();
        layout.bundles[0]
            .expanded_dependencies
            .push(BundleId(0));
        let errors = validate_layout(&layout).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("contains itself")));
    }

    #[test]
    fn test_broken_back_reference_detected() {
        let mut layout = sample_layout();
        // Detach the file from its bundle's list, leaving the back-ref.
        layout.bundles[0].files.clear();
        let errors = validate_layout(&layout).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("does not list it")));
    }

    #[test]
    fn test_orphan_bundle_detected() {
        let mut layout = sample_layout();
        layout.bundles[1].group = None;
        let errors = validate_layout(&layout).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("not built-in")));
    }

    #[test]
    fn test_missing_direct_dep_in_closure_detected() {
        let mut layout = sample_layout();
        layout.bundles[0].expanded_dependencies.clear();
        let errors = validate_layout(&layout).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("missing from expanded")));
    }
}
