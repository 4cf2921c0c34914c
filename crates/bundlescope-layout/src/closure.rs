//! Transitive dependency closure over the bundle graph.
//!
//! Runs once at `finalize()`. Depth-first reachability from each bundle
//! with a per-bundle visited set, so the walk terminates and deduplicates
//! even if the raw `dependencies` relation contains cycles. Output order is
//! first-discovery (depth-first preorder); the start bundle is never
//! included in its own closure.

use std::collections::HashSet;

use bundlescope_core::BundleId;

use crate::layout::Layout;

/// Fill in `expanded_dependencies` for every bundle.
pub(crate) fn expand_all(layout: &mut Layout) {
    for i in 0..layout.bundles.len() {
        let expanded = expand_from(layout, BundleId(i as u32));
        layout.bundles[i].expanded_dependencies = expanded;
    }
}

fn expand_from(layout: &Layout, start: BundleId) -> Vec<BundleId> {
    let mut visited: HashSet<BundleId> = HashSet::new();
    let mut order = Vec::new();
    let mut stack: Vec<BundleId> = Vec::new();

    // Seeding visited with the start bundle keeps it out of its own
    // closure even when a cycle leads back to it.
    visited.insert(start);
    for &dep in layout.bundle(start).dependencies.iter().rev() {
        stack.push(dep);
    }

    while let Some(bundle) = stack.pop() {
        if !visited.insert(bundle) {
            continue;
        }
        order.push(bundle);
        // Reverse push so the first-listed dependency is explored first.
        for &dep in layout.bundle(bundle).dependencies.iter().rev() {
            if !visited.contains(&dep) {
                stack.push(dep);
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LayoutBuilder;
    use crate::bundle::Compression;
    use crate::group::PackingMode;

    fn bundles(b: &mut LayoutBuilder, names: &[&str]) -> Vec<BundleId> {
        let g = b
            .add_group("Default", "default", PackingMode::PackTogether)
            .unwrap();
        names
            .iter()
            .map(|n| b.add_bundle(g, *n, 0, Compression::Lz4).unwrap())
            .collect()
    }

    #[test]
    fn test_chain_closure() {
        let mut b = LayoutBuilder::new("t", "p");
        let ids = bundles(&mut b, &["a", "b", "c"]);
        b.add_dependency(ids[0], ids[1]).unwrap();
        b.add_dependency(ids[1], ids[2]).unwrap();
        let layout = b.finalize().unwrap();
        assert_eq!(
            layout.bundle(ids[0]).expanded_dependencies,
            vec![ids[1], ids[2]]
        );
        assert_eq!(layout.bundle(ids[1]).expanded_dependencies, vec![ids[2]]);
        assert!(layout.bundle(ids[2]).expanded_dependencies.is_empty());
    }

    #[test]
    fn test_two_cycle_excludes_self() {
        let mut b = LayoutBuilder::new("t", "p");
        let ids = bundles(&mut b, &["a", "b"]);
        b.add_dependency(ids[0], ids[1]).unwrap();
        b.add_dependency(ids[1], ids[0]).unwrap();
        let layout = b.finalize().unwrap();
        assert_eq!(layout.bundle(ids[0]).expanded_dependencies, vec![ids[1]]);
        assert_eq!(layout.bundle(ids[1]).expanded_dependencies, vec![ids[0]]);
    }

    #[test]
    fn test_three_cycle() {
        let mut b = LayoutBuilder::new("t", "p");
        let ids = bundles(&mut b, &["a", "b", "c"]);
        b.add_dependency(ids[0], ids[1]).unwrap();
        b.add_dependency(ids[1], ids[2]).unwrap();
        b.add_dependency(ids[2], ids[0]).unwrap();
        let layout = b.finalize().unwrap();
        // Each bundle reaches the other two, never itself, no duplicates.
        assert_eq!(
            layout.bundle(ids[0]).expanded_dependencies,
            vec![ids[1], ids[2]]
        );
        assert_eq!(
            layout.bundle(ids[1]).expanded_dependencies,
            vec![ids[2], ids[0]]
        );
        assert_eq!(
            layout.bundle(ids[2]).expanded_dependencies,
            vec![ids[0], ids[1]]
        );
    }

    #[test]
    fn test_diamond_deduplicates_in_preorder() {
        let mut b = LayoutBuilder::new("t", "p");
        let ids = bundles(&mut b, &["root", "left", "right", "leaf"]);
        b.add_dependency(ids[0], ids[1]).unwrap();
        b.add_dependency(ids[0], ids[2]).unwrap();
        b.add_dependency(ids[1], ids[3]).unwrap();
        b.add_dependency(ids[2], ids[3]).unwrap();
        let layout = b.finalize().unwrap();
        // Depth-first: left's subtree (leaf) is discovered before right.
        assert_eq!(
            layout.bundle(ids[0]).expanded_dependencies,
            vec![ids[1], ids[3], ids[2]]
        );
    }

    #[test]
    fn test_direct_deps_subset_of_expanded() {
        let mut b = LayoutBuilder::new("t", "p");
        let ids = bundles(&mut b, &["a", "b", "c", "d"]);
        b.add_dependency(ids[0], ids[2]).unwrap();
        b.add_dependency(ids[0], ids[3]).unwrap();
        b.add_dependency(ids[2], ids[1]).unwrap();
        let layout = b.finalize().unwrap();
        let expanded = &layout.bundle(ids[0]).expanded_dependencies;
        for dep in &layout.bundle(ids[0]).dependencies {
            assert!(expanded.contains(dep));
        }
    }
}
