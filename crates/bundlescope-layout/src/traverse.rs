//! Order-preserving flattening over the frozen graph.
//!
//! All of these are lazy, restartable iterators borrowing the layout; each
//! call yields a fresh sequence and performs no allocation beyond the
//! iterator itself. They are read-only and safe for any number of
//! concurrent readers.

use crate::asset::ExplicitAsset;
use crate::bundle::Bundle;
use crate::file::File;
use crate::layout::Layout;

impl Layout {
    /// Every bundle exactly once: built-in bundles in stored order, then
    /// each group's bundles in group order, bundle order within the group.
    /// Purely structural concatenation; no dependency-order guarantee.
    pub fn bundles<'a>(&'a self) -> impl Iterator<Item = &'a Bundle> + 'a {
        self.builtin_bundles
            .iter()
            .copied()
            .chain(self.groups.iter().flat_map(|g| g.bundles.iter().copied()))
            .map(move |id| self.bundle(id))
    }

    /// Files of every bundle, flattened in [`Layout::bundles`] order,
    /// file order within each bundle.
    pub fn files<'a>(&'a self) -> impl Iterator<Item = &'a File> + 'a {
        self.bundles().flat_map(move |b| self.files_of(b))
    }

    /// Files of a single bundle, in stored order.
    pub fn files_of<'a>(&'a self, bundle: &'a Bundle) -> impl Iterator<Item = &'a File> + 'a {
        bundle.files.iter().map(move |&id| self.file(id))
    }

    /// Explicit assets of every file, flattened in [`Layout::files`] order,
    /// asset order within each file.
    pub fn assets<'a>(&'a self) -> impl Iterator<Item = &'a ExplicitAsset> + 'a {
        self.files()
            .flat_map(move |f| f.assets.iter().map(move |&id| self.asset(id)))
    }

    /// Explicit assets of a single bundle, flattened in file order then
    /// asset order.
    pub fn assets_of<'a>(
        &'a self,
        bundle: &'a Bundle,
    ) -> impl Iterator<Item = &'a ExplicitAsset> + 'a {
        self.files_of(bundle)
            .flat_map(move |f| f.assets.iter().map(move |&id| self.asset(id)))
    }
}
