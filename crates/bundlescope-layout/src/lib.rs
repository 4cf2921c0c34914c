//! # bundlescope-layout
//!
//! The build layout graph: which groups produced which bundles, the files
//! each bundle wrote, the assets in each file, and the dependency edges
//! between bundles.
//!
//! Built once through [`LayoutBuilder`], frozen at `finalize()`, then
//! queried read-only via [`LayoutIndex`], the iterators on [`Layout`], and
//! the [`doc`] serialized form.

pub mod asset;
pub mod builder;
pub mod bundle;
pub mod doc;
pub mod file;
pub mod group;
pub mod index;
pub mod layout;
pub mod traverse;
pub mod validate;

pub(crate) mod closure;

pub use asset::{ExplicitAsset, ImplicitAssetData};
pub use builder::LayoutBuilder;
pub use bundle::{Bundle, Compression};
pub use doc::{LayoutDoc, LoadedLayout};
pub use file::{File, SubFile};
pub use group::{Group, PackingMode, SchemaData, SchemaEntry};
pub use index::LayoutIndex;
pub use layout::Layout;
