//! # bundlescope-core
//!
//! Foundational types for the bundlescope build-layout model.
//! This crate contains the pieces shared across bundlescope crates:
//! error types, typed arena ids, and content hashing.

pub mod error;
pub mod hash;
pub mod key;

pub use error::{LayoutError, LayoutResult};
pub use hash::ContentHash;
pub use key::{AssetId, BundleId, FileId, GroupId, ImplicitId};
