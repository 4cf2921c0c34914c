use serde::{Deserialize, Serialize};

use bundlescope_core::BundleId;

/// How a group packs its assets into bundles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackingMode {
    /// All assets of the group packed into a single bundle.
    #[default]
    PackTogether,
    /// One bundle per asset.
    PackSeparately,
    /// One bundle per label.
    PackTogetherByLabel,
}

impl std::fmt::Display for PackingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackingMode::PackTogether => write!(f, "pack_together"),
            PackingMode::PackSeparately => write!(f, "pack_separately"),
            PackingMode::PackTogetherByLabel => write!(f, "pack_together_by_label"),
        }
    }
}

/// One key/value entry of a schema snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaEntry {
    pub key: String,
    pub value: String,
}

impl SchemaEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Raw snapshot of one build-schema configuration attached to a group.
///
/// Entries are an ordered dump of the configuration as the producer saw it;
/// duplicate keys are permitted and preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaData {
    pub schema_type: String,
    pub entries: Vec<SchemaEntry>,
}

impl SchemaData {
    pub fn new(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: schema_type.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push(SchemaEntry::new(key, value));
        self
    }
}

/// A logical collection of assets configured together, producing zero or
/// more bundles.
#[derive(Debug, Clone)]
pub struct Group {
    /// Human-readable group name. Not guaranteed unique.
    pub name: String,
    /// Stable group id, unique within a layout.
    pub id: String,
    pub packing_mode: PackingMode,
    /// Bundles owned exclusively by this group, in production order.
    pub bundles: Vec<BundleId>,
    /// Schema configuration snapshots, in declaration order.
    pub schemas: Vec<SchemaData>,
}

impl Group {
    pub(crate) fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        packing_mode: PackingMode,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            packing_mode,
            bundles: Vec::new(),
            schemas: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing_mode_display() {
        assert_eq!(PackingMode::PackTogether.to_string(), "pack_together");
        assert_eq!(
            PackingMode::PackTogetherByLabel.to_string(),
            "pack_together_by_label"
        );
    }

    #[test]
    fn test_schema_duplicate_keys_preserved() {
        let schema = SchemaData::new("BundledAssetGroupSchema")
            .with_entry("compression", "lz4")
            .with_entry("compression", "lzma");
        assert_eq!(schema.entries.len(), 2);
        assert_eq!(schema.entries[0].key, schema.entries[1].key);
    }
}
