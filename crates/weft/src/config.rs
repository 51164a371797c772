// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants and engine configuration.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: wire constants shared by every codec
//! - **Level 2 (Per engine)**: [`EngineConfig`], fixed when the engine is
//!   built, optionally loaded from YAML (`config-loaders` feature)
//!
//! # Example YAML
//!
//! ```yaml
//! references: true
//! registration_required: false
//! max_depth: 96
//! max_inflated_size: 1048576
//! default_structure: named_schema
//! compatible:
//!   chunk_size: 512
//!   write_value_class: true
//! tagged:
//!   skip_unknown_tags: true
//! ```

#[cfg(feature = "config-loaders")]
use crate::error::{ErrorKind, Result};
#[cfg(feature = "config-loaders")]
use std::path::Path;

// =======================================================================
// Class tokens
// =======================================================================

/// Class token for a null value.
pub const NULL_CLASS: u32 = 0;

/// Class token announcing a class written by name.
pub const NAME_CLASS: u32 = 1;

/// Registered ids are written as `id + CLASS_ID_OFFSET`.
pub const CLASS_ID_OFFSET: u32 = 2;

// =======================================================================
// Reference markers
// =======================================================================

/// Marker preceding an object written in full (first occurrence).
pub const REF_NEW: u32 = 0;

/// First ordinal handed out in a graph.
pub const FIRST_ORDINAL: u32 = 1;

/// Presence byte for a nullable member without its own null encoding.
pub const PRESENT: u8 = 1;
pub const ABSENT: u8 = 0;

// =======================================================================
// Defaults
// =======================================================================

/// Default nesting limit before a resource error is raised. Sized so the
/// deepest codec recursion fits a 2 MiB thread stack in debug builds.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default cap on the inflated size of one deflate block (16 MiB).
pub const DEFAULT_MAX_INFLATED_SIZE: usize = 16 * 1024 * 1024;

/// Default chunk size for named-schema member framing.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Structural codec used for classes without an explicit codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config-loaders",
    derive(serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum StructureKind {
    /// Members in alphabetical order, no schema on the wire.
    #[default]
    FieldOrder,
    /// Member names once per stream, values in chunked frames.
    NamedSchema,
    /// A tag before each member value.
    Tagged,
    /// One type version number before the members.
    Versioned,
}

/// Member handling shared by every structural codec.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config-loaders",
    derive(serde::Deserialize),
    serde(default)
)]
pub struct FieldConfig {
    /// Include members flagged transient.
    pub serialize_transient: bool,
    /// Reference members may be null unless the member says otherwise.
    pub fields_can_be_null: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            serialize_transient: false,
            fields_can_be_null: true,
        }
    }
}

/// Named-schema codec settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config-loaders",
    derive(serde::Deserialize),
    serde(default)
)]
pub struct CompatibleConfig {
    /// Maximum bytes per chunk of a member frame.
    pub chunk_size: usize,
    /// Write every member as class-and-object so unknown members can be
    /// decoded instead of skipped. Must match on both ends.
    pub write_value_class: bool,
}

impl Default for CompatibleConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            write_value_class: false,
        }
    }
}

/// Tag-keyed codec settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "config-loaders",
    derive(serde::Deserialize),
    serde(default)
)]
pub struct TaggedConfig {
    /// Decode and drop members with unknown tags instead of failing.
    /// Only possible when `write_value_class` is also set.
    pub skip_unknown_tags: bool,
    /// Write the concrete class before each member value. Must match on
    /// both ends.
    pub write_value_class: bool,
}

/// Version-gated codec settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config-loaders",
    derive(serde::Deserialize),
    serde(default)
)]
pub struct VersionConfig {
    /// Accept streams whose version differs from the local one.
    pub compatible: bool,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self { compatible: true }
    }
}

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config-loaders",
    derive(serde::Deserialize),
    serde(default)
)]
pub struct EngineConfig {
    /// Track object identity so shared and cyclic graphs round-trip.
    pub references: bool,
    /// Refuse to write or read classes that were not registered.
    pub registration_required: bool,
    /// Maximum object nesting depth. Leaf values do not count.
    pub max_depth: usize,
    /// Largest inflated size accepted from one deflate block.
    pub max_inflated_size: usize,
    /// Codec for classes registered without one.
    pub default_structure: StructureKind,
    pub field: FieldConfig,
    pub compatible: CompatibleConfig,
    pub tagged: TaggedConfig,
    pub versioned: VersionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            references: true,
            registration_required: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_inflated_size: DEFAULT_MAX_INFLATED_SIZE,
            default_structure: StructureKind::default(),
            field: FieldConfig::default(),
            compatible: CompatibleConfig::default(),
            tagged: TaggedConfig::default(),
            versioned: VersionConfig::default(),
        }
    }
}

#[cfg(feature = "config-loaders")]
impl EngineConfig {
    /// Parse a YAML document; omitted keys keep their defaults.
    pub fn from_yaml_str(yaml_content: &str) -> Result<Self> {
        serde_yaml::from_str(yaml_content).map_err(|e| {
            ErrorKind::InvalidConfig(format!("Failed to parse YAML: {}", e)).into()
        })
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.references);
        assert!(!config.registration_required);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_inflated_size, DEFAULT_MAX_INFLATED_SIZE);
        assert_eq!(config.default_structure, StructureKind::FieldOrder);
        assert!(config.field.fields_can_be_null);
        assert_eq!(config.compatible.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(!config.tagged.skip_unknown_tags);
        assert!(config.versioned.compatible);
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_config_from_yaml_partial() {
        let yaml = r#"
references: false
max_depth: 64
default_structure: named_schema
compatible:
  write_value_class: true
tagged:
  skip_unknown_tags: true
  write_value_class: true
"#;
        let config = EngineConfig::from_yaml_str(yaml).expect("valid YAML");
        assert!(!config.references);
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.default_structure, StructureKind::NamedSchema);
        assert!(config.compatible.write_value_class);
        assert_eq!(config.compatible.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(config.tagged.skip_unknown_tags);
        assert!(config.versioned.compatible);
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_config_from_yaml_rejects_unknown_structure() {
        let err = EngineConfig::from_yaml_str("default_structure: protobuf").unwrap_err();
        assert_eq!(err.category(), crate::ErrorCategory::Configuration);
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_config_from_yaml_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "registration_required: true").expect("write");
        writeln!(file, "versioned:\n  compatible: false").expect("write");

        let config = EngineConfig::from_yaml_file(file.path()).expect("load");
        assert!(config.registration_required);
        assert!(!config.versioned.compatible);

        let missing = EngineConfig::from_yaml_file("/nonexistent/weft.yaml").unwrap_err();
        assert_eq!(missing.category(), crate::ErrorCategory::Io);
    }
}
