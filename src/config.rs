//! Editor tuning knobs.
//!
//! Every field has a default matching the stock Event Storming canvas, so a
//! config file only needs to name what it overrides:
//!
//! ```toml
//! grid_size = 10.0
//! history_limit = 200
//!
//! [group_padding]
//! header = 36.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::Position;

/// Storage key the diagram is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "event-storming-diagram";

/// Padding applied around a group's children when deriving its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupPadding {
    /// Added on the left and right.
    pub horizontal: f32,
    /// Added above and below.
    pub vertical: f32,
    /// Extra room above the children for the group title.
    pub header: f32,
}

impl Default for GroupPadding {
    fn default() -> Self {
        Self {
            horizontal: 40.0,
            vertical: 32.0,
            header: 28.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid spacing used to quantize released drags.
    pub grid_size: f32,
    /// Maximum distance (exclusive) at which a node edge is pulled onto a neighbour's.
    pub snap_distance: f32,
    /// Snap the dragged node when the drag-stop handler fires.
    pub snap_on_release: bool,
    pub group_padding: GroupPadding,
    /// Offset applied to duplicated nodes.
    pub duplicate_offset: Position,
    /// Half-width of the random offset applied to inserts placed at the viewport centre.
    pub insert_jitter: f32,
    /// Bucket size used by auto-align to decide which nodes share a row or column.
    pub align_grid: f32,
    /// Gap kept between neighbours pushed apart by auto-align.
    pub align_gap: f32,
    pub storage_key: String,
    /// Maximum number of undo steps kept. `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            snap_distance: 15.0,
            snap_on_release: true,
            group_padding: GroupPadding::default(),
            duplicate_offset: Position::new(30.0, 30.0),
            insert_jitter: 50.0,
            align_grid: 40.0,
            align_gap: 2.0,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            history_limit: None,
        }
    }
}

impl EditorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_canvas() {
        let config = EditorConfig::default();
        assert_eq!(config.grid_size, 20.0);
        assert_eq!(config.snap_distance, 15.0);
        assert_eq!(config.group_padding.horizontal, 40.0);
        assert_eq!(config.group_padding.vertical, 32.0);
        assert_eq!(config.group_padding.header, 28.0);
        assert_eq!(config.duplicate_offset, Position::new(30.0, 30.0));
        assert_eq!(config.storage_key, "event-storming-diagram");
        assert!(config.history_limit.is_none());
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_named_fields_only() {
        let config = EditorConfig::from_toml_str(
            r#"
            grid_size = 10.0
            history_limit = 5

            [group_padding]
            header = 36.0
            "#,
        )
        .unwrap();

        assert_eq!(config.grid_size, 10.0);
        assert_eq!(config.history_limit, Some(5));
        assert_eq!(config.group_padding.header, 36.0);
        assert_eq!(config.group_padding.horizontal, 40.0);
        assert_eq!(config.snap_distance, 15.0);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = EditorConfig::from_toml_str("grid_size = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = EditorConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
