//! Configuration for workbook rendering

use super::features::WorkbookFeatures;
use serde::{Deserialize, Serialize};

/// Styling and limits used when rendering grids to a workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookConfig {
    /// Fill colour of error cells (RGB hex)
    pub error_fill: String,

    /// Minimum width of header columns
    pub min_column_width: f64,

    /// Last worksheet row, one-based, covered by dropdown validation
    pub validation_rows: u32,

    /// Author of cell notes
    pub note_author: String,

    /// Enabled features
    pub features: WorkbookFeatures,
}

impl Default for WorkbookConfig {
    fn default() -> Self {
        Self {
            error_fill: "FFD8D8".to_string(),
            min_column_width: 15.0,
            validation_rows: 1000,
            note_author: "Validation service".to_string(),
            features: WorkbookFeatures::ALL,
        }
    }
}

impl WorkbookConfig {
    /// Parse hex color string to RGB u32
    #[must_use]
    pub fn parse_hex_color(hex: &str) -> u32 {
        u32::from_str_radix(hex.trim_start_matches('#'), 16).unwrap_or(0x00FF_D8D8)
    }

    /// Get error fill as RGB u32
    #[must_use]
    pub fn error_fill_rgb(&self) -> u32 {
        Self::parse_hex_color(&self.error_fill)
    }

    /// Whether a feature is enabled
    #[must_use]
    pub fn has(&self, feature: WorkbookFeatures) -> bool {
        self.features.contains(feature)
    }

    /// Disable a feature
    #[must_use]
    pub fn without(mut self, feature: WorkbookFeatures) -> Self {
        self.features.remove(feature);
        self
    }
}
