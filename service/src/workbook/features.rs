use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Workbook rendering features to enable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct WorkbookFeatures: u8 {
        /// Freeze header rows.
        const FREEZE_HEADERS = 0b0001;
        /// Add dropdown data validation to terminology columns.
        const DATA_VALIDATION = 0b0010;
        /// Attach cell comments as notes.
        const NOTES = 0b0100;
        /// Protect locked sheets and locked header cells.
        const PROTECTION = 0b1000;

        /// All features enabled (default).
        const ALL = Self::FREEZE_HEADERS.bits()
                  | Self::DATA_VALIDATION.bits()
                  | Self::NOTES.bits()
                  | Self::PROTECTION.bits();

        /// Values and styling only.
        const NONE = 0b0000;
    }
}

impl Default for WorkbookFeatures {
    fn default() -> Self {
        Self::ALL
    }
}
