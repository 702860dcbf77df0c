//! Contact-sheet geometry.
//!
//! All sizes are in pixels. The defaults reproduce the reference sheet:
//! 100 px thumbnails, five per row, on a 510 px wide canvas.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_THUMBNAIL_CAP: u32 = 100;
const DEFAULT_COLUMNS: u32 = 5;
const DEFAULT_CANVAS_WIDTH: u32 = 510;
const DEFAULT_BLOCK_INSET: u32 = 5;
const DEFAULT_LABEL_TOP: u32 = 10;
const DEFAULT_GRID_TOP: u32 = 40;
const DEFAULT_EMPTY_BLOCK_HEIGHT: u32 = 90;
const DEFAULT_LINE_HEIGHT: u32 = 24;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("invalid layout: {0}")]
    InvalidConfig(String),
    #[error("block is {width} px wide but the canvas is only {canvas_width} px")]
    CanvasOverflow { width: u32, canvas_width: u32 },
    #[error("no matching records; nothing to put on the sheet")]
    EmptySheet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Largest thumbnail side, and the size of one grid cell.
    pub thumbnail_cap: u32,
    /// Thumbnails per grid row.
    pub columns: u32,
    /// Width of the final sheet.
    pub canvas_width: u32,
    /// Left inset of label and grid inside a block. Blocks are `2 * inset` wider than their grid.
    pub block_inset: u32,
    /// Top of the first label line.
    pub label_top: u32,
    /// Offset of the grid inside a block; blocks are this much taller than their grid.
    pub grid_top: u32,
    /// Height of the block drawn for a match without faces.
    pub empty_block_height: u32,
    /// Vertical advance between label lines.
    pub line_height: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            thumbnail_cap: DEFAULT_THUMBNAIL_CAP,
            columns: DEFAULT_COLUMNS,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            block_inset: DEFAULT_BLOCK_INSET,
            label_top: DEFAULT_LABEL_TOP,
            grid_top: DEFAULT_GRID_TOP,
            empty_block_height: DEFAULT_EMPTY_BLOCK_HEIGHT,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }
}

impl LayoutConfig {
    /// Reject configurations that cannot produce a sheet.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.thumbnail_cap == 0 {
            return Err(LayoutError::InvalidConfig("thumbnail_cap must be > 0".into()));
        }
        if self.columns == 0 {
            return Err(LayoutError::InvalidConfig("columns must be > 0".into()));
        }
        // Label lines are drawn at signed pixel offsets.
        let notice_top = self
            .line_height
            .checked_mul(2)
            .and_then(|d| d.checked_add(self.label_top))
            .filter(|&top| i32::try_from(top).is_ok());
        if notice_top.is_none() {
            return Err(LayoutError::InvalidConfig(format!(
                "label_top ({}) and line_height ({}) are out of range",
                self.label_top, self.line_height
            )));
        }
        if self.grid_top < self.label_top {
            return Err(LayoutError::InvalidConfig(format!(
                "grid_top ({}) must not be above label_top ({})",
                self.grid_top, self.label_top
            )));
        }

        let width = self
            .columns
            .checked_mul(self.thumbnail_cap)
            .and_then(|grid| grid.checked_add(self.block_inset.checked_mul(2)?))
            .ok_or_else(|| {
                LayoutError::InvalidConfig(format!(
                    "{} columns of {} px plus {} px insets do not fit in a u32",
                    self.columns, self.thumbnail_cap, self.block_inset
                ))
            })?;
        if width > self.canvas_width {
            return Err(LayoutError::CanvasOverflow {
                width,
                canvas_width: self.canvas_width,
            });
        }
        Ok(())
    }

    /// Width of a thumbnail grid. Only meaningful for a layout that passed [`Self::validate`].
    pub fn grid_width(&self) -> u32 {
        self.columns * self.thumbnail_cap
    }

    /// Height of a grid holding `faces` thumbnails (zero when there are none).
    pub fn grid_height(&self, faces: usize) -> u32 {
        let rows = (faces as u32).div_ceil(self.columns);
        rows * self.thumbnail_cap
    }

    /// Width of every per-record block.
    pub fn block_width(&self) -> u32 {
        self.grid_width() + 2 * self.block_inset
    }

    /// Height of the block for a matched record with `faces` thumbnails.
    pub fn block_height(&self, faces: usize) -> u32 {
        if faces == 0 {
            self.empty_block_height
        } else {
            self.grid_height(faces) + self.grid_top
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let layout = LayoutConfig::default();
        layout.validate().unwrap();
        assert_eq!(layout.grid_width(), 500);
        assert_eq!(layout.block_width(), 510);
        assert_eq!(layout.block_width(), layout.canvas_width);
    }

    #[test]
    fn test_grid_height_rounds_rows_up() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.grid_height(0), 0);
        assert_eq!(layout.grid_height(1), 100);
        assert_eq!(layout.grid_height(5), 100);
        assert_eq!(layout.grid_height(6), 200);
        assert_eq!(layout.grid_height(11), 300);
    }

    #[test]
    fn test_block_heights() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.block_height(0), 90);
        assert_eq!(layout.block_height(2), 140);
        assert_eq!(layout.block_height(7), 240);
    }

    #[test]
    fn test_validate_rejects_overflow() {
        let layout = LayoutConfig {
            thumbnail_cap: 120,
            ..LayoutConfig::default()
        };
        assert_eq!(
            layout.validate(),
            Err(LayoutError::CanvasOverflow { width: 610, canvas_width: 510 })
        );
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let zero_cap = LayoutConfig { thumbnail_cap: 0, ..LayoutConfig::default() };
        assert!(matches!(zero_cap.validate(), Err(LayoutError::InvalidConfig(_))));

        let zero_columns = LayoutConfig { columns: 0, ..LayoutConfig::default() };
        assert!(matches!(zero_columns.validate(), Err(LayoutError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_arithmetic_overflow() {
        let huge_columns = LayoutConfig { columns: u32::MAX, thumbnail_cap: 2, ..LayoutConfig::default() };
        assert!(matches!(huge_columns.validate(), Err(LayoutError::InvalidConfig(_))));

        // 2^31 columns of 2 px would wrap to a zero-width grid.
        let wrapping = LayoutConfig { columns: 1 << 31, thumbnail_cap: 2, ..LayoutConfig::default() };
        assert!(matches!(wrapping.validate(), Err(LayoutError::InvalidConfig(_))));

        let huge_inset = LayoutConfig { block_inset: u32::MAX, ..LayoutConfig::default() };
        assert!(matches!(huge_inset.validate(), Err(LayoutError::InvalidConfig(_))));

        let huge_line = LayoutConfig { line_height: u32::MAX / 2, ..LayoutConfig::default() };
        assert!(matches!(huge_line.validate(), Err(LayoutError::InvalidConfig(_))));
    }

    #[test]
    fn test_wider_canvas_is_allowed() {
        let layout = LayoutConfig { canvas_width: 800, ..LayoutConfig::default() };
        layout.validate().unwrap();
    }
}
