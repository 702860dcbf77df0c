//! Contact-sheet composition.
//!
//! Three levels, each built from the one below:
//! - grid: a record's face thumbnails packed row-major, `columns` per row
//! - block: a white panel with the record label and its grid (or a "no faces" note)
//! - sheet: all blocks stacked top to bottom on a fixed-width canvas

use crate::layout::{LayoutConfig, LayoutError};
use crate::painter::LabelPainter;
use crate::types::{RecordMatch, Thumbnail};
use image::{imageops, Rgb, RgbImage};

const SHEET_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
/// Empty grid cells stay black.
const GRID_BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const NO_FACES_NOTICE: &str = "But there were no faces in that file!";

/// Heading drawn at the top of every block.
pub fn block_heading(label: &str) -> String {
    format!("Results found in file {label}")
}

/// Pack thumbnails into a grid `columns` cells wide.
///
/// Returns `None` for an empty slice; there is no zero-height grid.
pub fn compose_mini_grid(thumbnails: &[Thumbnail], layout: &LayoutConfig) -> Option<RgbImage> {
    if thumbnails.is_empty() {
        return None;
    }

    let cell = layout.thumbnail_cap;
    let columns = layout.columns as usize;
    let mut grid = RgbImage::from_pixel(
        layout.grid_width(),
        layout.grid_height(thumbnails.len()),
        GRID_BACKGROUND,
    );

    for (i, thumb) in thumbnails.iter().enumerate() {
        let x = (i % columns) as u32 * cell;
        let y = (i / columns) as u32 * cell;
        if thumb.width() > cell || thumb.height() > cell {
            // Built for a larger cap; shrink it so it stays inside its own cell.
            tracing::warn!(width = thumb.width(), height = thumb.height(), cell, "thumbnail larger than grid cell");
            let fitted = Thumbnail::fit(thumb.image().clone(), cell);
            imageops::replace(&mut grid, fitted.image(), i64::from(x), i64::from(y));
        } else {
            imageops::replace(&mut grid, thumb.image(), i64::from(x), i64::from(y));
        }
    }

    Some(grid)
}

/// Build the labelled block for one matched record.
pub fn compose_block(
    label: &str,
    thumbnails: &[Thumbnail],
    layout: &LayoutConfig,
    painter: &dyn LabelPainter,
) -> RgbImage {
    let width = layout.block_width();
    let height = layout.block_height(thumbnails.len());
    let mut block = RgbImage::from_pixel(width, height, SHEET_BACKGROUND);

    let x = layout.block_inset as i32;
    let y = layout.label_top as i32;
    painter.draw_line(&mut block, x, y, &block_heading(label));

    match compose_mini_grid(thumbnails, layout) {
        Some(grid) => {
            imageops::replace(
                &mut block,
                &grid,
                i64::from(layout.block_inset),
                i64::from(layout.grid_top),
            );
        }
        None => {
            // Heading, a blank line, then the notice.
            let notice_y = y + 2 * layout.line_height as i32;
            painter.draw_line(&mut block, x, notice_y, NO_FACES_NOTICE);
        }
    }

    block
}

/// Stack blocks vertically, in order, on a canvas `canvas_width` wide.
pub fn assemble_sheet(blocks: &[RgbImage], canvas_width: u32) -> Result<RgbImage, LayoutError> {
    if blocks.is_empty() {
        return Err(LayoutError::EmptySheet);
    }
    if let Some(wide) = blocks.iter().find(|b| b.width() > canvas_width) {
        return Err(LayoutError::CanvasOverflow {
            width: wide.width(),
            canvas_width,
        });
    }

    let total_height: u32 = blocks.iter().map(|b| b.height()).sum();
    let mut sheet = RgbImage::from_pixel(canvas_width, total_height, SHEET_BACKGROUND);

    let mut y = 0u32;
    for block in blocks {
        imageops::replace(&mut sheet, block, 0, i64::from(y));
        y += block.height();
    }

    Ok(sheet)
}

/// Compose the full contact sheet for one search.
///
/// Unmatched records are skipped. Fails with [`LayoutError::EmptySheet`]
/// when nothing matched.
pub fn compose_sheet(
    matches: &[RecordMatch],
    layout: &LayoutConfig,
    painter: &dyn LabelPainter,
) -> Result<RgbImage, LayoutError> {
    layout.validate()?;

    let blocks: Vec<RgbImage> = matches
        .iter()
        .filter(|m| m.matched)
        .map(|m| compose_block(&m.source_name, &m.thumbnails, layout, painter))
        .collect();

    tracing::debug!(
        blocks = blocks.len(),
        skipped = matches.len() - blocks.len(),
        "composing contact sheet"
    );

    assemble_sheet(&blocks, layout.canvas_width)
}
