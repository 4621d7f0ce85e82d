use crate::core::models::document::{Alignment, Cell, ImageCell, ImageTable};
use std::path::PathBuf;

/// Lays out images left to right, top to bottom, `columns` per row.
///
/// The last row is completed with empty cells when it is short; a full last row
/// gets none. Returns `None` for an empty image list.
pub fn layout_grid(images: Vec<PathBuf>, columns: usize, padding: f32) -> Option<ImageTable> {
    if images.is_empty() {
        return None;
    }
    let columns = columns.max(1);
    let mut cells: Vec<Cell> = images
        .into_iter()
        .map(|path| {
            Cell::Image(ImageCell {
                path,
                padding,
                alignment: Alignment::Center,
                bordered: false,
            })
        })
        .collect();

    let remainder = cells.len() % columns;
    if remainder != 0 {
        cells.extend(std::iter::repeat_n(Cell::Empty, columns - remainder));
    }

    let rows = cells.chunks(columns).map(<[Cell]>::to_vec).collect();
    Some(ImageTable { columns, rows })
}
