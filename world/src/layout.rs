//! Raw generator output consumed when a dungeon is assembled.

use dungeon_core::{CellCoord, CellKind, CellRect};

/// Grid, room rectangles and dead ends produced by an external generator.
///
/// Rows are stored in ascending row order, so the first text line passed to
/// [`Layout::from_rows`] describes row zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
    rooms: Vec<CellRect>,
    deadends: Vec<CellCoord>,
}

/// Reasons a layout cannot be accepted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The grid has no cells.
    #[error("layout grid is empty")]
    Empty,
    /// The cell buffer does not match the declared dimensions.
    #[error("expected {expected} cells, found {found}")]
    CellCountMismatch {
        /// Number of cells implied by the dimensions.
        expected: usize,
        /// Number of cells provided.
        found: usize,
    },
    /// A text row differs in width from the first row.
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        /// Offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A text row contains a character no cell kind uses.
    #[error("unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Column of the character.
        column: usize,
        /// Row of the character.
        row: usize,
    },
    /// A room rectangle is empty or leaves the grid.
    #[error("room {index} is empty or extends beyond the grid")]
    RoomOutOfBounds {
        /// Position of the room in the room list.
        index: usize,
    },
    /// A dead end lies outside the grid.
    #[error("dead end {cell:?} lies outside the grid")]
    DeadendOutOfBounds {
        /// Offending coordinate.
        cell: CellCoord,
    },
    /// An explicit room kind list does not match the room count.
    #[error("expected {expected} room kinds, found {found}")]
    RoomKindCount {
        /// Number of rooms in the layout.
        expected: usize,
        /// Number of kinds provided.
        found: usize,
    },
}

impl Layout {
    /// Validates and wraps generator output.
    pub fn new(
        columns: u32,
        rows: u32,
        cells: Vec<CellKind>,
        rooms: Vec<CellRect>,
        deadends: Vec<CellCoord>,
    ) -> Result<Self, LayoutError> {
        if columns == 0 || rows == 0 {
            return Err(LayoutError::Empty);
        }

        let expected = usize::try_from(u64::from(columns) * u64::from(rows))
            .map_err(|_| LayoutError::Empty)?;
        if cells.len() != expected {
            return Err(LayoutError::CellCountMismatch {
                expected,
                found: cells.len(),
            });
        }

        for (index, room) in rooms.iter().enumerate() {
            let size = room.size();
            let right = u64::from(room.origin().column()) + u64::from(size.width());
            let top = u64::from(room.origin().row()) + u64::from(size.height());
            if size.width() == 0
                || size.height() == 0
                || right > u64::from(columns)
                || top > u64::from(rows)
            {
                return Err(LayoutError::RoomOutOfBounds { index });
            }
        }

        if let Some(cell) = deadends
            .iter()
            .find(|cell| cell.column() >= columns || cell.row() >= rows)
        {
            return Err(LayoutError::DeadendOutOfBounds { cell: *cell });
        }

        Ok(Self {
            columns,
            rows,
            cells,
            rooms,
            deadends,
        })
    }

    /// Parses a text grid using [`CellKind::glyph`] characters.
    pub fn from_rows<S: AsRef<str>>(
        lines: &[S],
        rooms: Vec<CellRect>,
        deadends: Vec<CellCoord>,
    ) -> Result<Self, LayoutError> {
        let Some(first) = lines.first() else {
            return Err(LayoutError::Empty);
        };
        let width = first.as_ref().chars().count();

        let mut cells = Vec::with_capacity(width * lines.len());
        for (row, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(LayoutError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (column, glyph) in line.chars().enumerate() {
                let kind = CellKind::from_glyph(glyph).ok_or(LayoutError::UnknownGlyph {
                    glyph,
                    column,
                    row,
                })?;
                cells.push(kind);
            }
        }

        let columns = u32::try_from(width).map_err(|_| LayoutError::Empty)?;
        let rows = u32::try_from(lines.len()).map_err(|_| LayoutError::Empty)?;
        Self::new(columns, rows, cells, rooms, deadends)
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Room rectangles in generator order.
    #[must_use]
    pub fn rooms(&self) -> &[CellRect] {
        &self.rooms
    }

    /// Dead-end corridor cells.
    #[must_use]
    pub fn deadends(&self) -> &[CellCoord] {
        &self.deadends
    }

    pub(crate) fn into_parts(self) -> (u32, u32, Vec<CellKind>, Vec<CellRect>, Vec<CellCoord>) {
        (self.columns, self.rows, self.cells, self.rooms, self.deadends)
    }
}
