//! Dense cell storage owned by the dungeon.

use dungeon_core::{CellCoord, CellKind, CellRect};

/// Row-major grid of cell kinds.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Wraps pre-validated cells. `cells.len()` must equal `columns * rows`.
    pub(crate) fn new(columns: u32, rows: u32, cells: Vec<CellKind>) -> Self {
        debug_assert_eq!(
            cells.len(),
            usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(usize::MAX)
        );
        Self {
            columns,
            rows,
            cells,
        }
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Kind stored at `cell`, or `Empty` outside the grid.
    pub(crate) fn get(&self, cell: CellCoord) -> CellKind {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(CellKind::Empty)
    }

    /// Writes `kind` at `cell`. Returns whether the cell was inside the grid.
    pub(crate) fn set(&mut self, cell: CellCoord, kind: CellKind) -> bool {
        match self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            Some(slot) => {
                *slot = kind;
                true
            }
            None => false,
        }
    }

    /// Every cell with its kind, row by row.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (CellCoord, CellKind)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, kind)| {
            let index = index as u64;
            let cell = CellCoord::new(
                (index % u64::from(columns)) as u32,
                (index / u64::from(columns)) as u32,
            );
            (cell, *kind)
        })
    }

    /// Direct neighbours of `cell` that lie inside the grid.
    pub(crate) fn neighbours4(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        neighbours(cell, self.columns, self.rows, &DIRECT_OFFSETS)
    }

    /// Direct and diagonal neighbours of `cell` that lie inside the grid.
    pub(crate) fn neighbours8(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        neighbours(cell, self.columns, self.rows, &SURROUNDING_OFFSETS)
    }

    /// Cells of `rect` grown by one cell on every side, clipped to the grid.
    pub(crate) fn padded(&self, rect: &CellRect) -> impl Iterator<Item = CellCoord> {
        let origin = rect.origin();
        let size = rect.size();
        let left = i64::from(origin.column()) - 1;
        let bottom = i64::from(origin.row()) - 1;
        let right = i64::from(origin.column()) + i64::from(size.width());
        let top = i64::from(origin.row()) + i64::from(size.height());

        let left = left.max(0);
        let bottom = bottom.max(0);
        let right = right.min(i64::from(self.columns) - 1);
        let top = top.min(i64::from(self.rows) - 1);

        (bottom..=top).flat_map(move |row| {
            (left..=right).map(move |column| CellCoord::new(column as u32, row as u32))
        })
    }
}

const DIRECT_OFFSETS: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const SURROUNDING_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

fn neighbours(
    cell: CellCoord,
    columns: u32,
    rows: u32,
    offsets: &'static [(i64, i64)],
) -> impl Iterator<Item = CellCoord> {
    offsets.iter().filter_map(move |(dx, dy)| {
        let column = i64::from(cell.column()) + dx;
        let row = i64::from(cell.row()) + dy;
        if column < 0 || row < 0 || column >= i64::from(columns) || row >= i64::from(rows) {
            return None;
        }
        Some(CellCoord::new(column as u32, row as u32))
    })
}
