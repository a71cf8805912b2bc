//! Region labelling: partitions the grid into rooms and corridor components.

use std::collections::BTreeSet;

use dungeon_core::{CellCoord, CellKind, CellRect, RegionId, RoomId};

use crate::grid::Grid;

static UNCLAIMED: BTreeSet<RegionId> = BTreeSet::new();

/// Per-cell sets of the regions claiming each cell.
///
/// Room regions use the room ids `0..R`; corridor components are numbered
/// from `R` upward in discovery order. Door cells are never claimed so that
/// standing in a doorway belongs to neither side.
#[derive(Clone, Debug)]
pub(crate) struct RegionMap {
    columns: u32,
    cells: Vec<BTreeSet<RegionId>>,
    region_count: u32,
}

impl RegionMap {
    /// Labels `grid` in place and returns the resulting region map.
    ///
    /// Corridor cells touching a floor cell directly are first reclassified
    /// as doors. Every room then claims its rectangle padded by one cell,
    /// skipping doors. Finally each 8-connected corridor component receives a
    /// fresh region that also claims the non-door cells around it.
    pub(crate) fn label(grid: &mut Grid, rooms: &[CellRect]) -> Self {
        let (columns, rows) = grid.dimensions();
        let cell_count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        let mut map = Self {
            columns,
            cells: vec![BTreeSet::new(); cell_count],
            region_count: 0,
        };

        let thresholds: Vec<CellCoord> = grid
            .iter()
            .filter(|(cell, kind)| {
                *kind == CellKind::Corridor
                    && grid
                        .neighbours4(*cell)
                        .any(|neighbour| grid.get(neighbour) == CellKind::Floor)
            })
            .map(|(cell, _)| cell)
            .collect();
        for cell in &thresholds {
            let _ = grid.set(*cell, CellKind::Door);
        }

        for (index, rect) in rooms.iter().enumerate() {
            let region = RoomId::new(index as u32).region();
            for cell in grid.padded(rect) {
                if grid.get(cell) != CellKind::Door {
                    map.claim(grid, cell, region);
                }
            }
        }
        map.region_count = rooms.len() as u32;

        let mut visited = vec![false; cell_count];
        let mut worklist = Vec::new();
        let corridors: Vec<CellCoord> = grid
            .iter()
            .filter(|(_, kind)| *kind == CellKind::Corridor)
            .map(|(cell, _)| cell)
            .collect();

        for start in corridors {
            let Some(start_index) = grid.index(start) else {
                continue;
            };
            if visited[start_index] {
                continue;
            }

            let region = RegionId::new(map.region_count);
            map.region_count += 1;
            visited[start_index] = true;
            worklist.push(start);

            while let Some(cell) = worklist.pop() {
                map.claim(grid, cell, region);
                for neighbour in grid.neighbours8(cell) {
                    match grid.get(neighbour) {
                        CellKind::Door => {}
                        CellKind::Corridor => {
                            let Some(index) = grid.index(neighbour) else {
                                continue;
                            };
                            if !visited[index] {
                                visited[index] = true;
                                worklist.push(neighbour);
                            }
                        }
                        _ => map.claim(grid, neighbour, region),
                    }
                }
            }
        }

        tracing::debug!(
            rooms = rooms.len(),
            corridor_components = map.region_count as usize - rooms.len(),
            doors = thresholds.len(),
            "labelled dungeon regions"
        );

        map
    }

    fn claim(&mut self, grid: &Grid, cell: CellCoord, region: RegionId) {
        if let Some(set) = grid.index(cell).and_then(|index| self.cells.get_mut(index)) {
            let _ = set.insert(region);
        }
    }

    /// Regions claiming `cell`; the empty set outside the grid.
    pub(crate) fn regions_at(&self, cell: CellCoord) -> &BTreeSet<RegionId> {
        let columns = u64::from(self.columns);
        if u64::from(cell.column()) >= columns {
            return &UNCLAIMED;
        }
        let index = u64::from(cell.row()) * columns + u64::from(cell.column());
        usize::try_from(index)
            .ok()
            .and_then(|index| self.cells.get(index))
            .unwrap_or(&UNCLAIMED)
    }

    /// Shared empty set returned for positions outside the grid.
    pub(crate) fn unclaimed() -> &'static BTreeSet<RegionId> {
        &UNCLAIMED
    }

    /// Total number of regions: rooms plus corridor components.
    pub(crate) fn region_count(&self) -> u32 {
        self.region_count
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use dungeon_core::CellRectSize;

    use crate::layout::Layout;

    fn labelled(rows: &[&str], rooms: Vec<CellRect>) -> (Grid, RegionMap) {
        let layout = Layout::from_rows(rows, rooms.clone(), Vec::new()).expect("layout");
        let (columns, rows, cells, _, _) = layout.into_parts();
        let mut grid = Grid::new(columns, rows, cells);
        let map = RegionMap::label(&mut grid, &rooms);
        (grid, map)
    }

    fn rect(column: u32, row: u32, width: u32, height: u32) -> CellRect {
        CellRect::from_origin_and_size(
            CellCoord::new(column, row),
            CellRectSize::new(width, height),
        )
    }

    fn corridor_partition(
        grid: &Grid,
        map: &RegionMap,
        room_count: u32,
    ) -> Vec<BTreeSet<CellCoord>> {
        let mut components: BTreeMap<RegionId, BTreeSet<CellCoord>> = BTreeMap::new();
        for (cell, kind) in grid.iter() {
            if kind != CellKind::Corridor {
                continue;
            }
            let corridor_regions: Vec<RegionId> = map
                .regions_at(cell)
                .iter()
                .copied()
                .filter(|region| region.get() >= room_count)
                .collect();
            assert_eq!(corridor_regions.len(), 1, "corridor {cell:?} in one component");
            let _ = components.entry(corridor_regions[0]).or_default().insert(cell);
        }
        let mut partition: Vec<BTreeSet<CellCoord>> = components.into_values().collect();
        partition.sort();
        partition
    }

    const TWO_ROOMS: [&str; 7] = [
        "#####   #####",
        "#...#   #...#",
        "#...,,,,,...#",
        "#...#   #...#",
        "#####   #####",
        "             ",
        "             ",
    ];

    #[test]
    fn rooms_claim_their_padded_rectangle_except_doors() {
        let rooms = vec![rect(1, 1, 3, 3), rect(9, 1, 3, 3)];
        let (grid, map) = labelled(&TWO_ROOMS, rooms.clone());

        for (index, room) in rooms.iter().enumerate() {
            let region = RoomId::new(index as u32).region();
            for cell in grid.padded(room) {
                if grid.get(cell) == CellKind::Door {
                    assert!(map.regions_at(cell).is_empty(), "door {cell:?} is unclaimed");
                } else {
                    assert!(map.regions_at(cell).contains(&region), "{cell:?} claimed");
                }
            }
        }
    }

    #[test]
    fn corridors_touching_floor_become_doors() {
        let rooms = vec![rect(1, 1, 3, 3), rect(9, 1, 3, 3)];
        let (grid, map) = labelled(&TWO_ROOMS, rooms);

        assert_eq!(grid.get(CellCoord::new(4, 2)), CellKind::Door);
        assert_eq!(grid.get(CellCoord::new(8, 2)), CellKind::Door);
        assert_eq!(grid.get(CellCoord::new(6, 2)), CellKind::Corridor);
        assert_eq!(map.region_count(), 3);
        assert!(map.regions_at(CellCoord::new(6, 2)).contains(&RegionId::new(2)));
    }

    #[test]
    fn walls_between_regions_belong_to_both() {
        let rooms = vec![rect(1, 1, 3, 3), rect(9, 1, 3, 3)];
        let (_, map) = labelled(&TWO_ROOMS, rooms);

        let wall = map.regions_at(CellCoord::new(4, 1));
        assert!(wall.contains(&RegionId::new(0)));
        assert!(wall.contains(&RegionId::new(2)));
    }

    #[test]
    fn corridor_components_follow_connectivity() {
        let rows = [
            ",,  ,",
            " ,  ,",
            "  , ,",
            "     ",
            ",,,,,",
        ];
        let (grid, map) = labelled(&rows, Vec::new());

        let partition = corridor_partition(&grid, &map, 0);
        let expected: Vec<BTreeSet<CellCoord>> = {
            let mut expected = vec![
                [(0, 0), (1, 0), (1, 1), (2, 2)]
                    .into_iter()
                    .map(|(c, r)| CellCoord::new(c, r))
                    .collect::<BTreeSet<_>>(),
                [(4, 0), (4, 1), (4, 2)]
                    .into_iter()
                    .map(|(c, r)| CellCoord::new(c, r))
                    .collect(),
                (0..5).map(|c| CellCoord::new(c, 4)).collect(),
            ];
            expected.sort();
            expected
        };
        assert_eq!(partition, expected);
        assert_eq!(map.region_count(), 3);
    }

    #[test]
    fn partition_does_not_depend_on_grid_orientation() {
        let rows = [
            ",,  ,",
            " ,  ,",
            "  , ,",
            "     ",
            ",,,,,",
        ];
        let flipped: Vec<String> = rows.iter().rev().map(|row| row.to_string()).collect();
        let (grid, map) = labelled(&rows, Vec::new());
        let (flipped_grid, flipped_map) = labelled(
            &flipped.iter().map(String::as_str).collect::<Vec<_>>(),
            Vec::new(),
        );

        let unflip = |cells: BTreeSet<CellCoord>| -> BTreeSet<CellCoord> {
            cells
                .into_iter()
                .map(|cell| CellCoord::new(cell.column(), 4 - cell.row()))
                .collect()
        };
        let mut restored: Vec<BTreeSet<CellCoord>> =
            corridor_partition(&flipped_grid, &flipped_map, 0)
                .into_iter()
                .map(unflip)
                .collect();
        restored.sort();

        assert_eq!(corridor_partition(&grid, &map, 0), restored);
    }

    #[test]
    fn isolated_cells_have_no_region() {
        let (_, map) = labelled(&["#  ", "   "], Vec::new());
        assert!(map.regions_at(CellCoord::new(0, 0)).is_empty());
        assert!(map.regions_at(CellCoord::new(10, 0)).is_empty());
        assert!(map.regions_at(CellCoord::new(0, 10)).is_empty());
    }
}
