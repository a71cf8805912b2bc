use dungeon_core::{CellCoord, CellRect};
use dungeon_world::{Layout, LayoutError};
use serde::{Deserialize, Serialize};

/// Layout bundled with the binary, used when no layout file is supplied.
pub(crate) const DEMO_LAYOUT: &str = include_str!("demo_layout.json");

/// Generator output as stored on disk.
///
/// Rows use the same glyphs as [`dungeon_core::CellKind::glyph`]; the first
/// row is row zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutFile {
    /// Text rows of the grid.
    pub(crate) rows: Vec<String>,
    /// Floor rectangles of the rooms.
    pub(crate) rooms: Vec<CellRect>,
    /// Corridor cells that end without reaching a room.
    #[serde(default)]
    pub(crate) deadends: Vec<CellCoord>,
}

impl LayoutFile {
    /// Parses a JSON layout document.
    pub(crate) fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validates the stored rows and rectangles.
    pub(crate) fn into_layout(self) -> Result<Layout, LayoutError> {
        Layout::from_rows(&self.rows, self.rooms, self.deadends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_core::CellRectSize;

    #[test]
    fn demo_layout_is_valid() {
        let file = LayoutFile::parse(DEMO_LAYOUT).expect("demo layout parses");
        assert_eq!(file.rooms.len(), 3);
        assert_eq!(file.deadends, vec![CellCoord::new(4, 6)]);

        let layout = file.into_layout().expect("demo layout validates");
        assert_eq!(layout.rooms().len(), 3);
        assert_eq!(layout.deadends(), &[CellCoord::new(4, 6)]);
    }

    #[test]
    fn deadends_are_optional() {
        let json = r######"{
            "rows": ["#####", "#...#", "#####"],
            "rooms": [{ "origin": { "column": 1, "row": 1 }, "size": { "width": 3, "height": 1 } }]
        }"######;

        let file = LayoutFile::parse(json).expect("layout parses");
        assert!(file.deadends.is_empty());
        assert_eq!(
            file.rooms,
            vec![CellRect::from_origin_and_size(
                CellCoord::new(1, 1),
                CellRectSize::new(3, 1)
            )]
        );
    }

    #[test]
    fn rooms_outside_the_grid_are_rejected() {
        let file = LayoutFile {
            rows: vec!["###".to_owned(), "#.#".to_owned(), "###".to_owned()],
            rooms: vec![CellRect::from_origin_and_size(
                CellCoord::new(2, 2),
                CellRectSize::new(4, 4),
            )],
            deadends: Vec::new(),
        };

        assert_eq!(
            file.into_layout(),
            Err(LayoutError::RoomOutOfBounds { index: 0 })
        );
    }
}
