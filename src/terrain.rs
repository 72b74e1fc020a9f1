use serde::Serialize;

use crate::error::EngineError;
use crate::types::{MapInit, Vec2};

const DEFAULT_TOWN_LAYOUT: &str = "\
TT...=........=.......=....TTT
T....=.######.=.#####.=.....TT
.....=.#BBBB#.=.#BBB#.=.......
..T..=.#BBBB#.=.#BBB#.=..~~~..
.....=.###.##.=.##.##.=.~~~~~.
==============================
.....=........=.......=..~~~..
..TT.=..T.....=...T...=.......
.TTT.=........=.......=....T..
..T..=.#####..=..####.=.......
.....=.#BBB#..=..#BB#.=.......
==============================
......T.......=.......=.####..
..~~~.........=..TT...=.#BB#..
.~~~~~...T....=..TT...=.#BB...
..~~~.........=.......=.####..
==============================
T.....=....T....=.......T....T
TT....=.........=..........TTT
TTT...=...TT....=.........TTTT
";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Floor,
    Wall,
    Building,
    Road,
    Water,
    Tree,
}

impl TileKind {
    pub fn from_char(value: char) -> Option<Self> {
        match value {
            '.' => Some(Self::Floor),
            '#' => Some(Self::Wall),
            'B' => Some(Self::Building),
            '=' => Some(Self::Road),
            '~' => Some(Self::Water),
            'T' => Some(Self::Tree),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Floor => '.',
            Self::Wall => '#',
            Self::Building => 'B',
            Self::Road => '=',
            Self::Water => '~',
            Self::Tree => 'T',
        }
    }

    pub fn is_passable(self) -> bool {
        !matches!(self, Self::Wall | Self::Water)
    }

    pub fn provides_cover(self) -> bool {
        self == Self::Tree
    }
}

/// Fixed tile grid for one match. Row-major, `(0, 0)` is the top-left cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainMap {
    width: i32,
    height: i32,
    tiles: Vec<TileKind>,
}

impl TerrainMap {
    pub fn new(width: i32, height: i32, tiles: Vec<TileKind>) -> Result<Self, EngineError> {
        if width <= 0 || height <= 0 {
            return Err(EngineError::InvalidMap(format!(
                "map must be at least 1x1, got {width}x{height}"
            )));
        }
        let expected = (width as usize).checked_mul(height as usize).ok_or_else(|| {
            EngineError::InvalidMap(format!("a {width}x{height} map is too large"))
        })?;
        if tiles.len() != expected {
            return Err(EngineError::InvalidMap(format!(
                "expected {expected} tiles for a {width}x{height} map, got {}",
                tiles.len()
            )));
        }
        if !tiles.iter().any(|tile| tile.is_passable()) {
            return Err(EngineError::InvalidMap(
                "map has no passable tile".to_string(),
            ));
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn filled(width: i32, height: i32, kind: TileKind) -> Result<Self, EngineError> {
        let count = (width.max(0) as usize).saturating_mul(height.max(0) as usize);
        Self::new(width, height, vec![kind; count])
    }

    /// Parses an ASCII layout, one character per tile and one line per row.
    /// Blank lines are ignored.
    pub fn parse(layout: &str) -> Result<Self, EngineError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(EngineError::InvalidMap("layout has no rows".to_string()));
        };
        let width = first.chars().count();

        let mut tiles = Vec::with_capacity(layout.len());
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(EngineError::InvalidMap(format!(
                    "row {y} has {} tiles, expected {width}",
                    row.chars().count()
                )));
            }
            for (x, value) in row.chars().enumerate() {
                let tile = TileKind::from_char(value).ok_or_else(|| {
                    EngineError::InvalidMap(format!("unknown tile '{value}' at ({x}, {y})"))
                })?;
                tiles.push(tile);
            }
        }
        Self::new(
            map_dimension(width, "width")?,
            map_dimension(rows.len(), "height")?,
            tiles,
        )
    }

    pub fn default_town() -> Result<Self, EngineError> {
        Self::parse(DEFAULT_TOWN_LAYOUT)
    }

    /// Returns a copy with one tile replaced. Maps are assembled before a
    /// match starts and never change afterwards.
    pub fn with_tile(mut self, x: i32, y: i32, kind: TileKind) -> Result<Self, EngineError> {
        let index = self.index_of(x, y)?;
        self.tiles[index] = kind;
        if !self.tiles.iter().any(|tile| tile.is_passable()) {
            return Err(EngineError::InvalidMap(
                "map has no passable tile".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Result<TileKind, EngineError> {
        self.index_of(x, y).map(|index| self.tiles[index])
    }

    pub fn is_passable(&self, x: i32, y: i32) -> Result<bool, EngineError> {
        self.tile_at(x, y).map(TileKind::is_passable)
    }

    pub fn provides_cover(&self, x: i32, y: i32) -> Result<bool, EngineError> {
        self.tile_at(x, y).map(TileKind::provides_cover)
    }

    pub fn passable_cells(&self) -> Vec<Vec2> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.tiles[self.offset(x, y)].is_passable() {
                    out.push(Vec2::new(x, y));
                }
            }
        }
        out
    }

    pub fn rows(&self) -> Vec<String> {
        self.tiles
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|tile| tile.as_char()).collect())
            .collect()
    }

    pub fn to_map_init(&self) -> MapInit {
        MapInit {
            width: self.width,
            height: self.height,
            tiles: self.rows(),
        }
    }

    fn index_of(&self, x: i32, y: i32) -> Result<usize, EngineError> {
        if !self.in_bounds(x, y) {
            return Err(EngineError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.offset(x, y))
    }

    fn offset(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }
}

fn map_dimension(value: usize, axis: &str) -> Result<i32, EngineError> {
    i32::try_from(value)
        .map_err(|_| EngineError::InvalidMap(format!("map {axis} {value} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_and_water_block_everything_else_passes() {
        let map = TerrainMap::parse(".#B\n=~T\n").expect("layout should parse");
        let expected = [
            (0, 0, true),
            (1, 0, false),
            (2, 0, true),
            (0, 1, true),
            (1, 1, false),
            (2, 1, true),
        ];
        for (x, y, passable) in expected {
            assert_eq!(map.is_passable(x, y), Ok(passable), "at ({x}, {y})");
        }
        assert_eq!(map.provides_cover(2, 1), Ok(true));
        assert_eq!(map.provides_cover(0, 0), Ok(false));
    }

    #[test]
    fn queries_outside_the_grid_fail_with_out_of_bounds() {
        let map = TerrainMap::filled(4, 3, TileKind::Floor).expect("map");
        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 3)] {
            assert_eq!(
                map.tile_at(x, y),
                Err(EngineError::OutOfBounds {
                    x,
                    y,
                    width: 4,
                    height: 3
                })
            );
            assert!(map.is_passable(x, y).is_err());
            assert!(map.provides_cover(x, y).is_err());
        }
        assert_eq!(map.tile_at(3, 2), Ok(TileKind::Floor));
    }

    #[test]
    fn ragged_or_unknown_layouts_are_rejected() {
        assert!(matches!(
            TerrainMap::parse("...\n..\n"),
            Err(EngineError::InvalidMap(_))
        ));
        assert!(matches!(
            TerrainMap::parse("..x\n"),
            Err(EngineError::InvalidMap(_))
        ));
        assert!(matches!(
            TerrainMap::parse("\n\n"),
            Err(EngineError::InvalidMap(_))
        ));
        assert!(matches!(
            TerrainMap::parse("#~\n~#\n"),
            Err(EngineError::InvalidMap(_))
        ));
    }

    #[test]
    fn dimensions_beyond_i32_are_rejected() {
        assert_eq!(map_dimension(30, "width"), Ok(30));
        assert_eq!(map_dimension(i32::MAX as usize, "width"), Ok(i32::MAX));
        for value in [i32::MAX as usize + 1, usize::MAX] {
            assert!(matches!(
                map_dimension(value, "height"),
                Err(EngineError::InvalidMap(_))
            ));
        }
    }

    #[test]
    fn oversized_tile_counts_are_rejected() {
        assert!(matches!(
            TerrainMap::new(i32::MAX, i32::MAX, vec![TileKind::Floor]),
            Err(EngineError::InvalidMap(_))
        ));
    }

    #[test]
    fn rows_reproduce_the_layout() {
        let layout = "T.=\n#B~\n";
        let map = TerrainMap::parse(layout).expect("layout should parse");
        assert_eq!(map.rows(), vec!["T.=".to_string(), "#B~".to_string()]);
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 2);
    }

    #[test]
    fn default_town_is_well_formed() {
        let map = TerrainMap::default_town().expect("built-in layout should parse");
        assert_eq!(map.width(), 30);
        assert_eq!(map.height(), 20);
        let passable = map.passable_cells();
        assert!(!passable.is_empty());
        assert!(passable
            .iter()
            .all(|cell| map.is_passable(cell.x, cell.y) == Ok(true)));
        let trees = (0..map.height())
            .flat_map(|y| (0..map.width()).map(move |x| (x, y)))
            .filter(|(x, y)| map.provides_cover(*x, *y) == Ok(true))
            .count();
        assert!(trees > 0);
    }

    #[test]
    fn with_tile_replaces_a_single_cell() {
        let map = TerrainMap::filled(3, 3, TileKind::Floor)
            .and_then(|map| map.with_tile(1, 1, TileKind::Tree))
            .expect("map");
        assert_eq!(map.tile_at(1, 1), Ok(TileKind::Tree));
        assert_eq!(map.tile_at(0, 1), Ok(TileKind::Floor));
        assert!(TerrainMap::filled(3, 3, TileKind::Floor)
            .expect("map")
            .with_tile(3, 0, TileKind::Wall)
            .is_err());
    }
}
