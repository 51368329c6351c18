//! Terrain grid and coordinate types.

use serde::Serialize;
use std::fmt;

/// A tile coordinate on a level map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Classification of one grid tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Terrain {
    /// `0` - open air.
    Empty = b'0',
    /// `1` - indestructible ground.
    Solid = b'1',
    /// `2` - ground that can be dug, bashed or mined away.
    Diggable = b'2',
    /// `E` - entry marker. Annotation only, the spawn is `entryPoint`.
    Entry = b'E',
    /// `X` - exit marker. Annotation only, the exit is `exitPoint`.
    Exit = b'X',
}

impl Terrain {
    /// Every terrain code, in legend order.
    pub const ALL: [Terrain; 5] = [
        Terrain::Empty,
        Terrain::Solid,
        Terrain::Diggable,
        Terrain::Entry,
        Terrain::Exit,
    ];

    /// Decode a terrain cell code.
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            '0' => Some(Terrain::Empty),
            '1' => Some(Terrain::Solid),
            '2' => Some(Terrain::Diggable),
            'E' => Some(Terrain::Entry),
            'X' => Some(Terrain::Exit),
            _ => None,
        }
    }

    /// The character this terrain is written as.
    #[must_use]
    pub const fn code(self) -> char {
        self as u8 as char
    }

    /// Indestructible ground.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Terrain::Solid)
    }

    /// Ground that skills can remove.
    #[must_use]
    pub const fn is_diggable(self) -> bool {
        matches!(self, Terrain::Diggable)
    }

    /// A lemming can occupy this tile without removing anything.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        matches!(self, Terrain::Empty | Terrain::Entry | Terrain::Exit)
    }

    /// Entry or exit annotation.
    #[must_use]
    pub const fn is_marker(self) -> bool {
        matches!(self, Terrain::Entry | Terrain::Exit)
    }

    /// Human-readable legend entry.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Terrain::Empty => "empty space",
            Terrain::Solid => "solid, indestructible ground",
            Terrain::Diggable => "diggable ground",
            Terrain::Entry => "entry marker",
            Terrain::Exit => "exit marker",
        }
    }
}

/// Why a list of map rows does not form a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// No rows at all.
    Empty,
    /// A row with no cells.
    EmptyRow {
        /// Row index.
        row: usize,
    },
    /// A row whose length differs from the first row.
    RaggedRow {
        /// Row index.
        row: usize,
        /// Length of row 0.
        expected: usize,
        /// Length of this row.
        found: usize,
    },
    /// A character outside the terrain legend.
    UnknownCode {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// The offending character.
        code: char,
    },
    /// More rows or columns than a coordinate can address.
    TooLarge {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Empty => write!(f, "map has no rows"),
            MapError::EmptyRow { row } => write!(f, "row {row} is empty"),
            MapError::RaggedRow {
                row,
                expected,
                found,
            } => write!(f, "row {row} has {found} cells, expected {expected}"),
            MapError::UnknownCode { row, col, code } => {
                write!(f, "unknown terrain code {code:?} at row {row}, column {col}")
            }
            MapError::TooLarge { rows, cols } => {
                write!(f, "map of {rows}x{cols} exceeds {} tiles per side", u16::MAX)
            }
        }
    }
}

impl std::error::Error for MapError {}

/// A level's terrain grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainMap {
    /// Width of the map in tiles.
    width: u16,
    /// Height of the map in tiles.
    height: u16,
    /// Cells stored in row-major order.
    cells: Vec<Terrain>,
}

impl TerrainMap {
    /// Build a grid from its textual rows.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no rows, a row is empty or of a
    /// different length than row 0, or a cell uses an unknown code.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapError> {
        let first = rows.first().ok_or(MapError::Empty)?;
        let width = first.as_ref().chars().count();

        let too_large = MapError::TooLarge {
            rows: rows.len(),
            cols: width,
        };
        let height16 = u16::try_from(rows.len()).map_err(|_| too_large.clone())?;
        let width16 = u16::try_from(width).map_err(|_| too_large)?;

        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, text) in rows.iter().enumerate() {
            let text = text.as_ref();
            let found = text.chars().count();
            if found == 0 {
                return Err(MapError::EmptyRow { row });
            }
            if found != width {
                return Err(MapError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, code) in text.chars().enumerate() {
                let terrain =
                    Terrain::from_code(code).ok_or(MapError::UnknownCode { row, col, code })?;
                cells.push(terrain);
            }
        }

        Ok(Self {
            width: width16,
            height: height16,
            cells,
        })
    }

    /// Width of the map (columns).
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height of the map (rows).
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Raw cells in row-major order.
    #[must_use]
    #[inline]
    pub fn cells(&self) -> &[Terrain] {
        &self.cells
    }

    /// Check if a coordinate is within the map bounds.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    fn coord_to_index(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
        } else {
            None
        }
    }

    /// Terrain at the given coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<Terrain> {
        self.coord_to_index(coord).map(|idx| self.cells[idx])
    }

    /// One row of cells, left to right.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Terrain]> {
        if y >= self.height {
            return None;
        }
        let width = usize::from(self.width);
        let start = usize::from(y) * width;
        Some(&self.cells[start..start + width])
    }

    /// Iterate over all coordinates and cells, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Terrain)> + '_ {
        let width = usize::from(self.width);
        self.cells.iter().enumerate().map(move |(idx, &terrain)| {
            // Both quotients fit: width and height are u16.
            #[allow(clippy::cast_possible_truncation)]
            let coord = Coord::new((idx % width) as u16, (idx / width) as u16);
            (coord, terrain)
        })
    }

    /// Coordinates of every cell with the given terrain.
    pub fn positions_of(&self, terrain: Terrain) -> impl Iterator<Item = Coord> + '_ {
        self.iter()
            .filter(move |&(_, t)| t == terrain)
            .map(|(coord, _)| coord)
    }

    /// Count cells of the given terrain.
    #[must_use]
    pub fn count(&self, terrain: Terrain) -> usize {
        self.cells.iter().filter(|&&t| t == terrain).count()
    }

    /// The grid written back as its textual rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<String> {
        self.cells
            .chunks(usize::from(self.width))
            .map(|row| row.iter().map(|t| t.code()).collect())
            .collect()
    }
}
