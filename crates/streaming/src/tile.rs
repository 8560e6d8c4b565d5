use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Tile coordinate in ZXY scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// A fixed rectangular block of tiles at one zoom level.
///
/// Enumeration is row-major (by `y`, then `x`) and never changes between
/// calls, so a mosaic built from it keeps the same tile identities across
/// renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    zoom: u8,
    xs: RangeInclusive<u32>,
    ys: RangeInclusive<u32>,
}

impl TileGrid {
    pub fn new(zoom: u8, xs: RangeInclusive<u32>, ys: RangeInclusive<u32>) -> Self {
        Self { zoom, xs, ys }
    }

    /// The 4×3 block at zoom 6 that covers Poland.
    pub fn poland() -> Self {
        Self::new(6, 69..=72, 12..=14)
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn columns(&self) -> usize {
        self.xs.clone().count()
    }

    pub fn rows(&self) -> usize {
        self.ys.clone().count()
    }

    pub fn len(&self) -> usize {
        self.columns() * self.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn coords(&self) -> Vec<TileCoord> {
        let mut out = Vec::with_capacity(self.len());
        for y in self.ys.clone() {
            for x in self.xs.clone() {
                out.push(TileCoord::new(self.zoom, x, y));
            }
        }
        out
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::poland()
    }
}

#[cfg(test)]
mod tests {
    use super::{TileCoord, TileGrid};

    #[test]
    fn poland_grid_has_twelve_tiles_row_major() {
        let grid = TileGrid::poland();
        let coords = grid.coords();
        assert_eq!(coords.len(), 12);
        assert_eq!(grid.columns(), 4);
        assert_eq!(grid.rows(), 3);
        assert_eq!(coords[0], TileCoord::new(6, 69, 12));
        assert_eq!(coords[3], TileCoord::new(6, 72, 12));
        assert_eq!(coords[4], TileCoord::new(6, 69, 13));
        assert_eq!(coords[11], TileCoord::new(6, 72, 14));
        for c in &coords {
            assert_eq!(c.z, 6);
            assert!((69..=72).contains(&c.x));
            assert!((12..=14).contains(&c.y));
        }
    }

    #[test]
    fn enumeration_is_stable() {
        let grid = TileGrid::poland();
        assert_eq!(grid.coords(), grid.coords());
    }

    #[test]
    fn displays_as_zxy() {
        assert_eq!(TileCoord::new(6, 70, 13).to_string(), "6/70/13");
    }
}
