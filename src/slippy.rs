use std::f64::consts::PI;

use geo_types::Coord;

/// Geographic rectangle in degrees: (west, south, east, north).
///
/// Ordering of the bounds (west < east, south < north) is the caller's
/// responsibility and is not checked here; an inverted box projects to an
/// empty tile range.
#[derive(Clone, Copy, Debug)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    pub fn north_west(&self) -> Coord {
        Coord {
            x: self.west,
            y: self.north,
        }
    }

    pub fn south_east(&self) -> Coord {
        Coord {
            x: self.east,
            y: self.south,
        }
    }
}

/// Integer tile address on the slippy-map grid, valid only relative to a
/// zoom level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

/// Projects a geographic point onto the slippy-map tile grid.
///
/// `point` carries x = longitude, y = latitude in degrees. The result is
/// not clamped to `[0, 2^zoom)`: out-of-range input yields out-of-range
/// indices, and latitudes at ±90° hit the tangent singularity and produce
/// nonsense. Callers supply in-range coordinates.
pub fn tile_for_coord(point: Coord, zoom: u8) -> TileCoord {
    let lat_rad = point.y.to_radians();
    let n = 2f64.powi(zoom as i32);
    let x = ((point.x + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();
    TileCoord {
        x: x as u32,
        y: y as u32,
    }
}

/// Inclusive tile-index rectangle at a fixed zoom level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub zoom: u8,
}

impl TileRect {
    /// Tile rectangle covering `bbox` at `zoom`.
    ///
    /// The north/west corner supplies the min pair and south/east the max
    /// pair; tile y grows southward, so this holds for north-up boxes
    /// only and is not generalized beyond them.
    pub fn covering(bbox: &BoundingBox, zoom: u8) -> Self {
        let min = tile_for_coord(bbox.north_west(), zoom);
        let max = tile_for_coord(bbox.south_east(), zoom);
        Self {
            min_x: min.x,
            min_y: min.y,
            max_x: max.x,
            max_y: max.y,
            zoom,
        }
    }

    /// Number of tiles in the rectangle; zero when the bounds are inverted.
    pub fn tile_count(&self) -> u64 {
        let width = i64::from(self.max_x) - i64::from(self.min_x) + 1;
        let height = i64::from(self.max_y) - i64::from(self.min_y) + 1;
        width.max(0) as u64 * height.max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lon: f64, lat: f64) -> Coord {
        Coord { x: lon, y: lat }
    }

    #[test]
    fn matches_reference_tiles() {
        // Values cross-checked against the standard slippy-map formula.
        assert_eq!(
            tile_for_coord(coord(23.0, 61.0), 13),
            TileCoord { x: 4619, y: 2332 }
        );
        // New York City at zoom 16
        assert_eq!(
            tile_for_coord(coord(-74.0060, 40.7128), 16),
            TileCoord { x: 19295, y: 24640 }
        );
        // London at zoom 10
        assert_eq!(
            tile_for_coord(coord(-0.1278, 51.5074), 10),
            TileCoord { x: 511, y: 340 }
        );
    }

    #[test]
    fn equator_prime_meridian_is_grid_center() {
        assert_eq!(tile_for_coord(coord(0.0, 0.0), 1), TileCoord { x: 1, y: 1 });
    }

    #[test]
    fn zoom_zero_is_always_the_single_tile() {
        for (lon, lat) in [(23.0, 61.0), (-179.0, -85.0), (179.0, 85.0), (0.0, 0.0)] {
            assert_eq!(
                tile_for_coord(coord(lon, lat), 0),
                TileCoord { x: 0, y: 0 },
                "({lon}, {lat}) at zoom 0"
            );
        }
    }

    #[test]
    fn x_is_monotonic_in_longitude() {
        let mut last = 0;
        for step in 0..=358 {
            let lon = -179.0 + step as f64;
            let tile = tile_for_coord(coord(lon, 61.0), 13);
            assert!(
                tile.x >= last,
                "x regressed at lon {lon}: {} < {last}",
                tile.x
            );
            last = tile.x;
        }
    }

    #[test]
    fn projection_is_pure() {
        let a = tile_for_coord(coord(24.44, 61.0), 16);
        let b = tile_for_coord(coord(24.44, 61.0), 16);
        assert_eq!(a, b);
    }

    #[test]
    fn covering_projects_opposite_corners() {
        // Tampere region box
        let bbox = BoundingBox::new(23.0, 61.0, 24.44, 61.59293);
        let rect = TileRect::covering(&bbox, 13);
        assert_eq!(
            rect,
            TileRect {
                min_x: 4619,
                min_y: 2304,
                max_x: 4652,
                max_y: 2332,
                zoom: 13,
            }
        );
        assert_eq!(rect.tile_count(), 986);
    }

    #[test]
    fn inverted_box_covers_nothing() {
        // east/west swapped
        let bbox = BoundingBox::new(24.44, 61.0, 23.0, 61.59293);
        assert_eq!(TileRect::covering(&bbox, 13).tile_count(), 0);
    }
}
