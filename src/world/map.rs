//! 64×64 tile grids: walls, light, floor/ceiling textures, raised-floor
//! heights and the seen (fog-of-war) mask.
//!
//! Grids are indexed `[x][y]`. Map images are read transposed: image row
//! `x`, column `y` lands in cell `(x, y)`.

use crate::host::Bitmap;
use crate::world::ConfigError;

pub const MAP_WIDTH: usize = 64;
pub const MAP_HEIGHT: usize = 64;

type Grid<T> = [[T; MAP_HEIGHT]; MAP_WIDTH];

/// Fold a signed tile coordinate into `0..size` as `|x| mod size`.
///
/// Negative coordinates mirror instead of wrapping (`-1 → 1`, not
/// `size - 1`); map assets are authored against this behaviour.
#[inline(always)]
pub fn wrap_coord(x: i32, size: usize) -> usize {
    x.unsigned_abs() as usize % size
}

/// Floor/ceiling cell value → texture slot. `0` and `1` mean "none".
#[inline(always)]
pub fn plane_texture(value: i32) -> Option<usize> {
    (value > 1).then(|| (value - 1) as usize)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldMap {
    pub walls: Grid<u8>,
    pub light: Grid<u8>,
    pub ceiling: Grid<i32>,
    pub floor: Grid<i32>,
    pub height: Grid<i32>,
    pub seen: Grid<bool>,
    /// Set once a height map image was loaded; saved with the game.
    pub heightmap_on: bool,
}

impl Default for WorldMap {
    fn default() -> Self {
        Self {
            walls: [[0; MAP_HEIGHT]; MAP_WIDTH],
            light: [[0; MAP_HEIGHT]; MAP_WIDTH],
            ceiling: [[0; MAP_HEIGHT]; MAP_WIDTH],
            floor: [[0; MAP_HEIGHT]; MAP_WIDTH],
            height: [[0; MAP_HEIGHT]; MAP_WIDTH],
            seen: [[false; MAP_HEIGHT]; MAP_WIDTH],
            heightmap_on: false,
        }
    }
}

#[inline(always)]
fn in_bounds(x: i32, y: i32) -> bool {
    (0..MAP_WIDTH as i32).contains(&x) && (0..MAP_HEIGHT as i32).contains(&y)
}

fn check_dims(what: &'static str, img: &Bitmap, expected: (usize, usize)) -> Result<(), ConfigError> {
    if img.dimensions() != expected {
        return Err(ConfigError::DimensionMismatch {
            what,
            expected,
            found: img.dimensions(),
        });
    }
    Ok(())
}

impl WorldMap {
    /// Replace walls/light/ceiling/floor from four equally sized images and
    /// clear heights and the seen mask.
    ///
    /// Images may be smaller than the map; cells outside them keep their
    /// previous values.
    pub fn load(
        &mut self,
        world: &Bitmap,
        light: &Bitmap,
        ceiling: &Bitmap,
        floor: &Bitmap,
    ) -> Result<(), ConfigError> {
        let dims = world.dimensions();
        if dims.0 > MAP_WIDTH || dims.1 > MAP_HEIGHT {
            return Err(ConfigError::DimensionMismatch {
                what: "worldmap",
                expected: (MAP_WIDTH, MAP_HEIGHT),
                found: dims,
            });
        }
        check_dims("lightmap", light, dims)?;
        check_dims("ceilingmap", ceiling, dims)?;
        check_dims("floormap", floor, dims)?;

        let (w, h) = dims;
        // image row i → map x, column j → map y
        for i in 0..h {
            for j in 0..w {
                self.walls[i][j] = world.get(j, i);
                self.light[i][j] = light.get(j, i);
                self.ceiling[i][j] = ceiling.get(j, i) as i32;
                self.floor[i][j] = floor.get(j, i) as i32;
                self.height[i][j] = 0;
                self.seen[i][j] = false;
            }
        }
        Ok(())
    }

    /// Load raised-floor height textures from a 64×64 image.
    pub fn load_height_map(&mut self, img: &Bitmap) -> Result<(), ConfigError> {
        check_dims("heightmap", img, (MAP_WIDTH, MAP_HEIGHT))?;
        for i in 0..MAP_WIDTH {
            for j in 0..MAP_HEIGHT {
                self.height[i][j] = img.get(j, i) as i32;
            }
        }
        self.heightmap_on = true;
        Ok(())
    }

    /*──────────────────────── per-cell accessors ──────────────────────*/

    pub fn wall_at(&self, x: i32, y: i32) -> i32 {
        if !in_bounds(x, y) {
            return -1;
        }
        self.walls[x as usize][y as usize] as i32
    }

    pub fn set_wall_at(&mut self, x: i32, y: i32, id: i32) {
        if in_bounds(x, y) {
            self.walls[x as usize][y as usize] = id.clamp(0, 255) as u8;
        }
    }

    pub fn light_at(&self, x: i32, y: i32) -> i32 {
        if !in_bounds(x, y) {
            return -1;
        }
        self.light[x as usize][y as usize] as i32
    }

    pub fn set_light_at(&mut self, x: i32, y: i32, light: i32) {
        if in_bounds(x, y) {
            self.light[x as usize][y as usize] = light.clamp(0, 255) as u8;
        }
    }

    pub fn floor_at(&self, x: i32, y: i32) -> i32 {
        if !in_bounds(x, y) {
            return -1;
        }
        self.floor[x as usize][y as usize]
    }

    /// Texture values above 511 are ignored, like out-of-range cells.
    pub fn set_floor_at(&mut self, x: i32, y: i32, tex: i32) {
        if in_bounds(x, y) && tex <= 511 {
            self.floor[x as usize][y as usize] = tex;
        }
    }

    pub fn ceiling_at(&self, x: i32, y: i32) -> i32 {
        if !in_bounds(x, y) {
            return -1;
        }
        self.ceiling[x as usize][y as usize]
    }

    pub fn set_ceiling_at(&mut self, x: i32, y: i32, tex: i32) {
        if in_bounds(x, y) && tex <= 511 {
            self.ceiling[x as usize][y as usize] = tex;
        }
    }

    pub fn height_at(&self, x: i32, y: i32) -> i32 {
        if !in_bounds(x, y) {
            return -1;
        }
        self.height[x as usize][y as usize]
    }

    pub fn set_height_at(&mut self, x: i32, y: i32, tex: i32) {
        if in_bounds(x, y) && tex <= 511 {
            self.height[x as usize][y as usize] = tex;
        }
    }

    /// `1` once any ray visited the tile, `0` otherwise, `-1` off-map.
    pub fn has_seen_tile(&self, x: i32, y: i32) -> i32 {
        if !in_bounds(x, y) {
            return -1;
        }
        self.seen[x as usize][y as usize] as i32
    }

    /// Wall id at a wrapped coordinate; what the DDA reads.
    #[inline(always)]
    pub fn wall_wrapped(&self, x: i32, y: i32) -> u8 {
        self.walls[wrap_coord(x, MAP_WIDTH)][wrap_coord(y, MAP_HEIGHT)]
    }

    /// `(light, ceiling)` at a wrapped coordinate.
    #[inline(always)]
    pub fn light_ceiling_wrapped(&self, x: i32, y: i32) -> (u8, i32) {
        let (x, y) = (wrap_coord(x, MAP_WIDTH), wrap_coord(y, MAP_HEIGHT));
        (self.light[x][y], self.ceiling[x][y])
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    fn img(w: usize, h: usize, f: impl Fn(usize, usize) -> u8) -> Bitmap {
        let mut bmp = Bitmap::new(w, h);
        for y in 0..h {
            for x in 0..w {
                bmp.set(x, y, f(x, y));
            }
        }
        bmp
    }

    #[test]
    fn wrap_mirrors_negatives() {
        assert_eq!(wrap_coord(0, 64), 0);
        assert_eq!(wrap_coord(63, 64), 63);
        assert_eq!(wrap_coord(64, 64), 0);
        assert_eq!(wrap_coord(65, 64), 1);
        // |x| mod n, not floored modulo
        assert_eq!(wrap_coord(-1, 64), 1);
        assert_eq!(wrap_coord(-64, 64), 0);
        assert_eq!(wrap_coord(-65, 64), 1);
        assert_ne!(wrap_coord(-1, 64), (-1i32).rem_euclid(64) as usize);
    }

    #[test]
    fn plane_texture_skips_zero_and_one() {
        assert_eq!(plane_texture(0), None);
        assert_eq!(plane_texture(1), None);
        assert_eq!(plane_texture(2), Some(1));
        assert_eq!(plane_texture(-4), None);
    }

    #[test]
    fn load_transposes_rows_into_x() {
        let mut map = WorldMap::default();
        let world = img(4, 3, |x, y| (y * 10 + x) as u8);
        let flat = img(4, 3, |_, _| 2);
        map.seen[1][2] = true;
        map.load(&world, &flat, &flat, &flat).unwrap();
        // row 1, column 2 → cell (1, 2)
        assert_eq!(map.wall_at(1, 2), 12);
        assert_eq!(map.wall_at(2, 3), 23);
        assert_eq!(map.has_seen_tile(1, 2), 0);
        assert_eq!(map.floor_at(0, 0), 2);
    }

    #[test]
    fn load_rejects_mismatched_layers() {
        let mut map = WorldMap::default();
        let a = Bitmap::new(8, 8);
        let b = Bitmap::new(8, 7);
        let err = map.load(&a, &a, &b, &a).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DimensionMismatch {
                what: "ceilingmap",
                expected: (8, 8),
                found: (8, 7)
            }
        );
        let big = Bitmap::new(65, 64);
        assert!(map.load(&big, &big, &big, &big).is_err());
    }

    #[test]
    fn height_map_requires_full_size() {
        let mut map = WorldMap::default();
        assert!(map.load_height_map(&Bitmap::new(32, 32)).is_err());
        assert!(!map.heightmap_on);
        map.load_height_map(&img(64, 64, |x, _| x as u8)).unwrap();
        assert!(map.heightmap_on);
        assert_eq!(map.height_at(0, 5), 5);
    }

    #[test]
    fn out_of_range_queries_return_sentinel() {
        let mut map = WorldMap::default();
        for (x, y) in [(-1, 0), (0, -1), (64, 0), (0, 64)] {
            assert_eq!(map.wall_at(x, y), -1);
            assert_eq!(map.light_at(x, y), -1);
            assert_eq!(map.floor_at(x, y), -1);
            assert_eq!(map.ceiling_at(x, y), -1);
            assert_eq!(map.has_seen_tile(x, y), -1);
            map.set_wall_at(x, y, 3); // ignored
        }
        map.set_floor_at(3, 3, 512);
        assert_eq!(map.floor_at(3, 3), 0);
        map.set_floor_at(3, 3, 511);
        assert_eq!(map.floor_at(3, 3), 511);
        map.set_wall_at(2, 2, 300);
        assert_eq!(map.wall_at(2, 2), 255);
    }
}
