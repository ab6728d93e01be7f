//! Everything a frame is rendered from: tile grids, wall types, textures,
//! sprites, camera, lighting and the editor selection.
//!
//! One [`RaycastWorld`] is owned by the [`crate::raycaster::Raycaster`]
//! façade; scripts mutate it between frames and the renderer only reads it.

pub mod camera;
pub mod lighting;
pub mod map;
pub mod sprites;
pub mod texture;
pub mod walls;

pub use camera::Camera;
pub use lighting::{Ambient, TileSelection, lighting_at};
pub use map::{MAP_HEIGHT, MAP_WIDTH, WorldMap, plane_texture, wrap_coord};
pub use sprites::{NUM_SPRITES, Sprite, SpriteTable};
pub use texture::{MAX_TEXTURES, TEX_HEIGHT, TEX_WIDTH, TextureAtlas, TextureId};
pub use walls::{BlendMode, FaceFlags, NUM_WALL_TYPES, Side, WallFace, WallTable, WallType};

use crate::host::Bitmap;
use crate::sim::MoveSettings;

/// Bad input to a load or setter call. The world is left unchanged.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The host has no graphic in this sprite slot.
    #[error("no sprite in slot {0}")]
    MissingSprite(i32),

    #[error("{what} is {found:?}, expected {expected:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("texture sheet holds {0} tiles, at most 512 fit")]
    TooManyTiles(usize),

    #[error("wall type {0} out of range")]
    WallTypeOutOfRange(i32),

    #[error("sprite {0} out of range")]
    SpriteOutOfRange(i32),

    /// Wall directions are 0 (north) to 3 (east).
    #[error("direction {0} is not 0..=3")]
    BadDirection(i32),
}

#[derive(Clone, Debug, Default)]
pub struct RaycastWorld {
    pub map: WorldMap,
    pub walls: WallTable,
    pub textures: TextureAtlas,
    pub sprites: SpriteTable,
    pub camera: Camera,
    pub movement: MoveSettings,
    pub ambient: Ambient,
    pub selection: Option<TileSelection>,
    /// Host slot of the sky panorama, 0 = none.
    pub skybox: i32,
    /// Set by the first render; gates whether a save carries the map.
    pub raycast_on: bool,
}

impl RaycastWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slice `sheet` into the atlas and restore the stock wall types.
    pub fn make_textures(&mut self, sheet: &Bitmap, slot: i32) -> Result<usize, ConfigError> {
        let n = self.textures.slice_from(sheet)?;
        self.textures.source_slot = slot;
        self.walls.reset_defaults();
        log::info!("sliced {n} textures from slot {slot}");
        Ok(n)
    }

    pub fn load_map(
        &mut self,
        world: &Bitmap,
        light: &Bitmap,
        ceiling: &Bitmap,
        floor: &Bitmap,
    ) -> Result<(), ConfigError> {
        self.map.load(world, light, ceiling, floor)?;
        let (w, h) = world.dimensions();
        log::info!("loaded {w}x{h} map");
        Ok(())
    }

    pub fn load_height_map(&mut self, img: &Bitmap) -> Result<(), ConfigError> {
        self.map.load_height_map(img)?;
        log::info!("height map enabled");
        Ok(())
    }

    pub fn select_tile(&mut self, x: i32, y: i32, color: u8) {
        self.selection = TileSelection::new(x, y, color);
    }

    pub fn lighting_at(&self, x: i32, y: i32) -> i32 {
        lighting_at(&self.map, &self.ambient, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_textures_resets_wall_defaults() {
        let mut world = RaycastWorld::new();
        world.walls.set_textures(1, 9, 9, 9, 9).unwrap();
        let n = world.make_textures(&Bitmap::filled(128, 64, 3), 42).unwrap();
        assert_eq!(n, 2);
        assert_eq!(world.textures.source_slot, 42);
        assert_eq!(world.walls.texture(1, 0).unwrap(), 1);
        assert_eq!(world.textures.texel(1, 10, 10), 3);
    }

    #[test]
    fn failed_make_textures_keeps_state() {
        let mut world = RaycastWorld::new();
        world.walls.set_textures(1, 9, 9, 9, 9).unwrap();
        let huge = Bitmap::new(64 * 32, 64 * 17);
        assert!(world.make_textures(&huge, 7).is_err());
        assert_eq!(world.walls.texture(1, 0).unwrap(), 9);
        assert_eq!(world.textures.source_slot, 0);
    }

    #[test]
    fn error_messages_are_readable() {
        let e = ConfigError::DimensionMismatch {
            what: "lightmap",
            expected: (8, 8),
            found: (8, 7),
        };
        assert_eq!(e.to_string(), "lightmap is (8, 7), expected (8, 8)");
    }
}
