// Fixed-size 64×64 texture slots sliced out of one host image.
// The renderer reads texels through `TextureAtlas::texel` only.

use crate::host::Bitmap;
use crate::world::ConfigError;

pub const TEX_WIDTH: usize = 64;
pub const TEX_HEIGHT: usize = 64;
pub const TEX_SIZE: usize = TEX_WIDTH * TEX_HEIGHT;

/// Slots available to walls, floors, ceilings, masks and height maps.
pub const MAX_TEXTURES: usize = 512;

/// Texture slot index.
pub type TextureId = usize;

/// Row-major 8-bit palette indices; index 0 is transparent.
#[derive(Clone)]
pub struct TextureAtlas {
    pixels: Vec<u8>,
    /// Slot of the sheet the atlas was last sliced from, 0 if never.
    pub source_slot: i32,
}

impl Default for TextureAtlas {
    fn default() -> Self {
        Self {
            pixels: vec![0; MAX_TEXTURES * TEX_SIZE],
            source_slot: 0,
        }
    }
}

impl std::fmt::Debug for TextureAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureAtlas")
            .field("source_slot", &self.source_slot)
            .finish_non_exhaustive()
    }
}

impl TextureAtlas {
    /// Slice `sheet` into 64×64 tiles in raster order: tile `(tx, ty)` goes
    /// to slot `ty * tiles_across + tx`. Returns the number of tiles.
    ///
    /// Partial tiles at the right/bottom edge are ignored. Slots past the
    /// last tile keep their previous contents.
    pub fn slice_from(&mut self, sheet: &Bitmap) -> Result<usize, ConfigError> {
        let across = sheet.width() / TEX_WIDTH;
        let down = sheet.height() / TEX_HEIGHT;
        let count = across * down;
        if count > MAX_TEXTURES {
            return Err(ConfigError::TooManyTiles(count));
        }
        for ty in 0..down {
            for tx in 0..across {
                let slot = ty * across + tx;
                for y in 0..TEX_HEIGHT {
                    let row = sheet.row(ty * TEX_HEIGHT + y);
                    let src = &row[tx * TEX_WIDTH..(tx + 1) * TEX_WIDTH];
                    let start = slot * TEX_SIZE + y * TEX_WIDTH;
                    self.pixels[start..start + TEX_WIDTH].copy_from_slice(src);
                }
            }
        }
        Ok(count)
    }

    /// Texel `(x, y)` of slot `tex`. Out-of-range slots wrap.
    #[inline(always)]
    pub fn texel(&self, tex: TextureId, x: usize, y: usize) -> u8 {
        self.pixels[(tex % MAX_TEXTURES) * TEX_SIZE + y * TEX_WIDTH + x]
    }

    /// Whole slot as a 4096-byte slice.
    pub fn tile(&self, tex: TextureId) -> &[u8] {
        let start = (tex % MAX_TEXTURES) * TEX_SIZE;
        &self.pixels[start..start + TEX_SIZE]
    }

    pub fn tile_mut(&mut self, tex: TextureId) -> &mut [u8] {
        let start = (tex % MAX_TEXTURES) * TEX_SIZE;
        &mut self.pixels[start..start + TEX_SIZE]
    }

    /// Copy slot `tex` into the top-left 64×64 of `dst`.
    pub fn draw_tile(&self, tex: TextureId, dst: &mut Bitmap) -> Result<(), ConfigError> {
        check_tile_target(dst)?;
        let tile = self.tile(tex);
        for y in 0..TEX_HEIGHT {
            for x in 0..TEX_WIDTH {
                dst.set(x, y, tile[y * TEX_WIDTH + x]);
            }
        }
        Ok(())
    }

    /// Overwrite slot `tex` with the top-left 64×64 of `src`.
    pub fn draw_onto_tile(&mut self, tex: TextureId, src: &Bitmap) -> Result<(), ConfigError> {
        check_tile_target(src)?;
        let tile = self.tile_mut(tex);
        for y in 0..TEX_HEIGHT {
            tile[y * TEX_WIDTH..(y + 1) * TEX_WIDTH].copy_from_slice(&src.row(y)[..TEX_WIDTH]);
        }
        Ok(())
    }
}

fn check_tile_target(bmp: &Bitmap) -> Result<(), ConfigError> {
    if bmp.width() < TEX_WIDTH || bmp.height() < TEX_HEIGHT {
        return Err(ConfigError::DimensionMismatch {
            what: "tile bitmap",
            expected: (TEX_WIDTH, TEX_HEIGHT),
            found: bmp.dimensions(),
        });
    }
    Ok(())
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(across: usize, down: usize) -> Bitmap {
        let mut bmp = Bitmap::new(across * TEX_WIDTH, down * TEX_HEIGHT);
        for ty in 0..down {
            for tx in 0..across {
                for y in 0..TEX_HEIGHT {
                    for x in 0..TEX_WIDTH {
                        bmp.set(tx * TEX_WIDTH + x, ty * TEX_HEIGHT + y, (ty * across + tx + 1) as u8);
                    }
                }
            }
        }
        bmp
    }

    #[test]
    fn slices_in_raster_order() {
        let mut atlas = TextureAtlas::default();
        let n = atlas.slice_from(&sheet(3, 2)).unwrap();
        assert_eq!(n, 6);
        for slot in 0..6 {
            assert!(atlas.tile(slot).iter().all(|&p| p == slot as u8 + 1));
        }
        assert!(atlas.tile(6).iter().all(|&p| p == 0));
    }

    #[test]
    fn too_many_tiles_is_rejected() {
        let mut atlas = TextureAtlas::default();
        let big = Bitmap::new(TEX_WIDTH * 33, TEX_HEIGHT * 16);
        assert_eq!(atlas.slice_from(&big).unwrap_err(), ConfigError::TooManyTiles(528));
    }

    #[test]
    fn draw_tile_round_trip() {
        let mut atlas = TextureAtlas::default();
        let mut src = Bitmap::new(TEX_WIDTH, TEX_HEIGHT);
        src.set(3, 5, 77);
        atlas.draw_onto_tile(9, &src).unwrap();
        assert_eq!(atlas.texel(9, 3, 5), 77);

        let mut out = Bitmap::new(80, 80);
        atlas.draw_tile(9, &mut out).unwrap();
        assert_eq!(out.get(3, 5), 77);
        assert!(atlas.draw_tile(9, &mut Bitmap::new(10, 10)).is_err());
    }

    #[test]
    fn texel_slot_wraps() {
        let mut atlas = TextureAtlas::default();
        atlas.tile_mut(1)[0] = 4;
        assert_eq!(atlas.texel(MAX_TEXTURES + 1, 0, 0), 4);
    }
}
