//! Ambient light, the "open ceiling" leak test and the editor tile highlight.

use crate::world::map::{MAP_HEIGHT, MAP_WIDTH, WorldMap};
use crate::world::texture::TextureAtlas;

/// Global light that reaches any surface under an open ceiling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ambient {
    /// `0..=255`, compared against `light << 5`.
    pub light: i32,
    /// Tint colour, 0 disables tinting.
    pub color: u8,
    /// Tint strength handed to `mix_multiply` as its alpha.
    pub amount: u8,
}

impl Ambient {
    pub fn set_light(&mut self, value: i32) {
        self.light = value.clamp(0, 255);
    }

    pub fn set_color(&mut self, color: i32, amount: i32) {
        if !(0..=255).contains(&color) || !(0..=255).contains(&amount) {
            log::warn!("ambient colour {color}/{amount} clamped to 0..=255");
        }
        self.color = color.clamp(0, 255) as u8;
        self.amount = amount.clamp(0, 255) as u8;
    }

    /// `light` raised to the ambient level.
    #[inline(always)]
    pub fn lift(&self, light: i32) -> i32 {
        light.max(self.light)
    }

    #[inline(always)]
    pub fn tints(&self) -> bool {
        self.color != 0
    }
}

/// Light-map value `<< 5`, clamped to a mixer intensity.
#[inline(always)]
pub fn cell_light(raw: u8) -> i32 {
    ((raw as i32) << 5).clamp(0, 255)
}

/// True when the ceiling above a surface lets ambient light through:
/// no ceiling texture, or a transparent texel at `(tx, ty)` of it.
#[inline]
pub fn ceiling_open(atlas: &TextureAtlas, ceiling: i32, tx: usize, ty: usize) -> bool {
    if ceiling <= 1 {
        return true;
    }
    atlas.texel((ceiling - 1) as usize, tx, ty) == 0
}

/// What `get_lighting_at` reports: the brighter of ambient and the light
/// map under an open sky, 0 under any ceiling, `-1` off-map.
pub fn lighting_at(map: &WorldMap, ambient: &Ambient, x: i32, y: i32) -> i32 {
    if !(0..MAP_WIDTH as i32).contains(&x) || !(0..MAP_HEIGHT as i32).contains(&y) {
        return -1;
    }
    let (xu, yu) = (x as usize, y as usize);
    if map.ceiling[xu][yu] != 0 {
        return 0;
    }
    ambient.lift(map.light[xu][yu] as i32)
}

/// Tile whose texel borders are painted in `color` on walls, floor and
/// ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileSelection {
    pub x: i32,
    pub y: i32,
    pub color: u8,
}

impl TileSelection {
    /// `None` when `(x, y)` is off-map, which clears any selection.
    pub fn new(x: i32, y: i32, color: u8) -> Option<Self> {
        let on_map = (0..MAP_WIDTH as i32).contains(&x) && (0..MAP_HEIGHT as i32).contains(&y);
        on_map.then_some(TileSelection { x, y, color })
    }

    #[inline(always)]
    pub fn covers(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }
}

/// Texel on the outer ring of a 64×64 tile.
#[inline(always)]
pub fn on_tile_border(tx: usize, ty: usize) -> bool {
    tx == 0 || tx == 63 || ty == 0 || ty == 63
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lighting_under_sky_and_ceiling() {
        let mut map = WorldMap::default();
        let mut amb = Ambient::default();
        amb.set_light(90);
        map.set_light_at(2, 2, 120);
        map.set_light_at(3, 3, 10);
        map.set_ceiling_at(4, 4, 5);

        assert_eq!(lighting_at(&map, &amb, 2, 2), 120);
        assert_eq!(lighting_at(&map, &amb, 3, 3), 90);
        assert_eq!(lighting_at(&map, &amb, 4, 4), 0);
        assert_eq!(lighting_at(&map, &amb, 64, 0), -1);
    }

    #[test]
    fn ambient_setters_clamp() {
        let mut amb = Ambient::default();
        amb.set_light(999);
        assert_eq!(amb.light, 255);
        amb.set_color(-4, 300);
        assert_eq!((amb.color, amb.amount), (0, 255));
        assert!(!amb.tints());
    }

    #[test]
    fn ceiling_open_reads_the_right_texel() {
        let mut atlas = TextureAtlas::default();
        atlas.tile_mut(4).fill(9);
        // texel (x=63, y=2) of slot 4
        atlas.tile_mut(4)[2 * 64 + 63] = 0;
        assert!(ceiling_open(&atlas, 0, 0, 0));
        assert!(ceiling_open(&atlas, 1, 0, 0));
        assert!(ceiling_open(&atlas, 5, 63, 2));
        assert!(!ceiling_open(&atlas, 5, 2, 63));
    }

    #[test]
    fn selection_off_map_is_none() {
        assert!(TileSelection::new(-1, 3, 7).is_none());
        assert!(TileSelection::new(3, 64, 7).is_none());
        let sel = TileSelection::new(3, 4, 7).unwrap();
        assert!(sel.covers(3, 4));
        assert!(!sel.covers(4, 3));
    }
}
