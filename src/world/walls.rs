//! Wall types: what each of the 256 wall ids looks like from each side.

use bitflags::bitflags;

use crate::world::ConfigError;

pub const NUM_WALL_TYPES: usize = 256;

/// Wall ids above this are "decorations": thin walls whose far face is
/// looked at again when a ray crosses into them right after a back-face hit.
pub const THIN_WALL_MIN: u8 = 8;

/// Cell face, as seen by a ray.
///
/// * `North` (0): ray travelling +X hits it
/// * `South` (1): ray travelling −X
/// * `West`  (2): ray travelling +Y
/// * `East`  (3): ray travelling −Y
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    North = 0,
    South = 1,
    West = 2,
    East = 3,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::South, Side::West, Side::East];

    pub fn from_index(dir: i32) -> Result<Side, ConfigError> {
        match dir {
            0 => Ok(Side::North),
            1 => Ok(Side::South),
            2 => Ok(Side::West),
            3 => Ok(Side::East),
            _ => Err(ConfigError::BadDirection(dir)),
        }
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// How a see-through surface combines with what lies behind it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    Alpha,
    Additive,
}

impl BlendMode {
    /// Stored blend types go up to 10; only 0 and 1 draw anything.
    #[inline]
    pub fn from_raw(raw: u8) -> Option<BlendMode> {
        match raw {
            0 => Some(BlendMode::Alpha),
            1 => Some(BlendMode::Additive),
            _ => None,
        }
    }
}

bitflags! {
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FaceFlags: u8 {
        /// Blocks player movement across this face.
        const SOLID           = 0x01;
        /// Drawn at full brightness regardless of the light map.
        const IGNORE_LIGHTING = 0x02;
    }
}

/// One direction of a wall type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallFace {
    /// 1-based texture; 0 = no face in this direction.
    pub texture: i32,
    pub flags: FaceFlags,
    pub alpha: u8,
    pub blend_type: u8,
    /// Alpha-mask texture slot, 0 = none.
    pub mask: i32,
}

impl Default for WallFace {
    fn default() -> Self {
        Self {
            texture: 0,
            flags: FaceFlags::empty(),
            alpha: 0,
            blend_type: 0,
            mask: 0,
        }
    }
}

impl WallFace {
    #[inline(always)]
    pub fn is_solid(&self) -> bool {
        self.flags.contains(FaceFlags::SOLID)
    }

    #[inline(always)]
    pub fn ignores_lighting(&self) -> bool {
        self.flags.contains(FaceFlags::IGNORE_LIGHTING)
    }

    /// Drawn straight into the frame, no translucent layer.
    #[inline(always)]
    pub fn is_opaque(&self) -> bool {
        self.alpha == 255 && self.mask == 0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WallType {
    pub faces: [WallFace; 4],
    pub hotspot: u8,
}

impl WallType {
    #[inline(always)]
    pub fn face(&self, side: Side) -> &WallFace {
        &self.faces[side.index()]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WallTable(pub Vec<WallType>);

impl Default for WallTable {
    fn default() -> Self {
        WallTable(vec![WallType::default(); NUM_WALL_TYPES])
    }
}

fn clamp_flag(v: i32) -> bool {
    v.clamp(0, 1) == 1
}

impl WallTable {
    #[inline(always)]
    pub fn get(&self, id: u8) -> &WallType {
        &self.0[id as usize]
    }

    fn slot(&self, id: i32) -> Result<&WallType, ConfigError> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.0.get(i))
            .ok_or(ConfigError::WallTypeOutOfRange(id))
    }

    fn slot_mut(&mut self, id: i32) -> Result<&mut WallType, ConfigError> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.0.get_mut(i))
            .ok_or(ConfigError::WallTypeOutOfRange(id))
    }

    fn set_each(
        &mut self,
        id: i32,
        vals: [i32; 4],
        mut apply: impl FnMut(&mut WallFace, i32),
    ) -> Result<(), ConfigError> {
        let wall = self.slot_mut(id)?;
        for (face, v) in wall.faces.iter_mut().zip(vals) {
            apply(face, v);
        }
        Ok(())
    }

    /// Ids 0‥10 to the stock set: 0 empty, 1 a room wall with distinct
    /// N/S/W/E textures (north face passable), 2‥9 solid single-texture
    /// walls, 10 half-transparent glass on texture 11.
    pub fn reset_defaults(&mut self) {
        for i in 0..11 {
            for face in self.0[i].faces.iter_mut() {
                face.texture = i as i32;
                face.flags.set(FaceFlags::SOLID, i > 0);
                if i == 10 {
                    face.texture = 11;
                    face.alpha = 128;
                    face.blend_type = 0;
                    face.flags.remove(FaceFlags::SOLID);
                } else {
                    face.alpha = 255;
                }
            }
        }
        for (face, tex) in self.0[1].faces.iter_mut().zip([1, 2, 3, 4]) {
            face.texture = tex;
        }
        self.0[1].faces[Side::North.index()].flags.remove(FaceFlags::SOLID);
    }

    /*──────────────────────── script setters ──────────────────────────*/

    pub fn set_textures(&mut self, id: i32, n: i32, s: i32, w: i32, e: i32) -> Result<(), ConfigError> {
        self.set_each(id, [n, s, w, e], |f, v| f.texture = v)
    }

    pub fn set_solid(&mut self, id: i32, n: i32, s: i32, w: i32, e: i32) -> Result<(), ConfigError> {
        self.set_each(id, [n, s, w, e], |f, v| {
            f.flags.set(FaceFlags::SOLID, clamp_flag(v))
        })
    }

    pub fn set_ignore_lighting(
        &mut self,
        id: i32,
        n: i32,
        s: i32,
        w: i32,
        e: i32,
    ) -> Result<(), ConfigError> {
        self.set_each(id, [n, s, w, e], |f, v| {
            f.flags.set(FaceFlags::IGNORE_LIGHTING, clamp_flag(v))
        })
    }

    pub fn set_alpha(&mut self, id: i32, n: i32, s: i32, w: i32, e: i32) -> Result<(), ConfigError> {
        self.set_each(id, [n, s, w, e], |f, v| f.alpha = v.clamp(0, 255) as u8)
    }

    pub fn set_blend_type(&mut self, id: i32, n: i32, s: i32, w: i32, e: i32) -> Result<(), ConfigError> {
        self.set_each(id, [n, s, w, e], |f, v| f.blend_type = v.clamp(0, 10) as u8)
    }

    pub fn set_mask(&mut self, id: i32, n: i32, s: i32, w: i32, e: i32) -> Result<(), ConfigError> {
        self.set_each(id, [n, s, w, e], |f, v| f.mask = v.max(0))
    }

    pub fn set_hotspot(&mut self, id: i32, hotspot: i32) -> Result<(), ConfigError> {
        self.slot_mut(id)?.hotspot = hotspot.clamp(0, 255) as u8;
        Ok(())
    }

    /*──────────────────────── script getters ──────────────────────────*/

    pub fn face(&self, id: i32, dir: i32) -> Result<&WallFace, ConfigError> {
        let side = Side::from_index(dir)?;
        Ok(self.slot(id)?.face(side))
    }

    pub fn texture(&self, id: i32, dir: i32) -> Result<i32, ConfigError> {
        Ok(self.face(id, dir)?.texture)
    }

    pub fn solid(&self, id: i32, dir: i32) -> Result<i32, ConfigError> {
        Ok(self.face(id, dir)?.is_solid() as i32)
    }

    pub fn ignore_lighting(&self, id: i32, dir: i32) -> Result<i32, ConfigError> {
        Ok(self.face(id, dir)?.ignores_lighting() as i32)
    }

    pub fn alpha(&self, id: i32, dir: i32) -> Result<i32, ConfigError> {
        Ok(self.face(id, dir)?.alpha as i32)
    }

    pub fn blend_type(&self, id: i32, dir: i32) -> Result<i32, ConfigError> {
        Ok(self.face(id, dir)?.blend_type as i32)
    }

    pub fn mask(&self, id: i32, dir: i32) -> Result<i32, ConfigError> {
        Ok(self.face(id, dir)?.mask)
    }

    pub fn hotspot(&self, id: i32) -> Result<i32, ConfigError> {
        Ok(self.slot(id)?.hotspot as i32)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_set() {
        let mut t = WallTable::default();
        t.reset_defaults();

        assert_eq!(t.get(0).faces[0].texture, 0);
        assert!(!t.get(0).faces[0].is_solid());

        let room = t.get(1);
        assert_eq!(room.faces.map(|f| f.texture), [1, 2, 3, 4]);
        assert!(!room.face(Side::North).is_solid());
        assert!(room.face(Side::South).is_solid());
        assert!(room.faces.iter().all(|f| f.is_opaque()));

        assert_eq!(t.get(5).faces.map(|f| f.texture), [5; 4]);

        let glass = t.get(10);
        assert!(glass.faces.iter().all(|f| f.texture == 11 && f.alpha == 128 && !f.is_solid()));
        assert!(!glass.faces[0].is_opaque());
    }

    #[test]
    fn setters_clamp_instead_of_rejecting() {
        let mut t = WallTable::default();
        t.set_alpha(3, -5, 300, 128, 255).unwrap();
        assert_eq!(
            (0..4).map(|d| t.alpha(3, d).unwrap()).collect::<Vec<_>>(),
            vec![0, 255, 128, 255]
        );

        t.set_solid(3, 7, -1, 0, 1).unwrap();
        assert_eq!(
            (0..4).map(|d| t.solid(3, d).unwrap()).collect::<Vec<_>>(),
            vec![1, 0, 0, 1]
        );

        t.set_blend_type(3, 0, 1, 11, -2).unwrap();
        assert_eq!(t.blend_type(3, 2).unwrap(), 10);
        assert_eq!(t.blend_type(3, 3).unwrap(), 0);

        t.set_ignore_lighting(3, 1, 0, 5, 0).unwrap();
        assert_eq!(t.ignore_lighting(3, 2).unwrap(), 1);
        // ignore-lighting and solid share a byte; neither clobbers the other
        assert_eq!(t.solid(3, 0).unwrap(), 1);
    }

    #[test]
    fn round_trip_textures_and_hotspot() {
        let mut t = WallTable::default();
        t.set_textures(200, 9, 8, 7, 6).unwrap();
        t.set_hotspot(200, 42).unwrap();
        t.set_mask(200, 0, 3, 0, 0).unwrap();
        assert_eq!(t.texture(200, 0).unwrap(), 9);
        assert_eq!(t.texture(200, 3).unwrap(), 6);
        assert_eq!(t.hotspot(200).unwrap(), 42);
        assert_eq!(t.mask(200, 1).unwrap(), 3);
    }

    #[test]
    fn bad_ids_and_directions_are_errors() {
        let mut t = WallTable::default();
        assert_eq!(
            t.set_textures(256, 1, 1, 1, 1).unwrap_err(),
            ConfigError::WallTypeOutOfRange(256)
        );
        assert_eq!(t.hotspot(-1).unwrap_err(), ConfigError::WallTypeOutOfRange(-1));
        assert_eq!(t.texture(1, 4).unwrap_err(), ConfigError::BadDirection(4));
    }

    #[test]
    fn blend_mode_only_knows_two() {
        assert_eq!(BlendMode::from_raw(0), Some(BlendMode::Alpha));
        assert_eq!(BlendMode::from_raw(1), Some(BlendMode::Additive));
        assert_eq!(BlendMode::from_raw(7), None);
    }
}
