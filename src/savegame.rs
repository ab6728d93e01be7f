//! Save/restore of the persisted raycaster state.
//!
//! ### Layout (little-endian)
//! * `PCST` magic, `u16` version
//! * palette: 256 remap bytes, 256 × 3 objective palette bytes, CLUT slot
//! * 256 sprite records, 256 wall-type records
//! * flags (`raycast_on`, `heightmap_on`), camera vectors, move/turn speed
//! * 64 × 64 cell records, present only when `raycast_on` is set
//! * texture slot, skybox slot, ambient light/colour/amount, noclip
//!
//! Restore reads the whole stream before touching the live state, so a
//! truncated or foreign file leaves the raycaster as it was.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian as LE, ReadBytesExt, WriteBytesExt};
use glam::DVec2;
use log::{info, warn};
use thiserror::Error;

use crate::host::SpriteHost;
use crate::palette::{Clut, PalEntry};
use crate::raycaster::Raycaster;
use crate::world::{ConfigError, FaceFlags, MAP_HEIGHT, MAP_WIDTH, Sprite, WallFace, WallType};

const SAVE_MAGIC: &[u8; 4] = b"PCST";
pub const SAVE_VERSION: u16 = 1;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("not a raycaster save")]
    BadMagic,

    #[error("save version {0} is not supported")]
    UnsupportedVersion(u16),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/*──────────────────────────── record codecs ───────────────────────────*/

fn write_sprite<W: Write>(w: &mut W, s: &Sprite) -> io::Result<()> {
    w.write_f64::<LE>(s.x)?;
    w.write_f64::<LE>(s.y)?;
    w.write_i32::<LE>(s.texture)?;
    w.write_u8(s.alpha)?;
    w.write_f64::<LE>(s.u_div_w)?;
    w.write_f64::<LE>(s.u_div_h)?;
    w.write_f64::<LE>(s.v_move)?;
    w.write_f64::<LE>(s.h_move)?;
    w.write_i8(s.object_interact)?;
    w.write_i32::<LE>(s.view)?;
    w.write_i32::<LE>(s.frame)?;
    w.write_i32::<LE>(s.angle)?;
    w.write_i32::<LE>(s.blend_mode)
}

fn read_sprite<R: Read>(r: &mut R) -> io::Result<Sprite> {
    Ok(Sprite {
        x: r.read_f64::<LE>()?,
        y: r.read_f64::<LE>()?,
        texture: r.read_i32::<LE>()?,
        alpha: r.read_u8()?,
        u_div_w: r.read_f64::<LE>()?,
        u_div_h: r.read_f64::<LE>()?,
        v_move: r.read_f64::<LE>()?,
        h_move: r.read_f64::<LE>()?,
        object_interact: r.read_i8()?,
        view: r.read_i32::<LE>()?,
        frame: r.read_i32::<LE>()?,
        angle: r.read_i32::<LE>()?,
        blend_mode: r.read_i32::<LE>()?,
    })
}

fn write_wall<W: Write>(w: &mut W, wall: &WallType) -> io::Result<()> {
    for f in &wall.faces {
        w.write_i32::<LE>(f.texture)?;
        w.write_i32::<LE>(f.is_solid() as i32)?;
        w.write_i32::<LE>(f.ignores_lighting() as i32)?;
        w.write_i32::<LE>(f.alpha as i32)?;
        w.write_i32::<LE>(f.blend_type as i32)?;
        w.write_i32::<LE>(f.mask)?;
    }
    w.write_u8(wall.hotspot)
}

fn read_wall<R: Read>(r: &mut R) -> io::Result<WallType> {
    let mut wall = WallType::default();
    for f in wall.faces.iter_mut() {
        let texture = r.read_i32::<LE>()?;
        let solid = r.read_i32::<LE>()? != 0;
        let ignore = r.read_i32::<LE>()? != 0;
        let alpha = r.read_i32::<LE>()?.clamp(0, 255) as u8;
        let blend_type = r.read_i32::<LE>()?.clamp(0, 255) as u8;
        let mask = r.read_i32::<LE>()?;
        let mut flags = FaceFlags::empty();
        flags.set(FaceFlags::SOLID, solid);
        flags.set(FaceFlags::IGNORE_LIGHTING, ignore);
        *f = WallFace {
            texture,
            flags,
            alpha,
            blend_type,
            mask,
        };
    }
    wall.hotspot = r.read_u8()?;
    Ok(wall)
}

fn write_vec<W: Write>(w: &mut W, v: DVec2) -> io::Result<()> {
    w.write_f64::<LE>(v.x)?;
    w.write_f64::<LE>(v.y)
}

fn read_vec<R: Read>(r: &mut R) -> io::Result<DVec2> {
    Ok(DVec2::new(r.read_f64::<LE>()?, r.read_f64::<LE>()?))
}

/*────────────────────────────── save/load ─────────────────────────────*/

impl Raycaster {
    /// Serialize the persisted state to `w`.
    pub fn save<W: Write>(&self, w: &mut W) -> Result<(), SaveError> {
        let world = &self.world;
        w.write_all(SAVE_MAGIC)?;
        w.write_u16::<LE>(SAVE_VERSION)?;

        w.write_all(&self.mixer.remap.0)?;
        for e in &self.mixer.objective.0 {
            w.write_all(&[e.r, e.g, e.b])?;
        }
        w.write_i32::<LE>(self.mixer.clut_slot)?;

        for s in &world.sprites.0 {
            write_sprite(w, s)?;
        }
        for wall in &world.walls.0 {
            write_wall(w, wall)?;
        }

        w.write_u8(world.raycast_on as u8)?;
        w.write_u8(world.map.heightmap_on as u8)?;
        write_vec(w, world.camera.pos)?;
        write_vec(w, world.camera.dir)?;
        write_vec(w, world.camera.plane)?;
        w.write_f64::<LE>(world.movement.move_speed)?;
        w.write_f64::<LE>(world.movement.rot_speed)?;

        if world.raycast_on {
            let m = &world.map;
            for x in 0..MAP_WIDTH {
                for y in 0..MAP_HEIGHT {
                    w.write_u8(m.walls[x][y])?;
                    w.write_u8(m.light[x][y])?;
                    w.write_i32::<LE>(m.ceiling[x][y])?;
                    w.write_i32::<LE>(m.floor[x][y])?;
                    w.write_i32::<LE>(m.height[x][y])?;
                    w.write_u8(m.seen[x][y] as u8)?;
                }
            }
        }

        w.write_i32::<LE>(world.textures.source_slot)?;
        w.write_i32::<LE>(world.skybox)?;
        w.write_i32::<LE>(world.ambient.light)?;
        w.write_u8(world.ambient.color)?;
        w.write_u8(world.ambient.amount)?;
        w.write_u8(world.movement.noclip as u8)?;
        Ok(())
    }

    /// Replace the persisted state with the one read from `r`.
    ///
    /// Textures are re-sliced from the saved texture slot and the CLUT is
    /// reloaded from its saved slot when `host` still has those sprites.
    pub fn restore<R: Read>(&mut self, r: &mut R, host: &dyn SpriteHost) -> Result<(), SaveError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != SAVE_MAGIC {
            return Err(SaveError::BadMagic);
        }
        let version = r.read_u16::<LE>()?;
        if version != SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion(version));
        }

        let mut world = self.world.clone();
        let mut remap = self.mixer.remap.clone();
        let mut objective = self.mixer.objective.clone();

        r.read_exact(&mut remap.0)?;
        for i in 0..256 {
            let mut rgb = [0u8; 3];
            r.read_exact(&mut rgb)?;
            objective[i] = PalEntry::new(rgb[0], rgb[1], rgb[2]);
        }
        let clut_slot = r.read_i32::<LE>()?;

        for s in world.sprites.0.iter_mut() {
            *s = read_sprite(r)?;
        }
        for wall in world.walls.0.iter_mut() {
            *wall = read_wall(r)?;
        }

        world.raycast_on = r.read_u8()? != 0;
        world.map.heightmap_on = r.read_u8()? != 0;
        world.camera.pos = read_vec(r)?;
        world.camera.dir = read_vec(r)?;
        world.camera.plane = read_vec(r)?;
        world.movement.move_speed = r.read_f64::<LE>()?;
        world.movement.rot_speed = r.read_f64::<LE>()?;

        if world.raycast_on {
            let m = &mut world.map;
            for x in 0..MAP_WIDTH {
                for y in 0..MAP_HEIGHT {
                    m.walls[x][y] = r.read_u8()?;
                    m.light[x][y] = r.read_u8()?;
                    m.ceiling[x][y] = r.read_i32::<LE>()?;
                    m.floor[x][y] = r.read_i32::<LE>()?;
                    m.height[x][y] = r.read_i32::<LE>()?;
                    m.seen[x][y] = r.read_u8()? != 0;
                }
            }
        }

        let texture_slot = r.read_i32::<LE>()?;
        world.skybox = r.read_i32::<LE>()?;
        world.ambient.light = r.read_i32::<LE>()?;
        world.ambient.color = r.read_u8()?;
        world.ambient.amount = r.read_u8()?;
        world.movement.noclip = r.read_u8()? != 0;

        world.textures.source_slot = texture_slot;
        if texture_slot != 0 {
            match host.sprite(texture_slot) {
                Some(sheet) => {
                    world.textures.slice_from(sheet)?;
                }
                None => warn!("texture sheet slot {texture_slot} is gone; keeping current textures"),
            }
        }
        let clut = match (clut_slot, host.sprite(clut_slot)) {
            (0, _) => None,
            (_, Some(img)) => Some(Clut::from_bitmap(img)?),
            (_, None) => {
                warn!("CLUT slot {clut_slot} is gone; keeping current table");
                None
            }
        };

        self.world = world;
        self.mixer.remap = remap;
        self.mixer.objective = objective;
        self.mixer.clut_slot = clut_slot;
        if let Some(clut) = clut {
            self.mixer.clut = clut;
        }
        info!("restored save (version {version})");
        Ok(())
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Bitmap, SpriteBank};
    use crate::palette::Palette;
    use crate::renderer::RenderConfig;

    fn raycaster() -> Raycaster {
        Raycaster::new(RenderConfig::default(), Palette::distinct_565())
    }

    #[test]
    fn records_survive_a_round_trip() {
        let mut rc = raycaster();
        rc.init_sprite(7, 3.5, 4.25, 11, 128, 1, 0.5, 0.0, -3.0).unwrap();
        rc.set_sprite_interact_obj(7, -5).unwrap();
        rc.set_wall_mask(20, 1, 2, 3, 4).unwrap();
        rc.set_wall_solid(20, 1, 0, 1, 0).unwrap();
        rc.set_wall_hotspot(20, 9).unwrap();
        rc.set_ambient_color(40, 200);
        rc.set_noclip(true);
        rc.cycle_remap(1, 4);

        let mut buf = Vec::new();
        rc.save(&mut buf).unwrap();

        let mut back = raycaster();
        back.restore(&mut buf.as_slice(), &SpriteBank::new()).unwrap();
        assert_eq!(back.world.sprites, rc.world.sprites);
        assert_eq!(back.world.walls.0, rc.world.walls.0);
        assert_eq!(back.world.camera, rc.world.camera);
        assert_eq!(back.world.ambient, rc.world.ambient);
        assert!(back.noclip());
        assert_eq!(back.mixer.remap, rc.mixer.remap);
    }

    #[test]
    fn map_is_saved_only_once_raycasting() {
        let mut rc = raycaster();
        rc.set_wall_at(5, 6, 3);
        let mut short = Vec::new();
        rc.save(&mut short).unwrap();

        rc.world.raycast_on = true;
        let mut full = Vec::new();
        rc.save(&mut full).unwrap();
        assert_eq!(full.len() - short.len(), MAP_WIDTH * MAP_HEIGHT * 15);

        let mut back = raycaster();
        back.restore(&mut full.as_slice(), &SpriteBank::new()).unwrap();
        assert_eq!(back.wall_at(5, 6), 3);
    }

    #[test]
    fn foreign_or_truncated_input_leaves_state() {
        let mut rc = raycaster();
        rc.set_player_position(9.5, 9.5);
        let bank = SpriteBank::new();

        let err = rc.restore(&mut &b"NOPE\x01\x00"[..], &bank).unwrap_err();
        assert!(matches!(err, SaveError::BadMagic));

        let err = rc.restore(&mut &b"PCST\x09\x00"[..], &bank).unwrap_err();
        assert!(matches!(err, SaveError::UnsupportedVersion(9)));

        let mut buf = Vec::new();
        raycaster().save(&mut buf).unwrap();
        buf.truncate(buf.len() / 2);
        let err = rc.restore(&mut buf.as_slice(), &bank).unwrap_err();
        assert!(matches!(err, SaveError::Io(_)));
        assert_eq!(rc.player_x(), 9.5);
    }

    #[test]
    fn textures_reslice_from_host() {
        let mut rc = raycaster();
        let mut bank = SpriteBank::new();
        bank.insert(30, Bitmap::filled(128, 64, 5));
        rc.make_textures(&bank, 30).unwrap();
        let mut buf = Vec::new();
        rc.save(&mut buf).unwrap();

        let mut back = raycaster();
        back.restore(&mut buf.as_slice(), &bank).unwrap();
        assert_eq!(back.world.textures.texel(1, 3, 3), 5);
        assert_eq!(back.world.textures.source_slot, 30);
    }
}
