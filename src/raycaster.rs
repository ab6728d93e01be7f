//! Script-facing façade.
//!
//! [`Raycaster`] owns the world, the palette mixer, the software renderer
//! and the injected flip query. Scripts drive it between frames through
//! the setters and movement commands below; [`Raycaster::render`] draws one
//! frame into a host sprite.
//!
//! Host slots are resolved at call time and never cached, so a missing
//! slot is reported as [`ConfigError::MissingSprite`] (loads) or
//! [`RenderError::MissingTargetSprite`] (render) at the offending call.

use glam::DVec2;
use log::{debug, info};

use crate::host::{FlipQuery, NoFlip, SpriteHost};
use crate::palette::{Clut, Mixer, PalEntry, Palette};
use crate::renderer::software::Software;
use crate::renderer::{Frame, FrameStats, Picking, RenderConfig, RenderError, Renderer};
use crate::sim;
use crate::world::{ConfigError, RaycastWorld, TextureId};

pub struct Raycaster {
    pub world: RaycastWorld,
    pub mixer: Mixer,
    renderer: Software,
    flip: Box<dyn FlipQuery>,
    last_stats: FrameStats,
}

impl Raycaster {
    /// Fresh world drawn through `palette`, no sprite ever mirrored.
    pub fn new(cfg: RenderConfig, palette: Palette) -> Self {
        Self {
            world: RaycastWorld::new(),
            mixer: Mixer::with_palette(palette),
            renderer: Software::new(cfg),
            flip: Box::new(NoFlip),
            last_stats: FrameStats::default(),
        }
    }

    /// Replace the sprite mirroring capability.
    pub fn with_flip_query(mut self, flip: impl FlipQuery + 'static) -> Self {
        self.flip = Box::new(flip);
        self
    }

    /*──────────────────────────── rendering ────────────────────────────*/

    /// Draw one frame into host sprite `slot`.
    ///
    /// On error the target keeps its previous contents and the world is
    /// not touched.
    pub fn render(&mut self, host: &mut dyn SpriteHost, slot: i32) -> Result<FrameStats, RenderError> {
        let target = host.sprite(slot).ok_or(RenderError::MissingTargetSprite(slot))?;
        self.renderer.begin_frame(target)?;
        {
            let frame = Frame {
                world: &self.world,
                mixer: &self.mixer,
                host: &*host,
                flip: self.flip.as_ref(),
            };
            self.renderer.draw_world(&frame)?;
        }

        let target = host
            .sprite_mut(slot)
            .ok_or(RenderError::MissingTargetSprite(slot))?;
        self.renderer.end_frame(|frame| target.blit(0, 0, frame));
        host.notify_sprite_updated(slot);

        for (x, y) in self.renderer.visited_cells() {
            self.world.map.seen[x][y] = true;
        }
        for (spr, pic) in self.world.sprites.0.iter_mut().zip(self.renderer.sprite_pics()) {
            if spr.view != 0 {
                spr.texture = pic.texture;
            }
        }
        self.world.raycast_on = true;
        self.last_stats = self.renderer.stats();
        debug!("frame: {:?}", self.last_stats);
        Ok(self.last_stats)
    }

    /// Counters of the last successful frame.
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Pixels of the last frame lit through an open ceiling.
    pub fn ambient_weight(&self) -> u32 {
        self.last_stats.ambient_weight
    }

    /*────────────────────────── asset loading ──────────────────────────*/

    pub fn load_map(
        &mut self,
        host: &dyn SpriteHost,
        world_slot: i32,
        light_slot: i32,
        ceiling_slot: i32,
        floor_slot: i32,
    ) -> Result<(), ConfigError> {
        let fetch = |slot| host.sprite(slot).ok_or(ConfigError::MissingSprite(slot));
        let (w, l, c, f) = (
            fetch(world_slot)?,
            fetch(light_slot)?,
            fetch(ceiling_slot)?,
            fetch(floor_slot)?,
        );
        self.world.load_map(w, l, c, f)
    }

    pub fn load_height_map(&mut self, host: &dyn SpriteHost, slot: i32) -> Result<(), ConfigError> {
        let img = host.sprite(slot).ok_or(ConfigError::MissingSprite(slot))?;
        self.world.load_height_map(img)
    }

    /// Slice the sheet in `slot` into the texture atlas. Returns the
    /// number of tiles read.
    pub fn make_textures(&mut self, host: &dyn SpriteHost, slot: i32) -> Result<usize, ConfigError> {
        let sheet = host.sprite(slot).ok_or(ConfigError::MissingSprite(slot))?;
        self.world.make_textures(sheet, slot)
    }

    /// Replace the colour lookup table with the 256×256 image in `slot`.
    pub fn load_clut(&mut self, host: &dyn SpriteHost, slot: i32) -> Result<(), ConfigError> {
        let img = host.sprite(slot).ok_or(ConfigError::MissingSprite(slot))?;
        self.mixer.clut = Clut::from_bitmap(img)?;
        self.mixer.clut_slot = slot;
        info!("CLUT loaded from slot {slot}");
        Ok(())
    }

    /// Use the panorama in `slot` as sky; 0 turns the sky off.
    pub fn set_skybox(&mut self, host: &dyn SpriteHost, slot: i32) -> Result<(), ConfigError> {
        if slot != 0 && host.sprite(slot).is_none() {
            return Err(ConfigError::MissingSprite(slot));
        }
        self.world.skybox = slot;
        Ok(())
    }

    pub fn skybox(&self) -> i32 {
        self.world.skybox
    }

    /// Copy atlas slot `tex` into host sprite `slot`.
    pub fn draw_tile(&self, host: &mut dyn SpriteHost, slot: i32, tex: TextureId) -> Result<(), ConfigError> {
        let dst = host.sprite_mut(slot).ok_or(ConfigError::MissingSprite(slot))?;
        self.world.textures.draw_tile(tex, dst)?;
        host.notify_sprite_updated(slot);
        Ok(())
    }

    /// Overwrite atlas slot `tex` with host sprite `slot`.
    pub fn draw_onto_tile(&mut self, host: &dyn SpriteHost, slot: i32, tex: TextureId) -> Result<(), ConfigError> {
        let src = host.sprite(slot).ok_or(ConfigError::MissingSprite(slot))?;
        self.world.textures.draw_onto_tile(tex, src)
    }

    /*──────────────────────────── map cells ────────────────────────────*/

    pub fn wall_at(&self, x: i32, y: i32) -> i32 {
        self.world.map.wall_at(x, y)
    }

    pub fn set_wall_at(&mut self, x: i32, y: i32, id: i32) {
        self.world.map.set_wall_at(x, y, id);
    }

    pub fn light_at(&self, x: i32, y: i32) -> i32 {
        self.world.map.light_at(x, y)
    }

    pub fn set_light_at(&mut self, x: i32, y: i32, light: i32) {
        self.world.map.set_light_at(x, y, light);
    }

    pub fn floor_at(&self, x: i32, y: i32) -> i32 {
        self.world.map.floor_at(x, y)
    }

    pub fn set_floor_at(&mut self, x: i32, y: i32, tex: i32) {
        self.world.map.set_floor_at(x, y, tex);
    }

    pub fn ceiling_at(&self, x: i32, y: i32) -> i32 {
        self.world.map.ceiling_at(x, y)
    }

    pub fn set_ceiling_at(&mut self, x: i32, y: i32, tex: i32) {
        self.world.map.set_ceiling_at(x, y, tex);
    }

    pub fn height_at(&self, x: i32, y: i32) -> i32 {
        self.world.map.height_at(x, y)
    }

    pub fn set_height_at(&mut self, x: i32, y: i32, tex: i32) {
        self.world.map.set_height_at(x, y, tex);
    }

    pub fn has_seen_tile(&self, x: i32, y: i32) -> i32 {
        self.world.map.has_seen_tile(x, y)
    }

    pub fn lighting_at(&self, x: i32, y: i32) -> i32 {
        self.world.lighting_at(x, y)
    }

    /// Outline tile `(x, y)` in `color`; off-map coordinates clear it.
    pub fn select_tile(&mut self, x: i32, y: i32, color: u8) {
        self.world.select_tile(x, y, color);
    }

    /*──────────────────────────── wall types ───────────────────────────*/

    pub fn set_wall_textures(&mut self, id: i32, n: i32, s: i32, w: i32, e: i32) -> Result<(), ConfigError> {
        self.world.walls.set_textures(id, n, s, w, e)
    }

    pub fn set_wall_solid(&mut self, id: i32, n: i32, s: i32, w: i32, e: i32) -> Result<(), ConfigError> {
        self.world.walls.set_solid(id, n, s, w, e)
    }

    pub fn set_wall_ignore_lighting(&mut self, id: i32, n: i32, s: i32, w: i32, e: i32) -> Result<(), ConfigError> {
        self.world.walls.set_ignore_lighting(id, n, s, w, e)
    }

    pub fn set_wall_alpha(&mut self, id: i32, n: i32, s: i32, w: i32, e: i32) -> Result<(), ConfigError> {
        self.world.walls.set_alpha(id, n, s, w, e)
    }

    pub fn set_wall_blend_type(&mut self, id: i32, n: i32, s: i32, w: i32, e: i32) -> Result<(), ConfigError> {
        self.world.walls.set_blend_type(id, n, s, w, e)
    }

    pub fn set_wall_mask(&mut self, id: i32, n: i32, s: i32, w: i32, e: i32) -> Result<(), ConfigError> {
        self.world.walls.set_mask(id, n, s, w, e)
    }

    pub fn set_wall_hotspot(&mut self, id: i32, hotspot: i32) -> Result<(), ConfigError> {
        self.world.walls.set_hotspot(id, hotspot)
    }

    pub fn wall_texture(&self, id: i32, dir: i32) -> Result<i32, ConfigError> {
        self.world.walls.texture(id, dir)
    }

    pub fn wall_solid(&self, id: i32, dir: i32) -> Result<i32, ConfigError> {
        self.world.walls.solid(id, dir)
    }

    pub fn wall_ignore_lighting(&self, id: i32, dir: i32) -> Result<i32, ConfigError> {
        self.world.walls.ignore_lighting(id, dir)
    }

    pub fn wall_alpha(&self, id: i32, dir: i32) -> Result<i32, ConfigError> {
        self.world.walls.alpha(id, dir)
    }

    pub fn wall_blend_type(&self, id: i32, dir: i32) -> Result<i32, ConfigError> {
        self.world.walls.blend_type(id, dir)
    }

    pub fn wall_mask(&self, id: i32, dir: i32) -> Result<i32, ConfigError> {
        self.world.walls.mask(id, dir)
    }

    pub fn wall_hotspot(&self, id: i32) -> Result<i32, ConfigError> {
        self.world.walls.hotspot(id)
    }

    /*───────────────────────────── sprites ─────────────────────────────*/

    #[allow(clippy::too_many_arguments)]
    pub fn init_sprite(
        &mut self,
        id: i32,
        x: f64,
        y: f64,
        slot: i32,
        alpha: i32,
        blend_mode: i32,
        scale_x: f64,
        scale_y: f64,
        v_move: f64,
    ) -> Result<(), ConfigError> {
        let alpha = alpha.clamp(0, 255) as u8;
        self.world
            .sprites
            .init_sprite(id, x, y, slot, alpha, blend_mode, scale_x, scale_y, v_move)
    }

    pub fn set_sprite_position(&mut self, id: i32, x: f64, y: f64) -> Result<(), ConfigError> {
        self.world.sprites.set_position(id, x, y)
    }

    pub fn sprite_x(&self, id: i32) -> Result<f64, ConfigError> {
        Ok(self.world.sprites.get(id)?.x)
    }

    pub fn sprite_y(&self, id: i32) -> Result<f64, ConfigError> {
        Ok(self.world.sprites.get(id)?.y)
    }

    pub fn set_sprite_texture(&mut self, id: i32, slot: i32) -> Result<(), ConfigError> {
        self.world.sprites.get_mut(id)?.texture = slot;
        Ok(())
    }

    pub fn sprite_texture(&self, id: i32) -> Result<i32, ConfigError> {
        Ok(self.world.sprites.get(id)?.texture)
    }

    pub fn set_sprite_alpha(&mut self, id: i32, alpha: i32) -> Result<(), ConfigError> {
        self.world.sprites.set_alpha(id, alpha)
    }

    pub fn sprite_alpha(&self, id: i32) -> Result<i32, ConfigError> {
        Ok(self.world.sprites.get(id)?.alpha as i32)
    }

    pub fn set_sprite_blend_type(&mut self, id: i32, blend: i32) -> Result<(), ConfigError> {
        self.world.sprites.get_mut(id)?.blend_mode = blend.clamp(0, 10);
        Ok(())
    }

    pub fn sprite_blend_type(&self, id: i32) -> Result<i32, ConfigError> {
        Ok(self.world.sprites.get(id)?.blend_mode)
    }

    pub fn set_sprite_scale(&mut self, id: i32, scale_x: f64, scale_y: f64) -> Result<(), ConfigError> {
        let s = self.world.sprites.get_mut(id)?;
        s.u_div_w = scale_x;
        s.u_div_h = scale_y;
        Ok(())
    }

    pub fn sprite_scale_x(&self, id: i32) -> Result<f64, ConfigError> {
        Ok(self.world.sprites.get(id)?.u_div_w)
    }

    pub fn sprite_scale_y(&self, id: i32) -> Result<f64, ConfigError> {
        Ok(self.world.sprites.get(id)?.u_div_h)
    }

    pub fn set_sprite_v_offset(&mut self, id: i32, v_move: f64) -> Result<(), ConfigError> {
        self.world.sprites.get_mut(id)?.v_move = v_move;
        Ok(())
    }

    pub fn sprite_v_offset(&self, id: i32) -> Result<f64, ConfigError> {
        Ok(self.world.sprites.get(id)?.v_move)
    }

    pub fn set_sprite_h_offset(&mut self, id: i32, h_move: f64) -> Result<(), ConfigError> {
        self.world.sprites.get_mut(id)?.h_move = h_move;
        Ok(())
    }

    pub fn sprite_h_offset(&self, id: i32) -> Result<f64, ConfigError> {
        Ok(self.world.sprites.get(id)?.h_move)
    }

    pub fn set_sprite_view(&mut self, id: i32, view: i32) -> Result<(), ConfigError> {
        self.world.sprites.get_mut(id)?.view = view;
        Ok(())
    }

    pub fn sprite_view(&self, id: i32) -> Result<i32, ConfigError> {
        Ok(self.world.sprites.get(id)?.view)
    }

    pub fn set_sprite_frame(&mut self, id: i32, frame: i32) -> Result<(), ConfigError> {
        self.world.sprites.get_mut(id)?.frame = frame;
        Ok(())
    }

    pub fn sprite_frame(&self, id: i32) -> Result<i32, ConfigError> {
        Ok(self.world.sprites.get(id)?.frame)
    }

    pub fn set_sprite_angle(&mut self, id: i32, angle: i32) -> Result<(), ConfigError> {
        self.world.sprites.set_angle(id, angle)
    }

    pub fn sprite_angle(&self, id: i32) -> Result<i32, ConfigError> {
        Ok(self.world.sprites.get(id)?.angle)
    }

    pub fn set_sprite_interact_obj(&mut self, id: i32, obj: i32) -> Result<(), ConfigError> {
        self.world.sprites.set_interact_obj(id, obj)
    }

    pub fn sprite_interact_obj(&self, id: i32) -> Result<i32, ConfigError> {
        Ok(self.world.sprites.get(id)?.object_interact as i32)
    }

    /*────────────────────────── camera & player ────────────────────────*/

    pub fn set_player_position(&mut self, x: f64, y: f64) {
        self.world.camera.pos = DVec2::new(x, y);
    }

    pub fn player_x(&self) -> f64 {
        self.world.camera.pos.x
    }

    pub fn player_y(&self) -> f64 {
        self.world.camera.pos.y
    }

    /// Heading in degrees, `0..360`.
    pub fn camera_angle(&self) -> i32 {
        self.world.camera.angle()
    }

    pub fn set_camera_angle(&mut self, deg: i32) {
        self.world.camera.set_angle(deg);
    }

    /// Camera plane Y, which sets the field of view.
    pub fn plane_y(&self) -> f64 {
        self.world.camera.plane.y
    }

    pub fn set_plane_y(&mut self, y: f64) {
        self.world.camera.plane.y = y;
    }

    pub fn move_speed(&self) -> f64 {
        self.world.movement.move_speed
    }

    pub fn set_move_speed(&mut self, speed: f64) {
        self.world.movement.move_speed = speed;
    }

    pub fn rotation_speed(&self) -> f64 {
        self.world.movement.rot_speed
    }

    pub fn set_rotation_speed(&mut self, speed: f64) {
        self.world.movement.rot_speed = speed;
    }

    pub fn noclip(&self) -> bool {
        self.world.movement.noclip
    }

    pub fn set_noclip(&mut self, on: bool) {
        self.world.movement.noclip = on;
    }

    pub fn move_forward(&mut self) {
        let w = &mut self.world;
        sim::move_forward(&mut w.camera, &w.map, &w.walls, &w.movement);
    }

    pub fn move_backward(&mut self) {
        let w = &mut self.world;
        sim::move_backward(&mut w.camera, &w.map, &w.walls, &w.movement);
    }

    pub fn rotate_left(&mut self) {
        let w = &mut self.world;
        sim::rotate_left(&mut w.camera, &w.movement);
    }

    pub fn rotate_right(&mut self) {
        let w = &mut self.world;
        sim::rotate_right(&mut w.camera, &w.movement);
    }

    /*──────────────────────────── lighting ─────────────────────────────*/

    pub fn set_ambient_light(&mut self, value: i32) {
        self.world.ambient.set_light(value);
    }

    pub fn ambient_light(&self) -> i32 {
        self.world.ambient.light
    }

    /// Tint ambient-lit pixels towards `color` by `amount`.
    pub fn set_ambient_color(&mut self, color: i32, amount: i32) {
        self.world.ambient.set_color(color, amount);
    }

    pub fn ambient_color(&self) -> i32 {
        self.world.ambient.color as i32
    }

    /*───────────────────────────── palette ─────────────────────────────*/

    /// Rotate palette slots `start..=end` of the remap table one step.
    pub fn cycle_remap(&mut self, start: i32, end: i32) {
        let clamp = |v: i32| v.clamp(0, 255) as u8;
        self.mixer.remap.cycle(clamp(start), clamp(end));
    }

    pub fn reset_remapping(&mut self) {
        self.mixer.remap.reset();
    }

    /// Slot that palette index `i` is currently drawn as.
    pub fn remapped_slot(&self, i: u8) -> u8 {
        self.mixer.remap.get(i)
    }

    /// Nearest palette index to a packed 5-6-5 colour.
    pub fn color_565(&self, r5: u8, g6: u8, b5: u8) -> u8 {
        self.mixer.color_565(r5, g6, b5)
    }

    pub fn objective_palette(&self, i: u8) -> PalEntry {
        self.mixer.objective[i as usize]
    }

    pub fn set_objective_palette(&mut self, i: u8, entry: PalEntry) {
        self.mixer.objective[i as usize] = entry;
    }

    /// Install the palette the host now displays.
    pub fn set_palette(&mut self, palette: Palette) {
        self.mixer.palette = palette;
    }

    /*──────────────────────── screen-space queries ─────────────────────*/

    pub fn tile_x_at(&self, x: i32, y: i32) -> i32 {
        self.renderer.tile_x_at(x, y)
    }

    pub fn tile_y_at(&self, x: i32, y: i32) -> i32 {
        self.renderer.tile_y_at(x, y)
    }

    pub fn hotspot_at(&self, x: i32, y: i32) -> i32 {
        self.renderer.hotspot_at(x, y)
    }

    pub fn object_at(&self, x: i32, y: i32) -> i32 {
        self.renderer.object_at(x, y)
    }

    pub fn distance_at(&self, x: i32, y: i32) -> f64 {
        self.renderer.distance_at(x, y)
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
