//! Billboard sprites: facing resolution, far-to-near sort, projection and
//! per-pixel Z tests against walls, planes and translucent layers.

use glam::DVec2;

use super::translucent::blend_over;
use super::{NEAR_CLIP, Software, SpritePic};
use crate::host::Bitmap;
use crate::renderer::{Frame, RenderError};
use crate::world::lighting::cell_light;
use crate::world::map::{MAP_HEIGHT, MAP_WIDTH, wrap_coord};
use crate::world::sprites::{NUM_SPRITES, Sprite, comb_sort_far_first, facing_loop};

/// Screen box and scaling of one projected billboard.
#[derive(Clone, Copy, Debug)]
struct Projection {
    depth: f64,
    screen_x: i64,
    /// Projected height and width in pixels.
    sh: i64,
    sw: i64,
    v_shift: i64,
    x_range: (i64, i64),
    y_range: (i64, i64),
}

impl Projection {
    fn new(t: DVec2, spr: &Sprite, gfx: &Bitmap, w: i64, h: i64) -> Self {
        let (sprw, sprh) = (gfx.width() as f64, gfx.height() as f64);
        let u_div = sprw / 64.0 + spr.u_div_w;
        let v_div = sprh / 64.0 + spr.u_div_h;
        let v_move = spr.v_move + (64.0 - sprh) * 1.6;
        let v_shift = (v_move / t.y) as i64;
        let h_shift = (spr.h_move / t.y) as i64;

        let screen_x = ((w / 2) as f64 * (1.0 + t.x / t.y)) as i64;
        let sh = ((h as f64 / t.y * v_div) as i64).abs();
        let sw = ((h as f64 / t.y * u_div) as i64).abs();

        Self {
            depth: t.y,
            screen_x,
            sh,
            sw,
            v_shift,
            x_range: (
                (-sw / 2 + screen_x + h_shift).max(0),
                (sw / 2 + screen_x + h_shift).min(w - 1),
            ),
            y_range: (
                (-sh / 2 + h / 2 + v_shift).max(0),
                (sh / 2 + h / 2 + v_shift).min(h - 1),
            ),
        }
    }
}

impl Software {
    /// Pick the texture of every sprite for this frame. Sprites with a
    /// view take the cel of the loop facing the camera.
    pub(super) fn resolve_sprite_pics(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        let world = frame.world;
        let pos = world.camera.pos;
        for (slot, spr) in world.sprites.0.iter().enumerate().take(NUM_SPRITES) {
            let mut pic = SpritePic {
                texture: spr.texture,
                flipped: false,
            };
            if spr.view != 0 {
                let heading = (spr.y - pos.y).atan2(spr.x - pos.x);
                let deg = (heading / 3.1415 * 180.0) as i32;
                let deg = (deg + 180 + spr.angle).rem_euclid(360);
                let loop_ = facing_loop(deg);
                let cel = frame
                    .host
                    .view_frame(spr.view, loop_, spr.frame)
                    .ok_or(RenderError::MissingViewFrame {
                        view: spr.view,
                        loop_,
                        frame: spr.frame,
                    })?;
                pic = SpritePic {
                    texture: cel.pic,
                    flipped: frame.flip.is_flipped(spr.view, loop_, spr.frame),
                };
            }
            self.sprite_pics[slot] = pic;
        }
        Ok(())
    }

    /// Project and draw every active sprite, farthest first.
    pub(super) fn draw_sprites(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        let world = frame.world;
        let cam = &world.camera;
        let n = world.sprites.0.len().min(NUM_SPRITES);

        let mut order: Vec<usize> = (0..n).collect();
        let mut dist: Vec<f64> = world.sprites.0[..n]
            .iter()
            .map(|s| DVec2::new(s.x, s.y).distance_squared(cam.pos))
            .collect();
        comb_sort_far_first(&mut order, &mut dist);

        let inv_det = 1.0 / cam.determinant();
        for &slot in &order {
            let spr = &world.sprites.0[slot];
            if !spr.is_active() {
                continue;
            }
            let pic = self.sprite_pics[slot];
            let gfx = frame
                .host
                .sprite(pic.texture)
                .ok_or(RenderError::MissingSpriteGraphic(pic.texture))?;

            let t = cam.to_cam(DVec2::new(spr.x, spr.y), inv_det);
            if t.y < NEAR_CLIP {
                continue;
            }
            self.stats.sprites_drawn += 1;
            let light = sprite_light(spr, frame);
            let proj = Projection::new(t, spr, gfx, self.width as i64, self.height as i64);
            self.draw_billboard(spr, gfx, pic.flipped, light, &proj, frame);
        }
        Ok(())
    }

    fn draw_billboard(
        &mut self,
        spr: &Sprite,
        gfx: &Bitmap,
        flipped: bool,
        light: u8,
        p: &Projection,
        frame: &Frame<'_>,
    ) {
        let mixer = frame.mixer;
        let (w, h) = (self.width as i64, self.height as i64);
        let (sprw, sprh) = (gfx.width() as i64, gfx.height() as i64);
        if p.sw == 0 || p.sh == 0 {
            return;
        }
        let left = -p.sw / 2 + p.screen_x;
        let object = (spr.object_interact as i16) << 8;

        for stripe in p.x_range.0..p.x_range.1 {
            let mut tex_x = (256 * (stripe - left) * sprw / p.sw) / 256;
            if !(0..sprw).contains(&tex_x) {
                continue;
            }
            if flipped {
                tex_x = sprw - 1 - tex_x;
            }
            if stripe <= 0 || stripe >= w {
                continue;
            }
            let x = stripe as usize;

            for y in p.y_range.0..p.y_range.1 {
                let yu = y as usize;
                let i = self.idx(x, yu);
                if !self.z_allows(i, p.depth) {
                    continue;
                }
                let d = (y - p.v_shift) * 256 - h * 128 + p.sh * 128;
                let tex_y = d * sprh / p.sh / 256;
                if !(0..sprh).contains(&tex_y) {
                    continue;
                }
                let mut color = gfx.get(tex_x as usize, tex_y as usize);
                if color == 0 {
                    continue;
                }

                if spr.alpha < 255 {
                    let under = self.scratch.get(x, yu);
                    color = match spr.blend_mode {
                        0 => mixer.mix_alpha(color, under, spr.alpha, false),
                        1 => mixer.mix_additive(color, under, spr.alpha, false),
                        _ => color,
                    };
                }
                color = mixer.mix_light_level(color, light);

                match self.columns[x].in_front_of(yu, p.depth) {
                    Some((layer, blend)) => {
                        let out = blend_over(mixer, blend, layer.color, color, layer.alpha);
                        self.scratch.set(x, yu, out);
                        self.zbuffer[i] = layer.depth;
                    }
                    None => {
                        self.scratch.set(x, yu, color);
                        self.zbuffer[i] = p.depth;
                    }
                }
                self.interaction[i] = object;
            }
        }
    }
}

/// Light at the sprite's cell, raised to ambient under an open ceiling.
fn sprite_light(spr: &Sprite, frame: &Frame<'_>) -> u8 {
    let world = frame.world;
    let (cx, cy) = (
        wrap_coord(spr.x as i32, MAP_WIDTH),
        wrap_coord(spr.y as i32, MAP_HEIGHT),
    );
    let mut light = cell_light(world.map.light[cx][cy]);
    let ceiling = world.map.ceiling[cx][cy];
    let open = if ceiling == 0 {
        true
    } else {
        let tx = ((spr.x * 64.0) as i32).rem_euclid(64) as usize;
        let ty = ((spr.y * 64.0) as i32).rem_euclid(64) as usize;
        world.textures.texel((ceiling - 1).max(0) as usize, tx, ty) == 0
    };
    if open {
        light = world.ambient.lift(light);
    }
    light.clamp(0, 255) as u8
}
