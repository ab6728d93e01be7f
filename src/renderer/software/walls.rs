//! Wall stripes: DDA walk per column, texture sampling, face lighting,
//! Z-tested writes and translucent layer capture.

use glam::DVec2;

use super::dda::{Axis, DdaRay, FaceHit, MAX_DDA_ITERATIONS};
use super::translucent::LayerPixel;
use super::{NEAR_CLIP, Software, pack_tile};
use crate::renderer::Frame;
use crate::world::lighting::{cell_light, ceiling_open, on_tile_border};
use crate::world::map::MAP_HEIGHT;
use crate::world::texture::MAX_TEXTURES;
use crate::world::walls::{WallFace, WallType};

/// Where the walk of one column stopped; the floor pass anchors on it.
#[derive(Clone, Copy, Debug)]
pub(super) struct ColumnEnd {
    pub perp: f64,
    pub wall_x: f64,
    pub side: Axis,
    pub base_dir: DVec2,
    pub map_x: i32,
    pub map_y: i32,
    pub ended_reversed: bool,
    /// One past the last screen row the final face covered.
    pub draw_end: usize,
}

/// Light reaching a face and whether it came from the ambient leak.
#[derive(Clone, Copy, Debug)]
struct FaceLight {
    level: i32,
    ambient: bool,
}

impl Software {
    /// Walk the grid for column `x`, drawing every face met until an
    /// opaque one stops the ray. `None` when nothing was hit.
    pub(super) fn cast_column(&mut self, x: usize, frame: &Frame<'_>) -> Option<ColumnEnd> {
        let world = frame.world;
        let cam = &world.camera;
        let mut ray = DdaRay::new(cam.pos, cam.ray_dir(x, self.width));
        let mut end = None;

        for _ in 0..MAX_DDA_ITERATIONS {
            ray.advance(&world.map);
            let (cx, cy) = ray.cell();
            self.visited[cx * MAP_HEIGHT + cy] = true;

            let wall = world.walls.get(world.map.walls[cx][cy]);
            let face = wall.face(ray.face());
            if face.texture == 0 {
                ray.after_miss();
                continue;
            }

            let mut hit = ray.hit();
            // a camera standing on the face line would project it infinitely tall
            hit.perp = hit.perp.max(NEAR_CLIP);
            let (deeper, draw_end) = self.draw_wall_stripe(x, &ray, &hit, wall, face, frame);
            let more = ray.after_hit(deeper);
            end = Some(ColumnEnd {
                perp: hit.perp,
                wall_x: hit.wall_x,
                side: ray.side,
                base_dir: ray.base_dir(),
                map_x: ray.map_x,
                map_y: ray.map_y,
                ended_reversed: ray.ended_reversed(),
                draw_end,
            });
            if !more {
                break;
            }
        }
        end
    }

    /// Draw one face stripe. Returns whether any pixel let the ray
    /// through, and the stripe's end row.
    fn draw_wall_stripe(
        &mut self,
        x: usize,
        ray: &DdaRay,
        hit: &FaceHit,
        wall: &WallType,
        face: &WallFace,
        frame: &Frame<'_>,
    ) -> (bool, usize) {
        let world = frame.world;
        let mixer = frame.mixer;
        let atlas = &world.textures;
        let ambient = world.ambient;

        let h = self.height as i64;
        let line_h = ((h as f64 / hit.perp) as i64).abs();
        let draw_start = (-line_h / 2 + h / 2).max(0);
        let draw_end = (line_h / 2 + h / 2).min(h);
        if line_h == 0 || draw_start >= draw_end {
            return (false, draw_end.max(0) as usize);
        }

        let tex = (face.texture - 1).rem_euclid(MAX_TEXTURES as i32) as usize;
        let light = self.face_light(ray, hit.tex_x, frame);
        let (cx, cy) = ray.cell();
        let editor = pack_tile(cx, cy);
        let selected = world
            .selection
            .filter(|sel| sel.covers(cx as i32, cy as i32));

        let mut deeper = false;
        for y in draw_start as usize..draw_end as usize {
            let i = self.idx(x, y);
            if !self.z_allows(i, hit.perp) {
                continue;
            }
            let d = y as i64 * 256 - h * 128 + line_h * 128;
            let tex_y = ((d * 64 / line_h) / 256).clamp(0, 63) as usize;
            let mut color = atlas.texel(tex, hit.tex_x, tex_y);

            if color > 0 {
                if light.ambient && ambient.tints() {
                    color = mixer.mix_multiply(ambient.color, color, ambient.amount, true);
                }
                if !face.ignores_lighting() && light.level < 255 {
                    color = mixer.mix_light_level(color, light.level as u8);
                }
                if light.ambient {
                    self.stats.ambient_weight += 1;
                }

                if face.is_opaque() {
                    self.scratch.set(x, y, color);
                    self.zbuffer[i] = hit.perp;
                    self.interaction[i] = wall.hotspot as i16;
                    self.editor[i] = editor;
                } else {
                    let alpha = if face.mask == 0 {
                        face.alpha
                    } else {
                        let mask = face.mask.rem_euclid(MAX_TEXTURES as i32) as usize;
                        ((face.alpha as u16 + atlas.texel(mask, hit.tex_x, tex_y) as u16) >> 1) as u8
                    };
                    self.columns[x].push(
                        y,
                        face.blend_type,
                        LayerPixel {
                            color,
                            alpha,
                            depth: hit.perp,
                        },
                    );
                    deeper = true;
                }
            } else {
                deeper = true;
            }

            if let Some(sel) = selected {
                if on_tile_border(hit.tex_x, tex_y) {
                    self.scratch.set(x, y, sel.color);
                    self.zbuffer[i] = hit.perp;
                }
            }
        }

        if self.columns[x].end_stripe() {
            self.stats.dropped_layers += 1;
        }
        (deeper, draw_end as usize)
    }

    /// Light of the face a step looks at.
    ///
    /// A front face takes the light of the cell the ray came from and
    /// catches ambient light when that cell's ceiling is open at the texel
    /// touching the face. A back face uses its own cell the same way.
    fn face_light(&self, ray: &DdaRay, tex_x: usize, frame: &Frame<'_>) -> FaceLight {
        let world = frame.world;
        let d = ray.dir();
        let (mx, my) = (ray.map_x, ray.map_y);
        let flip = 63 - tex_x;

        // (cell, ceiling texel column, ceiling texel row)
        let lit_from = if !ray.is_reversed() {
            match ray.side {
                Axis::X if d.x > 0.0 => Some(((mx - 1, my), 63, flip)),
                Axis::X if d.x < 0.0 => Some(((mx + 1, my), 0, tex_x)),
                Axis::Y if d.y > 0.0 => Some(((mx, my - 1), tex_x, 63)),
                Axis::Y if d.y < 0.0 => Some(((mx, my + 1), flip, 0)),
                _ => None,
            }
        } else {
            match ray.side {
                Axis::X if d.x > 0.0 => Some(((mx, my), 63, flip)),
                Axis::X if d.x < 0.0 => Some(((mx, my), 63, tex_x)),
                Axis::Y if d.y > 0.0 => Some(((mx, my), flip, 0)),
                Axis::Y if d.y < 0.0 => Some(((mx, my), tex_x, 63)),
                _ => None,
            }
        };

        let Some(((lx, ly), tx, ty)) = lit_from else {
            if ray.is_reversed() {
                let (raw, ceiling) = world.map.light_ceiling_wrapped(mx, my);
                let ambient = ceiling <= 1;
                let level = cell_light(raw);
                return FaceLight {
                    level: if ambient { world.ambient.lift(level) } else { level },
                    ambient,
                };
            }
            return FaceLight {
                level: 255,
                ambient: false,
            };
        };

        let (raw, ceiling) = world.map.light_ceiling_wrapped(lx, ly);
        let mut level = cell_light(raw);
        let ambient = ceiling_open(&world.textures, ceiling, tx, ty);
        if ambient {
            level = world.ambient.lift(level);
        }
        FaceLight {
            level: level.clamp(0, 255),
            ambient,
        }
    }
}
