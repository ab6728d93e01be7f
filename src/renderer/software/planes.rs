//! Floor and ceiling casting below and above the last wall of a column,
//! plus raised floor blocks read from the height map.

use glam::DVec2;

use super::dda::Axis;
use super::walls::ColumnEnd;
use super::{CEILING_VOID_Z, FLOOR_VOID_Z, Software, pack_tile};
use crate::renderer::Frame;
use crate::world::lighting::{cell_light, on_tile_border};
use crate::world::map::{MAP_HEIGHT, MAP_WIDTH, plane_texture, wrap_coord};
use crate::world::texture::MAX_TEXTURES;

/// Plane sample of one screen row.
struct PlaneTexel {
    cell: (usize, usize),
    tx: usize,
    ty: usize,
    floor: u8,
    ceiling: u8,
    /// Height texture slot of the cell, if it is raised.
    raise: Option<usize>,
}

impl Software {
    /// Cast floor and ceiling rows of column `x` from the bottom of the
    /// last wall face down to one and a half screens.
    pub(super) fn cast_planes(&mut self, x: usize, end: &ColumnEnd, frame: &Frame<'_>) {
        if end.perp <= 0.0 {
            return;
        }
        let world = frame.world;
        let h = self.height;
        let anchor = wall_anchor(end);
        let pos = world.camera.pos;
        let wall_tile = pack_tile(
            wrap_coord(end.map_x, MAP_WIDTH),
            wrap_coord(end.map_y, MAP_HEIGHT),
        );

        let start = end.draw_end.max(h / 2 + 1);
        for y in start..h + h / 2 {
            let dist = self.dist_table[y];
            let weight = dist / end.perp;
            let cur = anchor * weight + pos * (1.0 - weight);

            if y >= h {
                // rows past the bottom edge only feed raised blocks
                let cell = (
                    (cur.x as i32).clamp(0, 63) as usize,
                    (cur.y as i32).clamp(0, 63) as usize,
                );
                if plane_texture(world.map.height[cell.0][cell.1]).is_none() {
                    continue;
                }
                let t = self.sample_plane(cell, cur, frame);
                if t.floor > 0 {
                    self.draw_raised(x, y, dist, &t, wall_tile, frame);
                }
                continue;
            }

            let cell = (
                ((cur.x as i32) % 64).max(0) as usize,
                ((cur.y as i32) % 64).max(0) as usize,
            );
            let t = self.sample_plane(cell, cur, frame);
            let tile = pack_tile(cell.0, cell.1);

            let i = self.idx(x, y);
            if t.floor > 0 && self.z_allows(i, dist) && !self.draw_raised(x, y, dist, &t, tile, frame) {
                continue;
            }

            if t.floor > 0 && self.z_allows(i, dist) {
                self.scratch.set(x, y, t.floor);
                self.zbuffer[i] = dist;
                self.editor[i] = tile;
            } else {
                self.zbuffer[i] = FLOOR_VOID_Z;
            }

            let cy = h - y;
            let ci = self.idx(x, cy);
            if self.z_allows(ci, dist) {
                if t.ceiling > 0 {
                    self.scratch.set(x, cy, t.ceiling);
                    self.zbuffer[ci] = dist;
                } else {
                    self.zbuffer[ci] = CEILING_VOID_Z;
                }
                self.editor[ci] = tile;
            }
            self.interaction[i] = 0;
            self.interaction[ci] = 0;

            if let Some(sel) = world.selection {
                if sel.covers(t.cell.0 as i32, t.cell.1 as i32) && on_tile_border(t.tx, t.ty) {
                    self.scratch.set(x, y, sel.color);
                    self.scratch.set(x, cy, sel.color);
                    self.zbuffer[i] = end.perp;
                    self.zbuffer[ci] = end.perp;
                }
            }
        }
    }

    /// Lit floor and ceiling colours of `cell` at world point `cur`.
    fn sample_plane(&mut self, cell: (usize, usize), cur: DVec2, frame: &Frame<'_>) -> PlaneTexel {
        let world = frame.world;
        let map = &world.map;
        let atlas = &world.textures;
        let (cx, cy) = cell;

        let tx = ((cur.x * 64.0) as i32).rem_euclid(64) as usize;
        let ty = ((cur.y * 64.0) as i32).rem_euclid(64) as usize;
        let mut light = cell_light(map.light[cx][cy]);

        let sample = |v: i32| plane_texture(v).map_or(0, |t| atlas.texel(t % MAX_TEXTURES, tx, ty));
        let mut floor = sample(map.floor[cx][cy]);
        let mut ceiling = sample(map.ceiling[cx][cy]);

        if ceiling == 0 {
            light = world.ambient.lift(light);
            self.stats.ambient_weight += 1;
        }
        if light < 255 {
            let level = light.clamp(0, 255) as u8;
            if floor != 0 {
                floor = frame.mixer.mix_light_level(floor, level);
            }
            if ceiling != 0 {
                ceiling = frame.mixer.mix_light_level(ceiling, level);
            }
        }

        PlaneTexel {
            cell,
            tx,
            ty,
            floor,
            ceiling,
            raise: plane_texture(map.height[cx][cy]).map(|t| t % MAX_TEXTURES),
        }
    }

    /// Extend the floor texel at row `y` upward by the height texel
    /// scaled with distance. Returns false when the block top is below
    /// the screen and the row should be skipped. Flat cells are a no-op.
    fn draw_raised(&mut self, x: usize, y: usize, dist: f64, t: &PlaneTexel, tile: i32, frame: &Frame<'_>) -> bool {
        let Some(raise) = t.raise else {
            return true;
        };
        let h = self.height as i64;
        let lift = frame.world.textures.texel(raise, t.tx, t.ty) as f64 / dist;
        let top = y as i64 - lift as i64;
        if top > h - 1 {
            return false;
        }
        let bottom = (y as i64).min(h);
        for ny in top.max(0)..bottom {
            let i = self.idx(x, ny as usize);
            if self.z_allows(i, dist) {
                self.scratch.set(x, ny as usize, t.floor);
                self.zbuffer[i] = dist;
                self.interaction[i] = 0;
                self.editor[i] = tile;
            }
        }
        true
    }
}

/// World point where the last face meets the floor, pulled back one cell
/// when the walk stopped on a back face.
fn wall_anchor(end: &ColumnEnd) -> DVec2 {
    let (mx, my) = (end.map_x as f64, end.map_y as f64);
    let d = end.base_dir;
    let back = if end.ended_reversed { 1.0 } else { 0.0 };
    match end.side {
        Axis::X if d.x > 0.0 => DVec2::new(mx + back, my + end.wall_x),
        Axis::X if d.x < 0.0 => DVec2::new(mx + 1.0 - back, my + end.wall_x),
        Axis::Y if d.y > 0.0 => DVec2::new(mx + end.wall_x, my + back),
        _ => DVec2::new(mx + end.wall_x, my + 1.0 - back),
    }
}
