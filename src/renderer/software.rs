//! ---------------------------------------------------------------------------
//! Software column raycaster
//!
//! * Draws into an 8-bit indexed scratch [`Bitmap`] the size of the target.
//! * One shared Z-buffer (perpendicular distance, 0 = unset) orders walls,
//!   floors, ceilings and sprites.
//! * Per-frame buffers are column-major (`x * height + y`) and allocated
//!   once in [`Software::new`].
//!
//! Pass order per frame: skybox, then per column walls → planes →
//! translucent composite, then all sprites back to front.
//! ---------------------------------------------------------------------------

mod dda;
mod planes;
mod skybox;
mod sprites;
mod translucent;
mod walls;

pub use dda::{Axis, DdaRay, FaceHit, MAX_DDA_ITERATIONS, Phase};
pub use skybox::draw_skybox;
pub use translucent::{LayerPixel, MAX_LAYERS, TransColumn};

use crate::host::Bitmap;
use crate::renderer::{Frame, FrameStats, Picking, RenderConfig, RenderError, Renderer};
use crate::world::map::{MAP_HEIGHT, MAP_WIDTH};
use crate::world::sprites::NUM_SPRITES;

/// Z value written where a floor row has no floor texture.
const FLOOR_VOID_Z: f64 = 9_999_999_999_999.0;
/// Z value written where a ceiling row has no ceiling texture.
const CEILING_VOID_Z: f64 = 999_999_999_999.0;

/// Nearest distance a wall face or billboard is projected at. Closer
/// hits are clamped (walls) or skipped (sprites).
pub const NEAR_CLIP: f64 = 1.0e-4;

/// Editor-map value for pixels no surface claimed this frame.
const NO_TILE: i32 = -1;

/// Texture slot and mirroring a sprite was drawn with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpritePic {
    pub texture: i32,
    pub flipped: bool,
}

pub struct Software {
    width: usize,
    height: usize,
    scratch: Bitmap,
    zbuffer: Vec<f64>,
    /// Low byte wall hotspot, high byte sprite object id.
    interaction: Vec<i16>,
    /// `(map_x << 16) | map_y` of the surface under each pixel.
    editor: Vec<i32>,
    columns: Vec<TransColumn>,
    /// `h / (2y − h)`, the floor distance of screen row `y`.
    dist_table: Vec<f64>,
    /// Cells any ray entered this frame, `x * MAP_HEIGHT + y`.
    visited: Vec<bool>,
    sprite_pics: Vec<SpritePic>,
    stats: FrameStats,
}

impl Software {
    pub fn new(cfg: RenderConfig) -> Self {
        let (w, h) = (cfg.width, cfg.height);
        let dist_table = (0..h + h / 2)
            .map(|y| h as f64 / (2.0 * y as f64 - h as f64))
            .collect();
        Self {
            width: w,
            height: h,
            scratch: Bitmap::new(w, h),
            zbuffer: vec![0.0; w * h],
            interaction: vec![0; w * h],
            editor: vec![NO_TILE; w * h],
            columns: (0..w).map(|_| TransColumn::new(h)).collect(),
            dist_table,
            visited: vec![false; MAP_WIDTH * MAP_HEIGHT],
            sprite_pics: vec![SpritePic::default(); NUM_SPRITES],
            stats: FrameStats::default(),
        }
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    fn idx(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    /// Z test shared by every pass: unset, or farther than `depth`.
    #[inline(always)]
    fn z_allows(&self, i: usize, depth: f64) -> bool {
        let z = self.zbuffer[i];
        z == 0.0 || z > depth
    }

    #[inline(always)]
    fn in_raster(&self, x: i32, y: i32) -> Option<usize> {
        ((0..self.width as i32).contains(&x) && (0..self.height as i32).contains(&y))
            .then(|| self.idx(x as usize, y as usize))
    }

    /// Map cells entered by any ray of the last frame.
    pub fn visited_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.visited
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| (i / MAP_HEIGHT, i % MAP_HEIGHT))
    }

    /// Textures rotating sprites resolved to in the last frame, by slot.
    pub fn sprite_pics(&self) -> &[SpritePic] {
        &self.sprite_pics
    }

    /// Scratch surface of the frame in progress.
    pub fn scratch(&self) -> &Bitmap {
        &self.scratch
    }

    fn column_pass(&mut self, x: usize, frame: &Frame<'_>) {
        if let Some(end) = self.cast_column(x, frame) {
            self.cast_planes(x, &end, frame);
        }
        if !self.columns[x].is_empty() {
            self.stats.translucent_columns += 1;
            for y in 0..self.height {
                let under = self.scratch.get(x, y);
                let out = self.columns[x].composite(y, under, frame.mixer);
                self.scratch.set(x, y, out);
            }
        }
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, background: &Bitmap) -> Result<(), RenderError> {
        let expected = (self.width, self.height);
        if background.dimensions() != expected {
            return Err(RenderError::DimensionMismatch {
                expected,
                found: background.dimensions(),
            });
        }
        self.scratch.blit(0, 0, background);
        self.zbuffer.fill(0.0);
        self.interaction.fill(0);
        self.editor.fill(NO_TILE);
        self.visited.fill(false);
        for col in &mut self.columns {
            col.clear();
        }
        self.stats = FrameStats::default();
        Ok(())
    }

    fn draw_world(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        let world = frame.world;
        if world.skybox > 0 {
            let sky = frame
                .host
                .sprite(world.skybox)
                .ok_or(RenderError::MissingSkybox(world.skybox))?;
            draw_skybox(&mut self.scratch, sky, world.camera.sky_heading());
        }

        self.resolve_sprite_pics(frame)?;

        for x in 0..self.width {
            self.column_pass(x, frame);
        }

        self.draw_sprites(frame)?;

        if self.stats.dropped_layers > 0 {
            log::warn!(
                "{} translucent layers dropped past the {MAX_LAYERS}-deep column limit",
                self.stats.dropped_layers
            );
        }
        Ok(())
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&Bitmap),
    {
        submit(&self.scratch);
    }

    fn stats(&self) -> FrameStats {
        self.stats
    }
}

/*──────────────────────── screen-space queries ───────────────────────*/
impl Picking for Software {
    fn tile_x_at(&self, x: i32, y: i32) -> i32 {
        match self.in_raster(x, y).map(|i| self.editor[i]) {
            Some(v) if v != NO_TILE => v >> 16,
            _ => -1,
        }
    }

    fn tile_y_at(&self, x: i32, y: i32) -> i32 {
        match self.in_raster(x, y).map(|i| self.editor[i]) {
            Some(v) if v != NO_TILE => v & 0xFFFF,
            _ => -1,
        }
    }

    fn hotspot_at(&self, x: i32, y: i32) -> i32 {
        self.in_raster(x, y)
            .map_or(-1, |i| (self.interaction[i] & 0x00FF) as i32)
    }

    fn object_at(&self, x: i32, y: i32) -> i32 {
        self.in_raster(x, y)
            .map_or(-1, |i| (self.interaction[i] >> 8) as i32)
    }

    fn distance_at(&self, x: i32, y: i32) -> f64 {
        self.in_raster(x, y).map_or(-1.0, |i| self.zbuffer[i])
    }
}

/// Pack a tile coordinate the way the editor map stores it.
#[inline(always)]
fn pack_tile(x: usize, y: usize) -> i32 {
    ((x as i32) << 16) | y as i32
}

/*──────────────────────────────── Tests ───────────────────────────────*/
