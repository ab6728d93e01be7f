//! Rendering abstraction layer.
//!
//! The façade never touches per-frame buffers directly. It hands a
//! [`Frame`] (world, palette, host) to a type implementing [`Renderer`],
//! which draws into its own scratch surface; the finished surface is then
//! loaned back through `end_frame`.
//!
//! * A failed `draw_world` leaves the caller's target untouched because
//!   nothing is submitted.
//! * Screen-space queries (tile, hotspot, object, distance) read the
//!   buffers of the last frame through [`Picking`].

use crate::host::{Bitmap, FlipQuery, SpriteHost};
use crate::palette::Mixer;
use crate::world::RaycastWorld;

pub mod software;

/// Raster most map and sky assets are authored for.
pub const DEFAULT_WIDTH: usize = 320;
pub const DEFAULT_HEIGHT: usize = 160;

/// Fixed output size; all per-frame buffers are sized from it once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Why a frame could not be drawn.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("render target slot {0} has no sprite")]
    MissingTargetSprite(i32),

    #[error("skybox slot {0} has no sprite")]
    MissingSkybox(i32),

    #[error("render target is {found:?}, renderer is configured for {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("view {view} loop {loop_} frame {frame} does not exist")]
    MissingViewFrame { view: i32, loop_: i32, frame: i32 },

    #[error("sprite graphic in slot {0} is missing")]
    MissingSpriteGraphic(i32),
}

/// Counters collected while drawing the last frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Pixels lit by ambient leak (walls) or under an open ceiling
    /// (floor rows).
    pub ambient_weight: u32,
    /// Columns that carried at least one translucent layer.
    pub translucent_columns: u32,
    /// Translucent layers discarded for exceeding the per-column depth.
    pub dropped_layers: u32,
    /// Billboards that reached the projection stage.
    pub sprites_drawn: u32,
}

/// Everything a renderer reads for one frame.
pub struct Frame<'a> {
    pub world: &'a RaycastWorld,
    pub mixer: &'a Mixer,
    pub host: &'a dyn SpriteHost,
    pub flip: &'a dyn FlipQuery,
}

/// A renderer that owns an internal scratch surface for the whole frame.
pub trait Renderer {
    /// Start from a copy of `background` (the target's current contents)
    /// and clear the per-frame buffers.
    fn begin_frame(&mut self, background: &Bitmap) -> Result<(), RenderError>;

    /// Draw skybox, walls, planes, translucent layers and sprites.
    fn draw_world(&mut self, frame: &Frame<'_>) -> Result<(), RenderError>;

    /// Loan the finished surface to `submit`, exactly once.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&Bitmap);

    fn stats(&self) -> FrameStats;
}

/// Screen-space read-back of the last frame. Every query returns `-1`
/// (or `-1.0`) for coordinates outside the raster.
pub trait Picking {
    /// Map X of the surface under the pixel.
    fn tile_x_at(&self, x: i32, y: i32) -> i32;
    /// Map Y of the surface under the pixel.
    fn tile_y_at(&self, x: i32, y: i32) -> i32;
    /// Wall hotspot id (low byte of the interaction map).
    fn hotspot_at(&self, x: i32, y: i32) -> i32;
    /// Sprite object id (high byte of the interaction map).
    fn object_at(&self, x: i32, y: i32) -> i32;
    /// Depth stored in the Z-buffer, 0 where nothing was drawn.
    fn distance_at(&self, x: i32, y: i32) -> f64;
}
