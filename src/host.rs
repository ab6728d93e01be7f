//! Host-engine seam.
//!
//! The raycaster never owns the game's sprite memory. Everything it reads
//! (map images, texture sheets, sprite graphics, the skybox) and the surface
//! it finally writes into come through [`SpriteHost`].
//!
//! * [`Bitmap`] is the one pixel-buffer contract: 8-bit indices, row-major,
//!   `pitch` bytes per row.
//! * [`FlipQuery`] is the narrow "is this view frame mirrored?" callback.
//! * [`SpriteBank`] is a plain in-memory host used by the tools, the demo
//!   viewer and the tests.

use std::collections::{HashMap, HashSet};

/// 8-bit indexed surface, row-major, `pitch >= width`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pitch: usize,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Blank (index 0) bitmap with `pitch == width`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pitch: width,
            pixels: vec![0; width * height],
        }
    }

    /// Wrap existing row-major pixels. Returns `None` if the buffer is too
    /// short for `height` rows of `pitch` bytes.
    pub fn from_pixels(width: usize, height: usize, pitch: usize, pixels: Vec<u8>) -> Option<Self> {
        if pitch < width || pixels.len() < pitch * height {
            return None;
        }
        Some(Self {
            width,
            height,
            pitch,
            pixels,
        })
    }

    /// Fill with a single colour.
    pub fn filled(width: usize, height: usize, color: u8) -> Self {
        Self {
            width,
            height,
            pitch: width,
            pixels: vec![color; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Raw surface, `pitch * height` bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.pitch + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: u8) {
        self.pixels[y * self.pitch + x] = color;
    }

    /// Row `y` without the pitch padding.
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.pitch;
        &self.pixels[start..start + self.width]
    }

    /// Opaque blit of `src` with its top-left corner at `(x, y)`, clipped
    /// to this surface. Colour 0 is copied too (no transparency).
    pub fn blit(&mut self, x: i32, y: i32, src: &Bitmap) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + src.width as i32).min(self.width as i32);
        let y1 = (y + src.height as i32).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let span = (x1 - x0) as usize;
        for dy in y0..y1 {
            let sy = (dy - y) as usize;
            let sx = (x0 - x) as usize;
            let src_row = &src.pixels[sy * src.pitch + sx..sy * src.pitch + sx + span];
            let dst_start = dy as usize * self.pitch + x0 as usize;
            self.pixels[dst_start..dst_start + span].copy_from_slice(src_row);
        }
    }
}

/// One cel of a host animation view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewFrame {
    /// Sprite slot holding the cel's graphic.
    pub pic: i32,
}

/// What the raycaster needs from the game engine's sprite manager.
pub trait SpriteHost {
    /// Borrow the graphic stored in `slot`.
    fn sprite(&self, slot: i32) -> Option<&Bitmap>;

    /// Mutable borrow, used for the render target and texture write-back.
    fn sprite_mut(&mut self, slot: i32) -> Option<&mut Bitmap>;

    /// Resolve `(view, loop, frame)` to a cel.
    fn view_frame(&self, view: i32, loop_: i32, frame: i32) -> Option<ViewFrame>;

    /// Dirty hint after the raycaster wrote into `slot`.
    fn notify_sprite_updated(&mut self, _slot: i32) {}
}

/// Mirroring query for rotating billboard cels.
pub trait FlipQuery {
    fn is_flipped(&self, view: i32, loop_: i32, frame: i32) -> bool;
}

/// Never mirrors anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFlip;

impl FlipQuery for NoFlip {
    fn is_flipped(&self, _view: i32, _loop: i32, _frame: i32) -> bool {
        false
    }
}

/// In-memory host: sprite slots, view tables and flip flags.
///
/// * Slot numbers are caller-chosen and sparse.
/// * Every `notify_sprite_updated` is recorded so callers can tell which
///   surfaces changed since the last [`SpriteBank::take_updated`].
#[derive(Default)]
pub struct SpriteBank {
    sprites: HashMap<i32, Bitmap>,
    views: HashMap<(i32, i32, i32), ViewFrame>,
    flipped: HashSet<(i32, i32, i32)>,
    updated: Vec<i32>,
}

impl SpriteBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bmp` under `slot`, replacing any previous graphic.
    pub fn insert(&mut self, slot: i32, bmp: Bitmap) {
        self.sprites.insert(slot, bmp);
    }

    pub fn remove(&mut self, slot: i32) -> Option<Bitmap> {
        self.sprites.remove(&slot)
    }

    /// Register a view cel, optionally mirrored.
    pub fn insert_frame(&mut self, view: i32, loop_: i32, frame: i32, pic: i32, flipped: bool) {
        self.views.insert((view, loop_, frame), ViewFrame { pic });
        if flipped {
            self.flipped.insert((view, loop_, frame));
        } else {
            self.flipped.remove(&(view, loop_, frame));
        }
    }

    /// Slots notified since the previous call, in notification order.
    pub fn take_updated(&mut self) -> Vec<i32> {
        std::mem::take(&mut self.updated)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl SpriteHost for SpriteBank {
    fn sprite(&self, slot: i32) -> Option<&Bitmap> {
        self.sprites.get(&slot)
    }

    fn sprite_mut(&mut self, slot: i32) -> Option<&mut Bitmap> {
        self.sprites.get_mut(&slot)
    }

    fn view_frame(&self, view: i32, loop_: i32, frame: i32) -> Option<ViewFrame> {
        self.views.get(&(view, loop_, frame)).copied()
    }

    fn notify_sprite_updated(&mut self, slot: i32) {
        self.updated.push(slot);
    }
}

impl FlipQuery for SpriteBank {
    fn is_flipped(&self, view: i32, loop_: i32, frame: i32) -> bool {
        self.flipped.contains(&(view, loop_, frame))
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pixels_rejects_short_buffer() {
        assert!(Bitmap::from_pixels(4, 4, 4, vec![0; 15]).is_none());
        assert!(Bitmap::from_pixels(4, 4, 3, vec![0; 16]).is_none());
        let bmp = Bitmap::from_pixels(4, 2, 6, vec![7; 12]).unwrap();
        assert_eq!(bmp.row(1), &[7, 7, 7, 7]);
    }

    #[test]
    fn blit_clips_to_destination() {
        let mut dst = Bitmap::new(4, 4);
        let src = Bitmap::filled(3, 3, 9);
        dst.blit(2, -1, &src);
        // only columns 2..4, rows 0..2 receive pixels
        assert_eq!(dst.row(0), &[0, 0, 9, 9]);
        assert_eq!(dst.row(1), &[0, 0, 9, 9]);
        assert_eq!(dst.row(2), &[0, 0, 0, 0]);
    }

    #[test]
    fn blit_fully_outside_is_noop() {
        let mut dst = Bitmap::new(4, 4);
        dst.blit(10, 10, &Bitmap::filled(2, 2, 1));
        dst.blit(-2, 0, &Bitmap::filled(2, 2, 1));
        assert!(dst.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn bank_tracks_frames_and_updates() {
        let mut bank = SpriteBank::new();
        bank.insert(5, Bitmap::new(2, 2));
        bank.insert_frame(3, 1, 0, 5, true);

        assert_eq!(bank.view_frame(3, 1, 0), Some(ViewFrame { pic: 5 }));
        assert!(bank.is_flipped(3, 1, 0));
        assert!(!bank.is_flipped(3, 0, 0));

        bank.notify_sprite_updated(5);
        bank.notify_sprite_updated(5);
        assert_eq!(bank.take_updated(), vec![5, 5]);
        assert!(bank.take_updated().is_empty());
    }
}
