//! Per-column stacks of see-through wall pixels.
//!
//! Layers are pushed nearest first while the DDA walks deeper and are
//! composited back-to-front once the column's opaque pass is done.
//! Storage grows on first use and is reused every frame after that.

use smallvec::SmallVec;

use crate::palette::Mixer;
use crate::world::map::MAP_WIDTH;
use crate::world::walls::BlendMode;

/// Deepest stack a column can hold.
pub const MAX_LAYERS: usize = MAP_WIDTH;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayerPixel {
    /// 0 = nothing recorded at this row.
    pub color: u8,
    pub alpha: u8,
    /// Perpendicular distance of the face, 0 = unset.
    pub depth: f64,
}

/// One screen column's translucent layers.
#[derive(Clone, Debug, Default)]
pub struct TransColumn {
    height: usize,
    pixels: Vec<LayerPixel>,
    /// Raw blend type per layer.
    blends: SmallVec<[u8; 8]>,
    stripe_open: bool,
    stripe_dropped: bool,
}

impl TransColumn {
    pub fn new(height: usize) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.blends.clear();
        self.stripe_open = false;
        self.stripe_dropped = false;
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.blends.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.blends.is_empty()
    }

    #[inline(always)]
    pub fn pixel(&self, layer: usize, y: usize) -> LayerPixel {
        self.pixels[layer * self.height + y]
    }

    #[inline(always)]
    pub fn blend(&self, layer: usize) -> u8 {
        self.blends[layer]
    }

    /// Record a pixel of the face currently being drawn. The first pixel
    /// of a stripe opens a new, cleared layer; once the stack is full the
    /// stripe is dropped.
    pub fn push(&mut self, y: usize, blend: u8, px: LayerPixel) {
        if self.stripe_dropped {
            return;
        }
        if !self.stripe_open {
            if self.blends.len() == MAX_LAYERS {
                self.stripe_dropped = true;
                return;
            }
            let layer = self.blends.len();
            let end = (layer + 1) * self.height;
            if self.pixels.len() < end {
                self.pixels.resize(end, LayerPixel::default());
            }
            self.pixels[layer * self.height..end].fill(LayerPixel::default());
            self.blends.push(blend);
            self.stripe_open = true;
        }
        let layer = self.blends.len() - 1;
        self.pixels[layer * self.height + y] = px;
    }

    /// Finish the current face. Returns true if it was dropped for lack
    /// of room.
    pub fn end_stripe(&mut self) -> bool {
        let dropped = self.stripe_dropped;
        self.stripe_open = false;
        self.stripe_dropped = false;
        dropped
    }

    /// Blend every layer at row `y` over `under`, farthest first.
    pub fn composite(&self, y: usize, under: u8, mixer: &Mixer) -> u8 {
        let mut out = under;
        for layer in (0..self.len()).rev() {
            let px = self.pixel(layer, y);
            if px.color == 0 {
                continue;
            }
            out = blend_over(mixer, self.blend(layer), px.color, out, px.alpha);
        }
        out
    }

    /// Nearest layer at row `y` that sits in front of `depth`.
    ///
    /// Walks from the nearest layer past those behind `depth`, stopping at
    /// the first row without a recorded face.
    pub fn in_front_of(&self, y: usize, depth: f64) -> Option<(LayerPixel, u8)> {
        let mut i = 0;
        while i < self.len() {
            let px = self.pixel(i, y);
            if px.depth == 0.0 || px.depth <= depth {
                break;
            }
            i += 1;
        }
        if i == self.len() {
            return None;
        }
        let px = self.pixel(i, y);
        (px.depth != 0.0 && px.depth < depth && px.color > 0 && px.alpha > 0)
            .then(|| (px, self.blend(i)))
    }
}

/// Apply one stored blend type; unknown types leave `under` as is.
#[inline]
pub fn blend_over(mixer: &Mixer, blend: u8, fg: u8, under: u8, alpha: u8) -> u8 {
    match BlendMode::from_raw(blend) {
        Some(BlendMode::Alpha) => mixer.mix_alpha(fg, under, alpha, false),
        Some(BlendMode::Additive) => mixer.mix_additive(fg, under, alpha, false),
        None => under,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;
    use once_cell::sync::Lazy;

    static MIXER: Lazy<Mixer> = Lazy::new(|| Mixer::with_palette(Palette::distinct_565()));

    fn px(color: u8, alpha: u8, depth: f64) -> LayerPixel {
        LayerPixel { color, alpha, depth }
    }

    #[test]
    fn stripes_open_one_layer_each() {
        let mut col = TransColumn::new(4);
        col.push(1, 0, px(5, 128, 2.0));
        col.push(2, 0, px(6, 128, 2.0));
        assert!(!col.end_stripe());
        col.push(1, 1, px(7, 255, 3.0));
        col.end_stripe();
        assert_eq!(col.len(), 2);
        assert_eq!(col.pixel(0, 2).color, 6);
        assert_eq!(col.pixel(1, 1).color, 7);
        assert_eq!(col.pixel(1, 2).color, 0);
        assert_eq!(col.blend(1), 1);
    }

    #[test]
    fn overflow_is_dropped_and_reported() {
        let mut col = TransColumn::new(2);
        for _ in 0..MAX_LAYERS {
            col.push(0, 0, px(1, 1, 1.0));
            assert!(!col.end_stripe());
        }
        col.push(0, 0, px(1, 1, 1.0));
        assert!(col.end_stripe());
        assert_eq!(col.len(), MAX_LAYERS);
    }

    #[test]
    fn reused_slots_are_cleared() {
        let mut col = TransColumn::new(3);
        col.push(0, 0, px(9, 9, 1.0));
        col.end_stripe();
        col.clear();
        col.push(2, 0, px(4, 4, 1.0));
        col.end_stripe();
        assert_eq!(col.pixel(0, 0), LayerPixel::default());
    }

    #[test]
    fn opaque_alpha_layer_wins_composite() {
        let mut col = TransColumn::new(1);
        col.push(0, 0, px(200, 255, 1.0));
        col.end_stripe();
        assert_eq!(col.composite(0, 17, &MIXER), 200);
    }

    #[test]
    fn nearest_layer_composites_last() {
        let mut col = TransColumn::new(1);
        col.push(0, 0, px(100, 255, 1.0)); // near
        col.end_stripe();
        col.push(0, 0, px(50, 255, 2.0)); // far
        col.end_stripe();
        assert_eq!(col.composite(0, 0, &MIXER), 100);
    }

    #[test]
    fn layer_in_front_of_sprite() {
        let mut col = TransColumn::new(1);
        col.push(0, 0, px(30, 128, 2.0));
        col.end_stripe();
        assert!(col.in_front_of(0, 5.0).is_some());
        assert!(col.in_front_of(0, 1.0).is_none());
    }
}
