//! Blend two palette indices through the CLUT.
//!
//! Every routine splits colours into 5-6-5 channels, combines them in
//! fixed point and maps the packed key back to a palette index, which is
//! then passed through the cycle remap table.

use crate::palette::{Clut, PalEntry, Palette, key_565};

/// Palette-slot indirection used for colour cycling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemapTable(pub [u8; 256]);

impl Default for RemapTable {
    fn default() -> Self {
        let mut t = [0u8; 256];
        for (i, slot) in t.iter_mut().enumerate() {
            *slot = i as u8;
        }
        RemapTable(t)
    }
}

impl RemapTable {
    #[inline(always)]
    pub fn get(&self, slot: u8) -> u8 {
        self.0[slot as usize]
    }

    pub fn reset(&mut self) {
        *self = RemapTable::default();
    }

    /// Rotate the range `start..=end` one step.
    ///
    /// `end > start` rotates left (each slot takes its right neighbour),
    /// `end < start` rotates right, equal bounds do nothing.
    pub fn cycle(&mut self, start: u8, end: u8) {
        let (s, e) = (start as usize, end as usize);
        if e > s {
            self.0[s..=e].rotate_left(1);
        } else if e < s {
            self.0[e..=s].rotate_right(1);
        }
    }
}

/// Palette state the blend routines read.
#[derive(Clone, Debug, Default)]
pub struct Mixer {
    /// Palette the host is currently displaying.
    pub palette: Palette,
    /// Separately tracked copy for overlays/tinting.
    pub objective: Palette,
    pub clut: Clut,
    pub remap: RemapTable,
    /// Slot the CLUT was loaded from; 0 when built from a palette.
    pub clut_slot: i32,
}

/// Per-channel fixed-point rounding shared by alpha and light mixing.
#[inline(always)]
fn round8(v: i32) -> i32 {
    (v + 1 + (v >> 8)) >> 8
}

impl Mixer {
    /// Mixer whose CLUT is derived from `palette` by nearest-colour search
    /// and whose objective palette starts as a copy of it.
    pub fn with_palette(palette: Palette) -> Self {
        let clut = Clut::from_palette(&palette);
        Self {
            objective: palette.clone(),
            palette,
            clut,
            remap: RemapTable::default(),
            clut_slot: 0,
        }
    }

    #[inline(always)]
    fn entries(&self, fg: u8, bg: u8, use_objective: bool) -> (PalEntry, PalEntry) {
        let pal = if use_objective {
            &self.objective
        } else {
            &self.palette
        };
        (pal[self.remap.get(fg) as usize], pal[bg as usize])
    }

    #[inline(always)]
    fn resolve(&self, r5: i32, g6: i32, b5: i32) -> u8 {
        let key = key_565(r5 as u8, g6 as u8, b5 as u8);
        self.remap.get(self.clut.lookup(key))
    }

    /// `fg·α + bg·(255−α)`, α = 255 is pure foreground.
    pub fn mix_alpha(&self, fg: u8, bg: u8, alpha: u8, use_objective: bool) -> u8 {
        let (f, b) = self.entries(fg, bg, use_objective);
        let a = alpha as i32;
        let ia = 255 - a;
        let r = round8((f.r >> 1) as i32 * a + (b.r >> 1) as i32 * ia);
        let g = round8(f.g as i32 * a + b.g as i32 * ia);
        let bl = round8((f.b >> 1) as i32 * a + (b.b >> 1) as i32 * ia);
        self.resolve(r, g, bl)
    }

    /// `bg + fg·α/256`, saturating per channel.
    pub fn mix_additive(&self, fg: u8, bg: u8, alpha: u8, use_objective: bool) -> u8 {
        let (f, b) = self.entries(fg, bg, use_objective);
        let a = alpha as i32;
        let r = ((b.r >> 1) as i32 + (((f.r >> 1) as i32 * a) >> 8)).min(31);
        let g = (b.g as i32 + ((f.g as i32 * a) >> 8)).min(63);
        let bl = ((b.b >> 1) as i32 + (((f.b >> 1) as i32 * a) >> 8)).min(31);
        self.resolve(r, g, bl)
    }

    /// Darken `fg` to `intensity / 256` of its brightness.
    pub fn mix_light_level(&self, fg: u8, intensity: u8) -> u8 {
        let f = self.palette[self.remap.get(fg) as usize];
        let k = intensity as i32;
        let r = round8((f.r >> 1) as i32 * k);
        let g = round8(f.g as i32 * k);
        let b = round8((f.b >> 1) as i32 * k);
        self.resolve(r, g, b)
    }

    /// Tint: interpolate from `bg` towards `fg·bg/64` by `α/4` out of 63.
    pub fn mix_multiply(&self, fg: u8, bg: u8, alpha: u8, use_objective: bool) -> u8 {
        let (f, b) = self.entries(fg, bg, use_objective);
        let w = (alpha >> 2) as i32;
        let chan = |fc: u8, bc: u8| {
            let (fc, bc) = (fc as i32, bc as i32);
            let product = fc * bc / 64;
            (bc * (63 - w) + product * w) / 63
        };
        let r = chan(f.r, b.r) >> 1;
        let g = chan(f.g, b.g);
        let bl = chan(f.b, b.b) >> 1;
        self.resolve(r, g, bl)
    }

    /// Palette index nearest to the packed 5-6-5 colour.
    pub fn color_565(&self, r5: u8, g6: u8, b5: u8) -> u8 {
        self.resolve(r5 as i32, g6 as i32, b5 as i32)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
