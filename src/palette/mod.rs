//! 8-bit palette colour space.
//!
//! Channels are stored the VGA way, 0‥63 each. The blend routines fold
//! them into an RGB565-shaped key (red/blue halved to 5 bits, green kept at
//! 6) and look the result up in a [`Clut`].

mod clut;
mod mix;

pub use clut::{CLUT_SIZE, Clut, key_565};
pub use mix::{Mixer, RemapTable};

use std::ops::{Index, IndexMut};

/// One palette slot, 6 bits per channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PalEntry {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PalEntry {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Expand to 0x00RRGGBB for display back-ends.
    #[inline]
    pub fn to_rgb888(self) -> u32 {
        let up = |c: u8| {
            let c = (c & 63) as u32;
            (c << 2) | (c >> 4)
        };
        (up(self.r) << 16) | (up(self.g) << 8) | up(self.b)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette(pub [PalEntry; 256]);

impl Default for Palette {
    fn default() -> Self {
        Palette([PalEntry::default(); 256])
    }
}

impl Index<usize> for Palette {
    type Output = PalEntry;
    fn index(&self, idx: usize) -> &PalEntry {
        &self.0[idx]
    }
}

impl IndexMut<usize> for Palette {
    fn index_mut(&mut self, idx: usize) -> &mut PalEntry {
        &mut self.0[idx]
    }
}

impl Palette {
    /// Parse 768 bytes of packed RGB. `eight_bit` selects 0‥255 input
    /// channels (shifted down to 6 bits); otherwise values are masked to 6
    /// bits as-is.
    pub fn from_rgb_bytes(bytes: &[u8], eight_bit: bool) -> Option<Self> {
        if bytes.len() < 768 {
            return None;
        }
        let mut pal = Palette::default();
        for (i, rgb) in bytes[..768].chunks_exact(3).enumerate() {
            let conv = |c: u8| if eight_bit { c >> 2 } else { c & 63 };
            pal[i] = PalEntry::new(conv(rgb[0]), conv(rgb[1]), conv(rgb[2]));
        }
        Some(pal)
    }

    /// 256 entries whose RGB565 keys are pairwise distinct: 8 red × 8
    /// green × 4 blue steps. Handy for demos and exact-match tests.
    pub fn distinct_565() -> Self {
        let mut pal = Palette::default();
        for i in 0..256usize {
            let r = ((i >> 5) & 7) as u8 * 9;
            let g = ((i >> 2) & 7) as u8 * 9;
            let b = (i & 3) as u8 * 21;
            pal[i] = PalEntry::new(r, g, b);
        }
        pal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn distinct_palette_has_unique_keys() {
        let pal = Palette::distinct_565();
        let keys: HashSet<u16> = pal.0.iter().map(|e| key_565(e.r >> 1, e.g, e.b >> 1)).collect();
        assert_eq!(keys.len(), 256);
    }

    #[test]
    fn rgb_bytes_conversion() {
        let mut raw = vec![0u8; 768];
        raw[3] = 255;
        raw[4] = 128;
        raw[5] = 4;
        let eight = Palette::from_rgb_bytes(&raw, true).unwrap();
        assert_eq!(eight[1], PalEntry::new(63, 32, 1));
        let six = Palette::from_rgb_bytes(&raw, false).unwrap();
        assert_eq!(six[1], PalEntry::new(63, 0, 4));
        assert!(Palette::from_rgb_bytes(&raw[..700], false).is_none());
    }

    #[test]
    fn rgb888_expansion_hits_extremes() {
        assert_eq!(PalEntry::new(63, 63, 63).to_rgb888(), 0x00FF_FFFF);
        assert_eq!(PalEntry::new(0, 0, 0).to_rgb888(), 0);
    }
}
