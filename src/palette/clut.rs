use crate::host::Bitmap;
use crate::palette::Palette;
use crate::world::ConfigError;

/// Entries in an RGB565-indexed lookup table.
pub const CLUT_SIZE: usize = 1 << 16;

/// Side of the square source image a CLUT is read from.
const CLUT_IMAGE_SIDE: usize = 256;

/// Pack 5-6-5 channels into a table key.
#[inline(always)]
pub fn key_565(r5: u8, g6: u8, b5: u8) -> u16 {
    ((r5 as u16 & 31) << 11) | ((g6 as u16 & 63) << 5) | (b5 as u16 & 31)
}

/// RGB565 key → nearest palette index.
#[derive(Clone)]
pub struct Clut {
    table: Box<[u8; CLUT_SIZE]>,
}

impl Default for Clut {
    fn default() -> Self {
        Self {
            table: Box::new([0u8; CLUT_SIZE]),
        }
    }
}

impl std::fmt::Debug for Clut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clut").finish_non_exhaustive()
    }
}

impl Clut {
    /// Copy a 256×256 8-bit image row by row: row `y`, column `x` becomes
    /// key `y * 256 + x`.
    pub fn from_bitmap(img: &Bitmap) -> Result<Self, ConfigError> {
        if img.dimensions() != (CLUT_IMAGE_SIDE, CLUT_IMAGE_SIDE) {
            return Err(ConfigError::DimensionMismatch {
                what: "CLUT image",
                expected: (CLUT_IMAGE_SIDE, CLUT_IMAGE_SIDE),
                found: img.dimensions(),
            });
        }
        let mut clut = Clut::default();
        for y in 0..CLUT_IMAGE_SIDE {
            let dst = &mut clut.table[y * CLUT_IMAGE_SIDE..(y + 1) * CLUT_IMAGE_SIDE];
            dst.copy_from_slice(img.row(y));
        }
        Ok(clut)
    }

    /// Raw 65536-byte table, e.g. a file written by `gen_clut`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != CLUT_SIZE {
            return None;
        }
        let mut clut = Clut::default();
        clut.table.copy_from_slice(bytes);
        Some(clut)
    }

    /// Nearest-colour search over every key.
    ///
    /// Distance is measured in 565 space with red and blue weighted ×4 so a
    /// 5-bit step counts the same as two 6-bit green steps. Ties keep the
    /// lowest index.
    pub fn from_palette(pal: &Palette) -> Self {
        let mut clut = Clut::default();
        let entries: Vec<(i32, i32, i32)> = pal
            .0
            .iter()
            .map(|e| ((e.r >> 1) as i32, e.g as i32, (e.b >> 1) as i32))
            .collect();

        for key in 0..CLUT_SIZE {
            let r = ((key >> 11) & 31) as i32;
            let g = ((key >> 5) & 63) as i32;
            let b = (key & 31) as i32;
            let mut best = 0usize;
            let mut best_d = i32::MAX;
            for (i, &(pr, pg, pb)) in entries.iter().enumerate() {
                let (dr, dg, db) = (r - pr, g - pg, b - pb);
                let d = 4 * dr * dr + dg * dg + 4 * db * db;
                if d < best_d {
                    best_d = d;
                    best = i;
                    if d == 0 {
                        break;
                    }
                }
            }
            clut.table[key] = best as u8;
        }
        clut
    }

    #[inline(always)]
    pub fn lookup(&self, key: u16) -> u8 {
        self.table[key as usize]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.table[..]
    }

    /// Render the table as the 256×256 image `from_bitmap` accepts.
    pub fn to_bitmap(&self) -> Bitmap {
        let mut bmp = Bitmap::new(CLUT_IMAGE_SIDE, CLUT_IMAGE_SIDE);
        bmp.pixels_mut().copy_from_slice(&self.table[..]);
        bmp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PalEntry;

    #[test]
    fn key_layout_is_565() {
        assert_eq!(key_565(31, 0, 0), 0xF800);
        assert_eq!(key_565(0, 63, 0), 0x07E0);
        assert_eq!(key_565(0, 0, 31), 0x001F);
    }

    #[test]
    fn palette_clut_maps_own_keys_back() {
        let pal = Palette::distinct_565();
        let clut = Clut::from_palette(&pal);
        for (i, e) in pal.0.iter().enumerate() {
            assert_eq!(clut.lookup(key_565(e.r >> 1, e.g, e.b >> 1)) as usize, i);
        }
    }

    #[test]
    fn nearest_prefers_closest_entry() {
        let mut pal = Palette::default();
        pal[0] = PalEntry::new(0, 0, 0);
        pal[1] = PalEntry::new(62, 62, 62);
        for i in 2..256 {
            pal[i] = PalEntry::new(0, 0, 0);
        }
        let clut = Clut::from_palette(&pal);
        assert_eq!(clut.lookup(key_565(30, 60, 30)), 1);
        assert_eq!(clut.lookup(key_565(2, 3, 1)), 0);
    }

    #[test]
    fn bitmap_round_trip_and_size_check() {
        let clut = Clut::from_palette(&Palette::distinct_565());
        let back = Clut::from_bitmap(&clut.to_bitmap()).unwrap();
        assert_eq!(back.as_bytes(), clut.as_bytes());

        let err = Clut::from_bitmap(&Bitmap::new(128, 256)).unwrap_err();
        assert!(matches!(err, ConfigError::DimensionMismatch { .. }));
        assert!(Clut::from_bytes(&[0u8; 10]).is_none());
    }
}
