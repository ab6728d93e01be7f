use crate::host::Bitmap;

/// Pixels of scroll per radian of heading.
const SKY_SCROLL: f64 = 320.0;

/// Paint the sky panorama scrolled by the camera heading.
///
/// The panorama is drawn one row down and repeated once to the left so
/// the seam never shows on a 320-wide raster.
pub fn draw_skybox(dst: &mut Bitmap, sky: &Bitmap, heading: f64) {
    let w = dst.width().max(1) as i32;
    let x_off = ((heading * SKY_SCROLL) as i32 % w).abs();
    if x_off > 0 {
        dst.blit(x_off - SKY_SCROLL as i32, 1, sky);
    }
    dst.blit(x_off, 1, sky);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sky_wraps_around_the_offset() {
        let mut dst = Bitmap::new(320, 160);
        let mut sky = Bitmap::new(320, 50);
        for x in 0..320 {
            for y in 0..50 {
                sky.set(x, y, (x % 200) as u8 + 1);
            }
        }
        // heading 0.5 rad → offset 160
        draw_skybox(&mut dst, &sky, 0.5);
        assert_eq!(dst.get(160, 1), 1);
        assert_eq!(dst.get(0, 1), sky.get(160, 0));
        assert_eq!(dst.get(5, 0), 0);
        assert_eq!(dst.get(5, 51), 0);
    }
}
