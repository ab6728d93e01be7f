//! Billboard sprite slots.

use crate::world::ConfigError;

pub const NUM_SPRITES: usize = 256;

/// A camera-facing billboard at a map position.
///
/// `texture` is a host sprite slot, not an atlas slot. When `view` is
/// non-zero the renderer replaces `texture` every frame with the cel of the
/// loop facing the camera.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sprite {
    pub x: f64,
    pub y: f64,
    pub texture: i32,
    pub alpha: u8,
    /// 0 alpha, 1 additive; anything else draws unblended.
    pub blend_mode: i32,
    /// Added to the native width/64 ratio.
    pub u_div_w: f64,
    /// Added to the native height/64 ratio.
    pub u_div_h: f64,
    pub v_move: f64,
    pub h_move: f64,
    /// Reported in the high byte of the interaction map.
    pub object_interact: i8,
    pub view: i32,
    pub frame: i32,
    /// Extra facing rotation in degrees, kept in `(-360, 360)`.
    pub angle: i32,
}

impl Sprite {
    /// Slots with neither a graphic nor a view are skipped by the caster.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.texture != 0 || self.view != 0
    }
}

/// Map the sprite-to-camera heading (degrees, `0..360`) onto one of the
/// eight view loops a rotating billboard is authored with.
pub fn facing_loop(deg: i32) -> i32 {
    match deg {
        d if !(23..=336).contains(&d) => 0,
        23..=67 => 6,
        68..=112 => 1,
        113..=157 => 7,
        158..=202 => 3,
        203..=247 => 5,
        248..=292 => 2,
        _ => 4,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpriteTable(pub Vec<Sprite>);

impl Default for SpriteTable {
    fn default() -> Self {
        SpriteTable(vec![Sprite::default(); NUM_SPRITES])
    }
}

impl SpriteTable {
    pub fn get(&self, id: i32) -> Result<&Sprite, ConfigError> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.0.get(i))
            .ok_or(ConfigError::SpriteOutOfRange(id))
    }

    pub fn get_mut(&mut self, id: i32) -> Result<&mut Sprite, ConfigError> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.0.get_mut(i))
            .ok_or(ConfigError::SpriteOutOfRange(id))
    }

    /// Set the commonly scripted fields in one go.
    #[allow(clippy::too_many_arguments)]
    pub fn init_sprite(
        &mut self,
        id: i32,
        x: f64,
        y: f64,
        slot: i32,
        alpha: u8,
        blend_mode: i32,
        scale_x: f64,
        scale_y: f64,
        v_move: f64,
    ) -> Result<(), ConfigError> {
        let s = self.get_mut(id)?;
        s.x = x;
        s.y = y;
        s.texture = slot;
        s.alpha = alpha;
        s.blend_mode = blend_mode;
        s.u_div_w = scale_x;
        s.u_div_h = scale_y;
        s.v_move = v_move;
        Ok(())
    }

    pub fn set_position(&mut self, id: i32, x: f64, y: f64) -> Result<(), ConfigError> {
        let s = self.get_mut(id)?;
        s.x = x;
        s.y = y;
        Ok(())
    }

    pub fn set_alpha(&mut self, id: i32, alpha: i32) -> Result<(), ConfigError> {
        self.get_mut(id)?.alpha = alpha.clamp(0, 255) as u8;
        Ok(())
    }

    /// Angles are reduced with a truncating remainder, so `-370` keeps its sign.
    pub fn set_angle(&mut self, id: i32, angle: i32) -> Result<(), ConfigError> {
        self.get_mut(id)?.angle = angle % 360;
        Ok(())
    }

    pub fn set_interact_obj(&mut self, id: i32, obj: i32) -> Result<(), ConfigError> {
        self.get_mut(id)?.object_interact = obj.clamp(i8::MIN as i32, i8::MAX as i32) as i8;
        Ok(())
    }
}

/// In-place comb sort of `order` by `dist`, farthest first.
///
/// Shrink factor 1.3 with the "rule of 11" gap fix-up. Ties keep no
/// particular order.
pub fn comb_sort_far_first(order: &mut [usize], dist: &mut [f64]) {
    let n = order.len().min(dist.len());
    let mut gap = n;
    let mut swapped = false;
    while gap > 1 || swapped {
        gap = gap * 10 / 13;
        if gap == 9 || gap == 10 {
            gap = 11;
        }
        gap = gap.max(1);
        swapped = false;
        for i in 0..n.saturating_sub(gap) {
            let j = i + gap;
            if dist[i] < dist[j] {
                dist.swap(i, j);
                order.swap(i, j);
                swapped = true;
            }
        }
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_loops_cover_every_degree() {
        let expect = [
            (0, 0),
            (22, 0),
            (23, 6),
            (67, 6),
            (68, 1),
            (112, 1),
            (113, 7),
            (158, 3),
            (203, 5),
            (248, 2),
            (293, 4),
            (336, 4),
            (337, 0),
            (359, 0),
        ];
        for (deg, lp) in expect {
            assert_eq!(facing_loop(deg), lp, "deg {deg}");
        }
    }

    #[test]
    fn comb_sort_orders_far_to_near() {
        let mut dist = vec![4.0, 100.0, 0.5, 25.0, 9.0, 64.0, 1.0, 49.0, 16.0, 36.0, 81.0, 2.0];
        let mut order: Vec<usize> = (0..dist.len()).collect();
        let original = dist.clone();
        comb_sort_far_first(&mut order, &mut dist);
        assert!(dist.windows(2).all(|w| w[0] >= w[1]));
        for (i, &o) in order.iter().enumerate() {
            assert_eq!(original[o], dist[i]);
        }
    }

    #[test]
    fn setters_clamp_and_check_range() {
        let mut t = SpriteTable::default();
        t.set_alpha(3, 400).unwrap();
        assert_eq!(t.get(3).unwrap().alpha, 255);
        t.set_angle(3, 725).unwrap();
        assert_eq!(t.get(3).unwrap().angle, 5);
        t.set_angle(3, -370).unwrap();
        assert_eq!(t.get(3).unwrap().angle, -10);
        t.set_interact_obj(3, 300).unwrap();
        assert_eq!(t.get(3).unwrap().object_interact, 127);

        assert_eq!(t.get(256).unwrap_err(), ConfigError::SpriteOutOfRange(256));
        assert_eq!(t.set_position(-1, 0.0, 0.0).unwrap_err(), ConfigError::SpriteOutOfRange(-1));
    }

    #[test]
    fn init_sprite_sets_all_fields() {
        let mut t = SpriteTable::default();
        t.init_sprite(7, 2.5, 3.5, 40, 200, 1, 0.5, -0.25, 12.0).unwrap();
        let s = t.get(7).unwrap();
        assert_eq!((s.x, s.y, s.texture, s.alpha, s.blend_mode), (2.5, 3.5, 40, 200, 1));
        assert_eq!((s.u_div_w, s.u_div_h, s.v_move), (0.5, -0.25, 12.0));
        assert!(s.is_active());
        assert!(!t.get(8).unwrap().is_active());
    }
}
