//! Grid walk for one screen column.
//!
//! Each cell is looked at twice: once from the front (`Forward`) and once
//! with the ray reversed (`Back`) so the far face of the cell can be
//! drawn from inside. Thin walls (ids above [`THIN_WALL_MIN`]) entered
//! right after a back-face draw are looked at from behind immediately.
//!
//! ```text
//!            miss                    hit, see-through
//!  Forward ────────► Back  ◄──────────────────────── Forward
//!     ▲               │ hit, see-through / miss
//!     └───────────────┘
//!  stop: opaque hit in either phase, or a back hit on map edge x/y == 0
//! ```

use glam::DVec2;

use crate::world::map::{MAP_HEIGHT, MAP_WIDTH, WorldMap, wrap_coord};
use crate::world::walls::{Side, THIN_WALL_MIN};

/// Upper bound on steps per column; maps without an enclosing wall
/// would otherwise bounce forever through the mirrored wrap.
pub const MAX_DDA_ITERATIONS: usize = 4 * (MAP_WIDTH + MAP_HEIGHT);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Forward,
    Back,
}

/// DDA cursor for one ray.
#[derive(Clone, Debug)]
pub struct DdaRay {
    pos: DVec2,
    dir: DVec2,
    delta: DVec2,
    side_dist: DVec2,
    step: (i32, i32),
    pub map_x: i32,
    pub map_y: i32,
    pub side: Axis,
    phase: Phase,
    /// The current step looks along `-dir`.
    reversed: bool,
    /// A back face was drawn since the last forward step.
    back_drawn: bool,
    /// The walk stopped on a back-face hit.
    ended_reversed: bool,
}

/// Where a step struck a face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceHit {
    /// Distance to the camera plane.
    pub perp: f64,
    /// Fractional position along the face, `0..1`.
    pub wall_x: f64,
    /// Texture column, mirrored so textures read left to right.
    pub tex_x: usize,
}

impl DdaRay {
    pub fn new(pos: DVec2, dir: DVec2) -> Self {
        let delta = DVec2::new(
            (1.0 + (dir.y * dir.y) / (dir.x * dir.x)).sqrt(),
            (1.0 + (dir.x * dir.x) / (dir.y * dir.y)).sqrt(),
        );
        let (map_x, map_y) = (pos.x as i32, pos.y as i32);
        let (step_x, dist_x) = if dir.x < 0.0 {
            (-1, (pos.x - map_x as f64) * delta.x)
        } else {
            (1, (map_x as f64 + 1.0 - pos.x) * delta.x)
        };
        let (step_y, dist_y) = if dir.y < 0.0 {
            (-1, (pos.y - map_y as f64) * delta.y)
        } else {
            (1, (map_y as f64 + 1.0 - pos.y) * delta.y)
        };
        Self {
            pos,
            dir,
            delta,
            side_dist: DVec2::new(dist_x, dist_y),
            step: (step_x, step_y),
            map_x,
            map_y,
            side: Axis::X,
            phase: Phase::Back,
            reversed: false,
            back_drawn: false,
            ended_reversed: false,
        }
    }

    /// Ray direction of the current step.
    #[inline(always)]
    pub fn dir(&self) -> DVec2 {
        if self.reversed { -self.dir } else { self.dir }
    }

    /// Forward ray direction, whatever the phase.
    #[inline(always)]
    pub fn base_dir(&self) -> DVec2 {
        self.dir
    }

    #[inline(always)]
    fn step(&self) -> (i32, i32) {
        if self.reversed {
            (-self.step.0, -self.step.1)
        } else {
            self.step
        }
    }

    #[inline(always)]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    #[inline(always)]
    pub fn ended_reversed(&self) -> bool {
        self.ended_reversed
    }

    /// Map coordinates wrapped onto the grid.
    #[inline(always)]
    pub fn cell(&self) -> (usize, usize) {
        (wrap_coord(self.map_x, MAP_WIDTH), wrap_coord(self.map_y, MAP_HEIGHT))
    }

    #[inline(always)]
    fn nearer_axis(&self) -> Axis {
        if self.side_dist.x < self.side_dist.y { Axis::X } else { Axis::Y }
    }

    fn turn_back(&mut self) {
        self.reversed = true;
        self.side = self.nearer_axis();
    }

    /// Move to the next step: reverse in place, or step one cell.
    pub fn advance(&mut self, map: &WorldMap) {
        match self.phase {
            Phase::Back => self.turn_back(),
            Phase::Forward => {
                if self.side_dist.x < self.side_dist.y {
                    self.side_dist.x += self.delta.x;
                    self.map_x = wrap_coord(self.map_x + self.step.0, MAP_WIDTH) as i32;
                    self.side = Axis::X;
                } else {
                    self.side_dist.y += self.delta.y;
                    self.map_y = wrap_coord(self.map_y + self.step.1, MAP_HEIGHT) as i32;
                    self.side = Axis::Y;
                }
                if self.back_drawn && map.wall_wrapped(self.map_x, self.map_y) > THIN_WALL_MIN {
                    self.phase = Phase::Back;
                    self.turn_back();
                }
                self.back_drawn = false;
            }
        }
    }

    /// Face of the current cell the current step looks at.
    pub fn face(&self) -> Side {
        let d = self.dir();
        match self.side {
            Axis::X if d.x < 0.0 => Side::South,
            Axis::Y if d.y > 0.0 => Side::West,
            Axis::Y if d.y < 0.0 => Side::East,
            _ => Side::North,
        }
    }

    /// Distance, hit position and texture column of the face in view.
    pub fn hit(&self) -> FaceHit {
        let d = self.dir();
        let (sx, sy) = self.step();
        let perp = match self.side {
            Axis::X => ((self.map_x as f64 - self.pos.x + ((1 - sx) / 2) as f64) / d.x).abs(),
            Axis::Y => ((self.map_y as f64 - self.pos.y + ((1 - sy) / 2) as f64) / d.y).abs(),
        };
        let mut wall_x = match self.side {
            Axis::X => self.pos.y + ((self.map_x as f64 - self.pos.x + ((1 - sx) / 2) as f64) / d.x) * d.y,
            Axis::Y => self.pos.x + ((self.map_y as f64 - self.pos.y + ((1 - sy) / 2) as f64) / d.y) * d.x,
        };
        wall_x -= wall_x.floor();

        let mut tex_x = ((wall_x * 64.0) as usize).min(63);
        let mirrored = match self.side {
            Axis::X => d.x > 0.0,
            Axis::Y => d.y < 0.0,
        };
        if mirrored {
            tex_x = 63 - tex_x;
        }
        FaceHit { perp, wall_x, tex_x }
    }

    /// React to a drawn face. `deeper` is true when some pixel let the
    /// ray through. Returns whether the walk continues.
    pub fn after_hit(&mut self, deeper: bool) -> bool {
        if self.reversed {
            let at_edge = self.map_x == 0
                || self.map_x == MAP_WIDTH as i32
                || self.map_y == 0
                || self.map_y == MAP_HEIGHT as i32;
            self.back_drawn = true;
            self.reversed = false;
            if at_edge || !deeper {
                self.ended_reversed = true;
                return false;
            }
            self.phase = Phase::Forward;
            true
        } else if deeper {
            self.phase = Phase::Back;
            true
        } else {
            false
        }
    }

    /// React to a step that found no face.
    pub fn after_miss(&mut self) {
        if self.reversed {
            self.reversed = false;
            self.phase = Phase::Forward;
        } else {
            self.phase = Phase::Back;
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_is_reversed_in_own_cell() {
        let map = WorldMap::default();
        let mut ray = DdaRay::new(DVec2::new(1.5, 1.5), DVec2::new(1.0, 0.0));
        ray.advance(&map);
        assert!(ray.is_reversed());
        assert_eq!((ray.map_x, ray.map_y), (1, 1));
        assert_eq!(ray.dir(), DVec2::new(-1.0, 0.0));
        // reversed X step looks at the face a -X ray hits
        assert_eq!(ray.side, Axis::X);
        assert_eq!(ray.face(), Side::South);
    }

    #[test]
    fn miss_then_step_forward() {
        let map = WorldMap::default();
        let mut ray = DdaRay::new(DVec2::new(1.5, 1.5), DVec2::new(1.0, 0.0));
        ray.advance(&map);
        ray.after_miss();
        ray.advance(&map);
        assert!(!ray.is_reversed());
        assert_eq!((ray.map_x, ray.map_y), (2, 1));
        assert_eq!(ray.face(), Side::North);
        let hit = ray.hit();
        assert!((hit.perp - 0.5).abs() < 1e-12);
        assert!((hit.wall_x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn back_hit_measures_far_side() {
        let map = WorldMap::default();
        let mut ray = DdaRay::new(DVec2::new(1.5, 1.5), DVec2::new(1.0, 0.0));
        ray.advance(&map);
        ray.after_miss();
        ray.advance(&map); // forward into (2,1)
        assert!(ray.after_hit(true));
        ray.advance(&map); // back step of (2,1)
        assert!(ray.is_reversed());
        let hit = ray.hit();
        assert!((hit.perp - 1.5).abs() < 1e-12, "{}", hit.perp);
    }

    #[test]
    fn opaque_hit_stops() {
        let map = WorldMap::default();
        let mut ray = DdaRay::new(DVec2::new(1.5, 1.5), DVec2::new(1.0, 0.0));
        ray.advance(&map);
        ray.after_miss();
        ray.advance(&map);
        assert!(!ray.after_hit(false));
        assert!(!ray.ended_reversed());
    }

    #[test]
    fn back_hit_on_edge_ends_reversed() {
        let map = WorldMap::default();
        let mut ray = DdaRay::new(DVec2::new(0.5, 3.5), DVec2::new(1.0, 0.0));
        ray.advance(&map);
        assert!(ray.is_reversed());
        assert!(!ray.after_hit(true));
        assert!(ray.ended_reversed());
        assert_eq!(ray.dir(), DVec2::new(1.0, 0.0));
    }

    #[test]
    fn negative_steps_mirror() {
        let map = WorldMap::default();
        let mut ray = DdaRay::new(DVec2::new(0.5, 0.5), DVec2::new(-1.0, 0.0));
        ray.advance(&map);
        ray.after_miss();
        ray.advance(&map);
        assert_eq!((ray.map_x, ray.map_y), (1, 0));
    }

    #[test]
    fn thin_wall_after_back_draw_is_seen_from_behind() {
        let mut map = WorldMap::default();
        map.set_wall_at(3, 1, 9);
        let mut ray = DdaRay::new(DVec2::new(1.5, 1.5), DVec2::new(1.0, 0.0));
        ray.advance(&map); // back step of (1,1)
        ray.after_miss();
        ray.advance(&map); // forward (2,1)
        assert!(ray.after_hit(true));
        ray.advance(&map); // back step of (2,1)
        assert!(ray.after_hit(true));
        ray.advance(&map); // forward into thin wall (3,1)
        assert_eq!((ray.map_x, ray.map_y), (3, 1));
        assert!(ray.is_reversed());
    }
}
