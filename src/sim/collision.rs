//! Grid collision for the player camera.
//!
//! * A move is tested per axis so the player slides along walls.
//! * Each axis checks two faces: the face of the destination cell that
//!   looks back at us, and the face of our own cell we are leaving through.
//! * A move that stays inside the current cell is never blocked.

use crate::sim::MoveSettings;
use crate::world::{
    Camera, WallTable,
    map::{MAP_HEIGHT, MAP_WIDTH, WorldMap},
    walls::Side,
};

/// Look-ahead added in the direction of travel before the solidity test.
const LOOKAHEAD: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
}

impl Movement {
    #[inline(always)]
    fn sign(self) -> f64 {
        match self {
            Movement::Forward => 1.0,
            Movement::Backward => -1.0,
        }
    }
}

/// `(destination face, own face)` for travel along one axis.
fn faces(travel: f64, positive: Side, negative: Side) -> (Side, Side) {
    if travel > 0.0 {
        (positive, negative)
    } else if travel < 0.0 {
        (negative, positive)
    } else {
        (Side::North, Side::North)
    }
}

/// Face `side` of the wall type at `(x, y)`; off-map cells never block.
fn blocks(map: &WorldMap, walls: &WallTable, x: i32, y: i32, side: Side) -> bool {
    match map.wall_at(x, y) {
        id if id < 0 => false,
        id => walls.get(id as u8).face(side).is_solid(),
    }
}

#[inline(always)]
fn in_range(v: i32, size: usize) -> bool {
    (0..size as i32).contains(&v)
}

/// Step the camera by `move_speed` along its direction.
pub fn step(cam: &mut Camera, map: &WorldMap, walls: &WallTable, cfg: &MoveSettings, how: Movement) {
    let s = how.sign();
    let delta = cam.dir * (s * cfg.move_speed);
    let lead = |d: f64| if d > 0.0 { LOOKAHEAD * s } else { -LOOKAHEAD * s };
    let ahead_x = cam.pos.x + delta.x + lead(cam.dir.x);
    let ahead_y = cam.pos.y + delta.y + lead(cam.dir.y);

    let (nx, ny) = (ahead_x as i32, ahead_y as i32);
    let inside = nx == cam.pos.x as i32 && ny == cam.pos.y as i32;

    if cfg.noclip {
        if in_range(nx, MAP_WIDTH) {
            cam.pos.x += delta.x;
        }
        if in_range(ny, MAP_HEIGHT) {
            cam.pos.y += delta.y;
        }
        return;
    }
    if inside {
        cam.pos += delta;
        return;
    }

    let (dest_x, own_x) = faces(delta.x, Side::North, Side::South);
    let (cx, cy) = (cam.pos.x as i32, cam.pos.y as i32);
    if in_range(nx, MAP_WIDTH)
        && !blocks(map, walls, nx, cy, dest_x)
        && !blocks(map, walls, cx, cy, own_x)
    {
        cam.pos.x += delta.x;
    }

    // the Y test reads the cell we may just have slid into
    let (dest_y, own_y) = faces(delta.y, Side::West, Side::East);
    let (cx, cy) = (cam.pos.x as i32, cam.pos.y as i32);
    if in_range(ny, MAP_HEIGHT)
        && !blocks(map, walls, cx, ny, dest_y)
        && !blocks(map, walls, cx, cy, own_y)
    {
        cam.pos.y += delta.y;
    }
}

pub fn move_forward(cam: &mut Camera, map: &WorldMap, walls: &WallTable, cfg: &MoveSettings) {
    step(cam, map, walls, cfg, Movement::Forward);
}

pub fn move_backward(cam: &mut Camera, map: &WorldMap, walls: &WallTable, cfg: &MoveSettings) {
    step(cam, map, walls, cfg, Movement::Backward);
}

pub fn rotate_left(cam: &mut Camera, cfg: &MoveSettings) {
    cam.rotate(cfg.rot_speed);
}

pub fn rotate_right(cam: &mut Camera, cfg: &MoveSettings) {
    cam.rotate(-cfg.rot_speed);
}

/*──────────────────────────────── Tests ───────────────────────────────*/
