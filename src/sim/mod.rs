//! Player movement: collision-aware stepping and fixed-angle rotation.
//!
//! Everything here runs between frames, driven by script calls or the
//! viewer's key handler; the renderer only reads the resulting camera.

mod collision;

pub use collision::{Movement, move_backward, move_forward, rotate_left, rotate_right};

/// Default step, in tiles per call.
pub const DEFAULT_MOVE_SPEED: f64 = 3.0 / 60.0;
/// Default turn, in radians per call.
pub const DEFAULT_ROT_SPEED: f64 = 2.0 / 60.0;

/// Persistent movement parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveSettings {
    pub move_speed: f64,
    pub rot_speed: f64,
    /// Skip wall solidity; only the map bounds still stop the player.
    pub noclip: bool,
}

impl Default for MoveSettings {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVE_SPEED,
            rot_speed: DEFAULT_ROT_SPEED,
            noclip: false,
        }
    }
}
