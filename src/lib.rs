//! Palette-indexed software raycaster.
//!
//! A 64×64 tile world with per-face wall types, translucent and thin
//! walls, lit floors and ceilings, raised floor blocks and billboard
//! sprites, drawn into an 8-bit host bitmap through a CLUT-based colour
//! mixer.
//!
//! ```no_run
//! use palcast_rs::host::{Bitmap, SpriteBank};
//! use palcast_rs::palette::Palette;
//! use palcast_rs::raycaster::Raycaster;
//! use palcast_rs::renderer::RenderConfig;
//!
//! let mut bank = SpriteBank::new();
//! bank.insert(1, Bitmap::new(320, 160));
//! let mut rc = Raycaster::new(RenderConfig::default(), Palette::distinct_565());
//! rc.render(&mut bank, 1).unwrap();
//! ```

pub mod host;
pub mod palette;
pub mod raycaster;
pub mod renderer;
pub mod savegame;
pub mod sim;
pub mod world;

pub use raycaster::Raycaster;
