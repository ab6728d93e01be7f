//! Raycaster demo viewer over a procedurally built level.
//!
//! ```bash
//! RUST_LOG=debug cargo run --release -- --scale 3
//! ```
//!
//! Arrows or WASD move and turn, `N` toggles noclip, Esc quits.

use clap::Parser;
use log::{debug, info};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::time::{Duration, Instant};

use palcast_rs::{
    Raycaster,
    host::{Bitmap, SpriteBank, SpriteHost},
    palette::Palette,
    renderer::{DEFAULT_HEIGHT, DEFAULT_WIDTH, RenderConfig},
    world::{TEX_HEIGHT, TEX_WIDTH},
};

const SCREEN_SLOT: i32 = 1;
const SHEET_SLOT: i32 = 2;
const SKY_SLOT: i32 = 3;
const LAMP_SLOT: i32 = 4;

const LEVEL: usize = 24;
const TILES: usize = 16;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Integer window scale
    #[arg(long, default_value_t = 3)]
    scale: usize,

    /// Frame rate cap
    #[arg(long, default_value_t = 35)]
    fps: usize,

    /// Start with wall collision off
    #[arg(long)]
    noclip: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();
    let scale = opts.scale.max(1);
    let (w, h) = (DEFAULT_WIDTH, DEFAULT_HEIGHT);

    let palette = Palette::distinct_565();
    let lut: Vec<u32> = palette.0.iter().map(|e| e.to_rgb888()).collect();

    let mut bank = SpriteBank::new();
    bank.insert(SCREEN_SLOT, Bitmap::new(w, h));
    bank.insert(SHEET_SLOT, texture_sheet());
    bank.insert(SKY_SLOT, sky_panorama());
    bank.insert(LAMP_SLOT, lamp_sprite());

    let mut rc = Raycaster::new(RenderConfig::default(), palette);
    rc.make_textures(&bank, SHEET_SLOT)?;
    rc.set_skybox(&bank, SKY_SLOT)?;
    build_level(&mut rc)?;
    rc.set_noclip(opts.noclip);
    info!("level ready, {} sprite slots in the bank", bank.len());

    let mut win = Window::new("palcast", w * scale, h * scale, WindowOptions::default())?;
    win.set_target_fps(opts.fps);
    let mut screen = vec![0u32; w * scale * h * scale];

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
            rc.move_forward();
        }
        if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
            rc.move_backward();
        }
        if win.is_key_down(Key::Left) || win.is_key_down(Key::A) {
            rc.rotate_left();
        }
        if win.is_key_down(Key::Right) || win.is_key_down(Key::D) {
            rc.rotate_right();
        }
        if win.is_key_pressed(Key::N, KeyRepeat::No) {
            rc.set_noclip(!rc.noclip());
            info!("noclip {}", rc.noclip());
        }

        let t0 = Instant::now();
        let stats = rc.render(&mut bank, SCREEN_SLOT)?;
        acc_time += t0.elapsed();
        acc_frames += 1;

        if let Some(frame) = bank.sprite(SCREEN_SLOT) {
            upscale(frame, &lut, scale, &mut screen);
        }
        win.update_with_buffer(&screen, w * scale, h * scale)?;

        if last_print.elapsed() >= Duration::from_secs(1) {
            let avg = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            debug!(
                "{avg:.2} ms/frame over {acc_frames} frames, angle {}°, {:?}",
                rc.camera_angle(),
                stats
            );
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}

/// Nearest-neighbour expand of the indexed frame into 0RGB pixels.
fn upscale(frame: &Bitmap, lut: &[u32], scale: usize, out: &mut [u32]) {
    let ow = frame.width() * scale;
    for y in 0..frame.height() * scale {
        let row = frame.row(y / scale);
        let dst = &mut out[y * ow..(y + 1) * ow];
        for (x, px) in dst.iter_mut().enumerate() {
            *px = lut[row[x / scale] as usize];
        }
    }
}

/*──────────────────────────── procedural assets ───────────────────────*/

/// Palette index from 3-bit red/green and 2-bit blue steps of
/// [`Palette::distinct_565`].
fn rgb(r: usize, g: usize, b: usize) -> u8 {
    (((r & 7) << 5) | ((g & 7) << 2) | (b & 3)) as u8
}

fn texture_sheet() -> Bitmap {
    let mut sheet = Bitmap::new(TILES * TEX_WIDTH, TEX_HEIGHT);
    for t in 0..TILES {
        for y in 0..TEX_HEIGHT {
            for x in 0..TEX_WIDTH {
                let c = match t {
                    // glass: sparse frame, see-through centre
                    10 => {
                        if x < 3 || x > 60 || y < 3 || y > 60 {
                            rgb(2, 3, 3)
                        } else if (x + y) % 16 == 0 {
                            rgb(5, 7, 3)
                        } else {
                            rgb(3, 6, 3)
                        }
                    }
                    // grate: holes every other 8×8 block
                    11 => {
                        if (x / 8 + y / 8) % 2 == 0 {
                            rgb(4, 4, 1)
                        } else {
                            0
                        }
                    }
                    // ceiling with skylights
                    12 => {
                        if (16..48).contains(&x) && (16..48).contains(&y) {
                            0
                        } else {
                            rgb(3, 3, 2)
                        }
                    }
                    // raised block height: 0‥63
                    13 => ((x.min(63 - x).min(y).min(63 - y)) * 4).min(255) as u8,
                    _ => {
                        let mortar = y % 16 == 0 || (x + (y / 16) * 8) % 32 == 0;
                        if mortar {
                            rgb(2, 2, 1)
                        } else {
                            rgb(1 + t % 7, 1 + (t * 3) % 7, 1 + t % 3)
                        }
                    }
                };
                sheet.set(t * TEX_WIDTH + x, y, c);
            }
        }
    }
    sheet
}

fn sky_panorama() -> Bitmap {
    let mut sky = Bitmap::new(DEFAULT_WIDTH, 72);
    for y in 0..72 {
        for x in 0..DEFAULT_WIDTH {
            let star = (x * 7 + y * 13) % 97 == 0;
            let c = if star { rgb(7, 7, 3) } else { rgb(0, y / 24, 1 + y / 36) };
            sky.set(x, y, c);
        }
    }
    sky
}

fn lamp_sprite() -> Bitmap {
    let mut lamp = Bitmap::new(32, 64);
    for y in 0..64 {
        for x in 0..32 {
            let (dx, dy) = (x as i32 - 16, y as i32 - 12);
            let c = if dx * dx + dy * dy < 90 {
                rgb(7, 6, 1)
            } else if (14..18).contains(&x) && y > 20 {
                rgb(2, 2, 2)
            } else {
                0
            };
            lamp.set(x, y, c);
        }
    }
    lamp
}

fn build_level(rc: &mut Raycaster) -> anyhow::Result<()> {
    let n = LEVEL as i32;
    for x in 0..n {
        for y in 0..n {
            let border = x == 0 || y == 0 || x == n - 1 || y == n - 1;
            rc.set_wall_at(x, y, if border { 2 } else { 0 });
            rc.set_light_at(x, y, 5);
            rc.set_floor_at(x, y, 5);
            rc.set_ceiling_at(x, y, if x < n / 2 { 13 } else { 0 });
        }
    }

    // pillars
    for (x, y) in [(5, 5), (5, 9), (9, 5), (9, 9)] {
        rc.set_wall_at(x, y, 3 + (x + y) % 4);
    }

    // glass partition with a thin grate door
    rc.set_wall_textures(11, 12, 12, 12, 12)?;
    rc.set_wall_alpha(11, 255, 255, 255, 255)?;
    rc.set_wall_solid(11, 0, 0, 0, 0)?;
    for y in 3..n - 3 {
        rc.set_wall_at(14, y, if y == n / 2 { 11 } else { 10 });
    }

    // raised blocks under the open sky
    for (x, y) in [(18, 6), (19, 6), (18, 16)] {
        rc.set_height_at(x, y, 14);
    }

    rc.set_ambient_light(224);
    rc.set_ambient_color(rgb(2, 3, 3) as i32, 48);

    for (id, (x, y)) in [(12.5, 4.5), (12.5, 19.5), (20.5, 12.5)].into_iter().enumerate() {
        rc.init_sprite(id as i32, x, y, LAMP_SLOT, 255, 0, 0.0, 0.0, 0.0)?;
        rc.set_sprite_interact_obj(id as i32, id as i32 + 1)?;
    }

    rc.set_player_position(3.5, 3.5);
    rc.set_camera_angle(180);
    Ok(())
}
