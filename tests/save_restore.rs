//! Saving to disk and restoring into a fresh raycaster reproduces the frame.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use palcast_rs::{
    Raycaster,
    host::{Bitmap, SpriteBank, SpriteHost},
    palette::Palette,
    renderer::RenderConfig,
    savegame::SaveError,
};

const SCREEN: i32 = 1;
const SHEET: i32 = 2;
const PIC: i32 = 5;

fn bank() -> SpriteBank {
    let mut sheet = Bitmap::new(64 * 12, 64);
    for y in 0..64 {
        for x in 0..64 * 12 {
            // per-tile stripes so texture coordinates matter
            let tile = x / 64;
            sheet.set(x, y, (20 + tile * 9 + (x % 64) / 8) as u8);
        }
    }
    let mut bank = SpriteBank::new();
    bank.insert(SCREEN, Bitmap::new(320, 160));
    bank.insert(SHEET, sheet);
    bank.insert(PIC, Bitmap::filled(32, 48, 77));
    bank
}

fn scene(bank: &SpriteBank) -> Raycaster {
    let mut rc = Raycaster::new(RenderConfig::default(), Palette::distinct_565());
    rc.make_textures(bank, SHEET).unwrap();
    for x in 0..16 {
        for y in 0..16 {
            let edge = x == 0 || y == 0 || x == 15 || y == 15;
            rc.set_wall_at(x, y, if edge { 2 } else { 0 });
            rc.set_light_at(x, y, 4 + (x + y) % 4);
            rc.set_floor_at(x, y, 6);
            rc.set_ceiling_at(x, y, if x < 8 { 7 } else { 0 });
        }
    }
    rc.set_wall_at(9, 6, 10);
    rc.set_ambient_light(180);
    rc.init_sprite(3, 10.5, 8.5, PIC, 160, 0, 0.0, 0.0, 0.0).unwrap();
    rc.set_sprite_interact_obj(3, 4).unwrap();
    rc.set_player_position(3.5, 7.5);
    rc.set_camera_angle(200);
    rc
}

fn frame(rc: &mut Raycaster, bank: &mut SpriteBank) -> Bitmap {
    bank.insert(SCREEN, Bitmap::new(320, 160));
    rc.render(bank, SCREEN).unwrap();
    bank.sprite(SCREEN).unwrap().clone()
}

#[test]
fn restored_file_renders_the_same_frame() {
    let mut bank = bank();
    let mut rc = scene(&bank);
    let before = frame(&mut rc, &mut bank);

    let file = tempfile::NamedTempFile::new().unwrap();
    {
        let mut w = BufWriter::new(File::create(file.path()).unwrap());
        rc.save(&mut w).unwrap();
        w.flush().unwrap();
    }

    let mut back = Raycaster::new(RenderConfig::default(), Palette::distinct_565());
    let mut r = BufReader::new(File::open(file.path()).unwrap());
    back.restore(&mut r, &bank).unwrap();

    assert!(back.world.raycast_on);
    assert_eq!(back.world.map, rc.world.map);
    assert_eq!(back.world.sprites, rc.world.sprites);
    assert_eq!(back.world.camera, rc.world.camera);
    assert_eq!(back.has_seen_tile(15, 7), rc.has_seen_tile(15, 7));

    let after = frame(&mut back, &mut bank);
    assert_eq!(after, before);
    assert_eq!(back.last_stats(), rc.last_stats());
}

#[test]
fn empty_file_is_rejected() {
    let bank = bank();
    let mut rc = scene(&bank);
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut r = File::open(file.path()).unwrap();
    let err = rc.restore(&mut r, &bank).unwrap_err();
    assert!(matches!(err, SaveError::Io(_)), "{err}");
    assert_eq!(rc.player_x(), 3.5);
}
