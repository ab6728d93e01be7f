//! gen_clut.rs - one-shot CLI that builds a 65536-entry RGB565 colour
//! lookup table from a 768-byte palette file.
//!
//! USAGE:
//! ```bash
//! cargo run --bin gen_clut -- \
//!     --palette game.pal \
//!     --out game.clut [--eight-bit]
//! ```
//!
//! The output is the raw table, row `y` column `x` at offset `y*256+x`,
//! which is also the layout of the 256×256 CLUT sprite the raycaster loads.

use anyhow::{Context, bail};
use clap::Parser;
use log::info;
use std::{fs, path::PathBuf};

use palcast_rs::palette::{CLUT_SIZE, Clut, Palette};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Packed RGB palette, 256 × 3 bytes
    #[arg(long, value_name = "FILE")]
    palette: PathBuf,

    /// File receiving the table
    #[arg(long, value_name = "FILE", default_value = "palette.clut")]
    out: PathBuf,

    /// Channels are 0‥255 instead of VGA 0‥63
    #[arg(long)]
    eight_bit: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let bytes = fs::read(&opts.palette)
        .with_context(|| format!("reading palette {}", opts.palette.display()))?;
    let Some(pal) = Palette::from_rgb_bytes(&bytes, opts.eight_bit) else {
        bail!("{} holds {} bytes, need 768", opts.palette.display(), bytes.len());
    };

    let clut = Clut::from_palette(&pal);
    debug_assert_eq!(clut.as_bytes().len(), CLUT_SIZE);
    fs::write(&opts.out, clut.as_bytes())
        .with_context(|| format!("writing {}", opts.out.display()))?;

    info!("wrote {} entries to {}", CLUT_SIZE, opts.out.display());
    Ok(())
}
