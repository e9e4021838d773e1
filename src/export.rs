// Renders the special pattern table to an RGBA sheet for inspection outside the editor
use std::{fs::File, io::BufWriter, path::Path};

use log::info;

use crate::{
    common::{ColorIdx, BANK_COUNT, NES_COLOR_COUNT, PALETTE_ROWS, TILES_PER_BANK},
    definition::SpecialPalette,
    error::{check_index, Result, SpecialError},
    graphics::PatternTable,
};

pub type ColorRGB = [u8; 3];

pub const SHEET_TILES_WIDE: usize = 16;
pub const SHEET_WIDTH: usize = SHEET_TILES_WIDE * 8;
pub const SHEET_HEIGHT: usize = BANK_COUNT * TILES_PER_BANK / SHEET_TILES_WIDE * 8;

#[rustfmt::skip]
const NES_PALETTE: [ColorRGB; NES_COLOR_COUNT] = [
    [84, 84, 84], [0, 30, 116], [8, 16, 144], [48, 0, 136],
    [68, 0, 100], [92, 0, 48], [84, 4, 0], [60, 24, 0],
    [32, 42, 0], [8, 58, 0], [0, 64, 0], [0, 60, 0],
    [0, 50, 60], [0, 0, 0], [0, 0, 0], [0, 0, 0],
    [152, 150, 152], [8, 76, 196], [48, 50, 236], [92, 30, 228],
    [136, 20, 176], [160, 20, 100], [152, 34, 32], [120, 60, 0],
    [84, 90, 0], [40, 114, 0], [8, 124, 0], [0, 118, 40],
    [0, 102, 120], [0, 0, 0], [0, 0, 0], [0, 0, 0],
    [236, 238, 236], [76, 154, 236], [120, 124, 236], [176, 98, 236],
    [228, 84, 236], [236, 88, 180], [236, 106, 100], [212, 136, 32],
    [160, 170, 0], [116, 196, 0], [76, 208, 32], [56, 204, 108],
    [56, 180, 204], [60, 60, 60], [0, 0, 0], [0, 0, 0],
    [236, 238, 236], [168, 204, 236], [188, 188, 236], [212, 178, 236],
    [236, 174, 236], [236, 174, 212], [236, 180, 176], [228, 196, 144],
    [204, 210, 120], [180, 222, 120], [168, 226, 144], [152, 226, 180],
    [160, 214, 228], [160, 162, 160], [0, 0, 0], [0, 0, 0],
];

pub fn nes_rgb(color: u8) -> ColorRGB {
    NES_PALETTE[color as usize % NES_COLOR_COUNT]
}

/// Lays the 256 tiles out 16 per row, slot-major, colored with one row of the
/// special palette. Returns RGBA bytes of a `SHEET_WIDTH` x `SHEET_HEIGHT` image.
pub fn render_pattern_table(
    table: &PatternTable,
    palette: &SpecialPalette,
    row: usize,
) -> Result<Vec<u8>> {
    if !table.is_ready() {
        return Err(SpecialError::NotReady("special pattern table".to_string()));
    }
    check_index("palette row", row, PALETTE_ROWS)?;
    let mut colors: [ColorRGB; 4] = [[0; 3]; 4];
    for (i, c) in colors.iter_mut().enumerate() {
        *c = nes_rgb(palette.color(row, i as ColorIdx)?);
    }

    let mut out = vec![0u8; SHEET_WIDTH * SHEET_HEIGHT * 4];
    for slot in 0..BANK_COUNT {
        for idx in 0..TILES_PER_BANK {
            let n = slot * TILES_PER_BANK + idx;
            let x0 = (n % SHEET_TILES_WIDE) * 8;
            let y0 = (n / SHEET_TILES_WIDE) * 8;
            let tile = table.lookup(slot, idx)?;
            for (y, pixel_row) in tile.pixels().iter().enumerate() {
                for (x, &c) in pixel_row.iter().enumerate() {
                    let i = ((y0 + y) * SHEET_WIDTH + x0 + x) * 4;
                    let rgb = colors[c as usize];
                    out[i..i + 3].copy_from_slice(&rgb);
                    // Color 0 is the backdrop.
                    out[i + 3] = if c == 0 { 0 } else { 255 };
                }
            }
        }
    }
    Ok(out)
}

pub fn write_png(path: &Path, table: &PatternTable, palette: &SpecialPalette, row: usize) -> Result<()> {
    let pixels = render_pattern_table(table, palette, row)?;
    info!("Saving {}", path.display());
    let file = File::create(path)?;
    let w = BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, SHEET_WIDTH as u32, SHEET_HEIGHT as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder
        .write_header()
        .map_err(|e| SpecialError::Format(format!("png header: {}", e)))?;
    writer
        .write_image_data(&pixels)
        .map_err(|e| SpecialError::Format(format!("png data: {}", e)))?;
    Ok(())
}
