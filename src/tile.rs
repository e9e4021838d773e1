// 8x8 tiles in the NES 2bpp planar format
use crate::{
    common::{ColorIdx, TILE_BYTES},
    error::{check_index, Result, SpecialError},
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tile {
    pixels: [[ColorIdx; 8]; 8],
}

impl Tile {
    /// Decodes the first 16 bytes of `data`: bytes 0-7 hold the low bit-plane
    /// and bytes 8-15 the high bit-plane, one row per byte, MSB leftmost.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < TILE_BYTES {
            return Err(SpecialError::Format(format!(
                "tile needs {} bytes, got {}",
                TILE_BYTES,
                data.len()
            )));
        }
        let mut pixels = [[0; 8]; 8];
        for y in 0..8 {
            for x in 0..8 {
                let c0 = (data[y] >> (7 - x)) & 1;
                let c1 = (data[y + 8] >> (7 - x)) & 1;
                pixels[y][x] = c0 | (c1 << 1);
            }
        }
        Ok(Tile { pixels })
    }

    pub fn encode(&self) -> [u8; TILE_BYTES] {
        let mut out = [0; TILE_BYTES];
        for y in 0..8 {
            for x in 0..8 {
                let c = self.pixels[y][x];
                out[y] |= (c & 1) << (7 - x);
                out[y + 8] |= ((c >> 1) & 1) << (7 - x);
            }
        }
        out
    }

    pub fn from_pixels(pixels: [[ColorIdx; 8]; 8]) -> Result<Self> {
        for row in &pixels {
            for &c in row {
                check_index("color", c as usize, 4)?;
            }
        }
        Ok(Tile { pixels })
    }

    pub fn pixels(&self) -> &[[ColorIdx; 8]; 8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Result<ColorIdx> {
        check_index("pixel x", x, 8)?;
        check_index("pixel y", y, 8)?;
        Ok(self.pixels[y][x])
    }
}
