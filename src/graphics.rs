use std::sync::Arc;

use crate::{
    common::{BankSlot, TileIdx, BANK_BYTES, BANK_COUNT, TILES_PER_BANK, TILE_BYTES},
    error::{check_index, Result, SpecialError},
    tile::Tile,
};

/// One page of 64 tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphicsBank {
    tiles: [Tile; TILES_PER_BANK],
}

impl Default for GraphicsBank {
    fn default() -> Self {
        GraphicsBank {
            tiles: [Tile::default(); TILES_PER_BANK],
        }
    }
}

impl GraphicsBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes 64 consecutive tiles from the start of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < BANK_BYTES {
            return Err(SpecialError::Format(format!(
                "graphics bank needs {} bytes, got {}",
                BANK_BYTES,
                data.len()
            )));
        }
        let mut bank = GraphicsBank::new();
        for (i, chunk) in data[..BANK_BYTES].chunks_exact(TILE_BYTES).enumerate() {
            bank.tiles[i] = Tile::decode(chunk)?;
        }
        Ok(bank)
    }

    pub fn set_tile(&mut self, index: TileIdx, tile: Tile) -> Result<()> {
        check_index("tile", index, TILES_PER_BANK)?;
        self.tiles[index] = tile;
        Ok(())
    }

    pub fn tile(&self, index: TileIdx) -> Result<&Tile> {
        check_index("tile", index, TILES_PER_BANK)?;
        Ok(&self.tiles[index])
    }

    pub fn tiles(&self) -> &[Tile; TILES_PER_BANK] {
        &self.tiles
    }

    pub fn flatten(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BANK_BYTES);
        for tile in &self.tiles {
            out.extend_from_slice(&tile.encode());
        }
        out
    }
}

/// The four banks a renderer addresses as (slot, tile).
#[derive(Clone, Debug, Default)]
pub struct PatternTable {
    banks: [Option<Arc<GraphicsBank>>; BANK_COUNT],
}

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bank(&mut self, slot: BankSlot, bank: Arc<GraphicsBank>) -> Result<()> {
        check_index("bank slot", slot, BANK_COUNT)?;
        self.banks[slot] = Some(bank);
        Ok(())
    }

    pub fn bank(&self, slot: BankSlot) -> Result<&GraphicsBank> {
        check_index("bank slot", slot, BANK_COUNT)?;
        self.banks[slot]
            .as_deref()
            .ok_or_else(|| SpecialError::NotReady(format!("pattern table slot {}", slot)))
    }

    pub fn lookup(&self, slot: BankSlot, index: TileIdx) -> Result<&Tile> {
        self.bank(slot)?.tile(index)
    }

    pub fn is_ready(&self) -> bool {
        self.banks.iter().all(Option::is_some)
    }
}
