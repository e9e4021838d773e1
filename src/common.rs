pub type ColorIdx = u8; // Index into 2bpp palette row (0-3)
pub type NesColor = u8; // NES master palette entry (0x00-0x3F)
pub type LevelType = u8; // Gameplay rule set (0-14)
pub type BlockValue = u8; // Block number within a level type
pub type BankSlot = usize; // Pattern table slot (0-3)
pub type TileIdx = usize; // Index into a graphics bank (0-63)

pub const TILE_BYTES: usize = 16;
pub const TILES_PER_BANK: usize = 64;
pub const BANK_BYTES: usize = TILE_BYTES * TILES_PER_BANK;
pub const BANK_COUNT: usize = 4;
pub const SPECIAL_GRAPHICS_BYTES: usize = BANK_BYTES * BANK_COUNT;
pub const LEVEL_TYPE_COUNT: usize = 15;

pub const PALETTE_ROWS: usize = 8;
pub const PALETTE_ROW_SIZE: usize = 4;
pub const NES_COLOR_COUNT: usize = 64;
