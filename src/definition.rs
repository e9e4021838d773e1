// Special definitions and the shared special palette, plus the JSON elements they persist as.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    common::{
        BlockValue, ColorIdx, LevelType, NesColor, NES_COLOR_COUNT, PALETTE_ROWS,
        PALETTE_ROW_SIZE,
    },
    error::{check_index, Result, SpecialError},
    properties::parse_hex,
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SpecialsDocument {
    pub specials: SpecialsElement,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SpecialsElement {
    #[serde(default)]
    pub specialblocks: Vec<SpecialBlocksElement>,
    pub palette: Option<PaletteElement>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SpecialBlocksElement {
    pub leveltype: u32,
    #[serde(default)]
    pub blocks: Vec<SpecialBlockElement>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SpecialBlockElement {
    pub value: String,
    pub tiles: [u8; 4],
    #[serde(default)]
    pub palette: u8,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PaletteElement {
    #[serde(default)]
    pub name: String,
    pub colors: Vec<NesColor>,
}

/// Overlay drawn over a block: four 8x8 tiles from the special pattern table
/// (top-left, top-right, bottom-left, bottom-right). Tile index `i` lives in
/// bank `i / 64` at position `i % 64`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecialBlock {
    pub tiles: [u8; 4],
    pub palette: u8, // background palette row (0-3)
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecialDefinition {
    blocks: BTreeMap<BlockValue, SpecialBlock>,
}

impl SpecialDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_element(&mut self, element: &SpecialBlocksElement) -> Result<()> {
        let mut blocks = BTreeMap::new();
        for b in &element.blocks {
            let value = parse_hex(&b.value)?;
            let value = BlockValue::try_from(value).map_err(|_| {
                SpecialError::Parse(format!("special block value {:X} out of range", value))
            })?;
            if b.palette as usize >= PALETTE_ROWS / 2 {
                return Err(SpecialError::Parse(format!(
                    "special block {:02X}: palette row {} out of range",
                    value, b.palette
                )));
            }
            let block = SpecialBlock {
                tiles: b.tiles,
                palette: b.palette,
                name: b.name.clone(),
            };
            if blocks.insert(value, block).is_some() {
                return Err(SpecialError::Parse(format!(
                    "level type {}: special block {:02X} defined twice",
                    element.leveltype, value
                )));
            }
        }
        self.blocks = blocks;
        Ok(())
    }

    pub fn create_element(&self, level_type: LevelType) -> SpecialBlocksElement {
        SpecialBlocksElement {
            leveltype: level_type as u32,
            blocks: self
                .blocks
                .iter()
                .map(|(value, block)| SpecialBlockElement {
                    value: format!("{:02X}", value),
                    tiles: block.tiles,
                    palette: block.palette,
                    name: block.name.clone(),
                })
                .collect(),
        }
    }

    pub fn block(&self, value: BlockValue) -> Option<&SpecialBlock> {
        self.blocks.get(&value)
    }

    pub fn set_block(&mut self, value: BlockValue, block: SpecialBlock) -> Result<()> {
        check_index("palette row", block.palette as usize, PALETTE_ROWS / 2)?;
        self.blocks.insert(value, block);
        Ok(())
    }

    pub fn remove_block(&mut self, value: BlockValue) -> Option<SpecialBlock> {
        self.blocks.remove(&value)
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockValue, &SpecialBlock)> {
        self.blocks.iter().map(|(&v, b)| (v, b))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecialPalette {
    pub name: String,
    pub colors: [[NesColor; PALETTE_ROW_SIZE]; PALETTE_ROWS],
    pub is_special: bool,
}

impl Default for SpecialPalette {
    fn default() -> Self {
        SpecialPalette {
            name: String::new(),
            colors: [[0x0F; PALETTE_ROW_SIZE]; PALETTE_ROWS],
            is_special: false,
        }
    }
}

impl SpecialPalette {
    pub fn load_from_element(&mut self, element: &PaletteElement) -> Result<()> {
        let expected = PALETTE_ROWS * PALETTE_ROW_SIZE;
        if element.colors.len() != expected {
            return Err(SpecialError::Parse(format!(
                "palette \"{}\" has {} colors, expected {}",
                element.name,
                element.colors.len(),
                expected
            )));
        }
        let mut colors = [[0; PALETTE_ROW_SIZE]; PALETTE_ROWS];
        for (i, &c) in element.colors.iter().enumerate() {
            if c as usize >= NES_COLOR_COUNT {
                return Err(SpecialError::Parse(format!(
                    "palette \"{}\": color {:02X} is not an NES color",
                    element.name, c
                )));
            }
            colors[i / PALETTE_ROW_SIZE][i % PALETTE_ROW_SIZE] = c;
        }
        self.name = element.name.clone();
        self.colors = colors;
        Ok(())
    }

    pub fn create_element(&self) -> PaletteElement {
        PaletteElement {
            name: self.name.clone(),
            colors: self.colors.iter().flatten().copied().collect(),
        }
    }

    pub fn color(&self, row: usize, index: ColorIdx) -> Result<NesColor> {
        check_index("palette row", row, PALETTE_ROWS)?;
        check_index("palette color", index as usize, PALETTE_ROW_SIZE)?;
        Ok(self.colors[row][index as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_element(value: &str, palette: u8) -> SpecialBlockElement {
        SpecialBlockElement {
            value: value.to_string(),
            tiles: [0, 1, 64, 65],
            palette,
            name: String::new(),
        }
    }

    #[test]
    fn definition_element_round_trip() {
        let element = SpecialBlocksElement {
            leveltype: 3,
            blocks: vec![block_element("0x62", 1), block_element("2a", 0)],
        };
        let mut def = SpecialDefinition::new();
        def.load_from_element(&element).unwrap();
        assert_eq!(def.len(), 2);
        assert_eq!(def.block(0x62).unwrap().palette, 1);
        assert_eq!(def.blocks().map(|(v, _)| v).collect::<Vec<_>>(), vec![0x2A, 0x62]);

        let saved = def.create_element(3);
        assert_eq!(saved.leveltype, 3);
        assert_eq!(saved.blocks[0].value, "2A");
        let mut reloaded = SpecialDefinition::new();
        reloaded.load_from_element(&saved).unwrap();
        assert_eq!(reloaded, def);
    }

    #[test]
    fn bad_blocks_are_rejected() {
        let mut def = SpecialDefinition::new();
        let dup = SpecialBlocksElement {
            leveltype: 1,
            blocks: vec![block_element("10", 0), block_element("0x10", 0)],
        };
        assert!(matches!(def.load_from_element(&dup), Err(SpecialError::Parse(_))));
        let wide = SpecialBlocksElement {
            leveltype: 1,
            blocks: vec![block_element("100", 0)],
        };
        assert!(matches!(def.load_from_element(&wide), Err(SpecialError::Parse(_))));
        let bad_row = SpecialBlocksElement {
            leveltype: 1,
            blocks: vec![block_element("10", 4)],
        };
        assert!(matches!(def.load_from_element(&bad_row), Err(SpecialError::Parse(_))));
        assert!(def.is_empty());
    }

    #[test]
    fn palette_validates_colors() {
        let mut pal = SpecialPalette::default();
        let mut element = PaletteElement {
            name: "Specials".to_string(),
            colors: (0..32).collect(),
        };
        pal.load_from_element(&element).unwrap();
        assert_eq!(pal.color(1, 2).unwrap(), 6);
        assert_eq!(pal.create_element(), element);
        assert!(!pal.is_special);

        element.colors[5] = 0x40;
        assert!(matches!(pal.load_from_element(&element), Err(SpecialError::Parse(_))));
        element.colors.truncate(16);
        assert!(matches!(pal.load_from_element(&element), Err(SpecialError::Parse(_))));
        assert_eq!(pal.name, "Specials");
        assert!(pal.color(8, 0).is_err());
    }
}
