use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use hashbrown::HashMap;
use itertools::Itertools;
use log::{info, warn};

use crate::{
    common::{
        BankSlot, BlockValue, LevelType, TileIdx, BANK_BYTES, BANK_COUNT, LEVEL_TYPE_COUNT,
        SPECIAL_GRAPHICS_BYTES,
    },
    config::graphics_path,
    definition::{SpecialDefinition, SpecialPalette, SpecialsDocument, SpecialsElement},
    error::{check_index, Result, SpecialError},
    graphics::{GraphicsBank, PatternTable},
    persist,
    properties::{BlockProperty, BlockPropertyTable},
    resources,
    tile::Tile,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadSource {
    Project,
    Defaults,
}

/// Owns the special graphics, special definitions and block properties of one project session.
pub struct SpecialManager {
    special_palette: SpecialPalette,
    special_table: PatternTable,
    special_banks: Vec<Arc<GraphicsBank>>,
    special_definitions: HashMap<LevelType, SpecialDefinition>,
    block_properties: BlockPropertyTable,
}

fn decode_banks(data: &[u8]) -> Result<Vec<Arc<GraphicsBank>>> {
    if data.len() != SPECIAL_GRAPHICS_BYTES {
        return Err(SpecialError::Format(format!(
            "special graphics must be {} bytes, got {}",
            SPECIAL_GRAPHICS_BYTES,
            data.len()
        )));
    }
    data.chunks_exact(BANK_BYTES)
        .map(|chunk| GraphicsBank::from_bytes(chunk).map(Arc::new))
        .collect()
}

fn parse_specials(text: &[u8]) -> Result<SpecialsElement> {
    let doc: SpecialsDocument = serde_json::from_slice(text)
        .map_err(|e| SpecialError::Parse(format!("special definitions: {}", e)))?;
    Ok(doc.specials)
}

type LoadedSpecials = (HashMap<LevelType, SpecialDefinition>, SpecialPalette);

// Project files seed level types 0-14 while the built-in defaults seed
// 1-14. Saved projects depend on both ranges, so they stay distinct.
fn build_definitions(specials: &SpecialsElement, first: LevelType) -> Result<LoadedSpecials> {
    let mut definitions: HashMap<LevelType, SpecialDefinition> = (first
        ..LEVEL_TYPE_COUNT as LevelType)
        .map(|lt| (lt, SpecialDefinition::new()))
        .collect();
    for element in &specials.specialblocks {
        let slot = match LevelType::try_from(element.leveltype) {
            Ok(lt) => definitions.get_mut(&lt),
            Err(_) => None,
        };
        let Some(def) = slot else {
            return Err(SpecialError::Parse(format!(
                "specialblocks level type {} has no definition slot",
                element.leveltype
            )));
        };
        def.load_from_element(element)?;
    }
    let palette = specials
        .palette
        .as_ref()
        .ok_or_else(|| SpecialError::Parse("missing palette element".to_string()))?;
    let mut special_palette = SpecialPalette::default();
    special_palette.load_from_element(palette)?;
    special_palette.is_special = true;
    Ok((definitions, special_palette))
}

fn project_graphics_path(path: &Path) -> Result<PathBuf> {
    let gfx_path = graphics_path(path);
    if gfx_path == path {
        return Err(SpecialError::GraphicsPathClash(gfx_path));
    }
    Ok(gfx_path)
}

impl SpecialManager {
    pub fn new() -> Result<Self> {
        Ok(SpecialManager {
            special_palette: SpecialPalette::default(),
            special_table: PatternTable::new(),
            special_banks: vec![],
            special_definitions: HashMap::new(),
            block_properties: BlockPropertyTable::from_json(resources::BLOCK_PROPERTIES)?,
        })
    }

    pub fn get_property(&self, level_type: LevelType, block: BlockValue) -> Result<BlockProperty> {
        self.block_properties.property(level_type, block)
    }

    pub fn block_properties(&self) -> &BlockPropertyTable {
        &self.block_properties
    }

    pub fn special_palette(&self) -> &SpecialPalette {
        &self.special_palette
    }

    pub fn special_palette_mut(&mut self) -> &mut SpecialPalette {
        &mut self.special_palette
    }

    pub fn special_table(&self) -> &PatternTable {
        &self.special_table
    }

    pub fn banks(&self) -> &[Arc<GraphicsBank>] {
        &self.special_banks
    }

    fn install_banks(&mut self, banks: Vec<Arc<GraphicsBank>>) -> Result<()> {
        let mut table = PatternTable::new();
        for (slot, bank) in banks.iter().enumerate() {
            table.set_bank(slot, bank.clone())?;
        }
        self.special_banks = banks;
        self.special_table = table;
        Ok(())
    }

    /// Returns `Ok(false)` when the file is missing; prior graphics stay as they were.
    pub fn load_special_graphics(&mut self, path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        info!("Loading {}", path.display());
        let data = std::fs::read(path)?;
        let banks = decode_banks(&data)?;
        self.install_banks(banks)?;
        Ok(true)
    }

    pub fn load_default_special_graphics(&mut self) -> Result<()> {
        info!("Using built-in special graphics");
        let banks = decode_banks(resources::SPECIAL_GRAPHICS)?;
        self.install_banks(banks)
    }

    pub fn save_graphics(&self, path: &Path) -> Result<()> {
        if self.special_banks.is_empty() {
            return Err(SpecialError::NotReady("special graphics".to_string()));
        }
        let mut data = Vec::with_capacity(self.special_banks.len() * BANK_BYTES);
        for bank in &self.special_banks {
            data.extend(bank.flatten());
        }
        persist::save_bytes(path, &data)
    }

    pub fn set_tile(&mut self, slot: BankSlot, index: TileIdx, tile: Tile) -> Result<()> {
        if self.special_banks.is_empty() {
            return Err(SpecialError::NotReady("special graphics".to_string()));
        }
        check_index("bank slot", slot, BANK_COUNT)?;
        let bank = &mut self.special_banks[slot];
        Arc::make_mut(bank).set_tile(index, tile)?;
        self.special_table.set_bank(slot, bank.clone())
    }

    fn install_definitions(&mut self, (definitions, palette): LoadedSpecials) {
        self.special_definitions = definitions;
        self.special_palette = palette;
    }

    /// Returns `Ok(false)` when the file is missing.
    pub fn load_special_definitions(&mut self, path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        let doc: SpecialsDocument = persist::load_json(path)?;
        let specials = build_definitions(&doc.specials, 0)?;
        self.install_definitions(specials);
        Ok(true)
    }

    pub fn load_default_specials(&mut self) -> Result<()> {
        info!("Using built-in special definitions");
        let specials = parse_specials(resources::SPECIAL_DEFINITIONS.as_bytes())?;
        let specials = build_definitions(&specials, 1)?;
        self.install_definitions(specials);
        Ok(())
    }

    pub fn get_special_definition(&self, level_type: LevelType) -> Option<&SpecialDefinition> {
        self.special_definitions.get(&level_type)
    }

    pub fn special_definition_mut(&mut self, level_type: LevelType) -> Result<&mut SpecialDefinition> {
        self.special_definitions
            .get_mut(&level_type)
            .ok_or(SpecialError::UnknownLevelType(level_type))
    }

    pub fn level_types(&self) -> Vec<LevelType> {
        self.special_definitions.keys().copied().sorted().collect()
    }

    pub fn save_specials(&self, path: &Path) -> Result<()> {
        let specialblocks = self
            .special_definitions
            .iter()
            .sorted_by_key(|(lt, _)| **lt)
            .map(|(&lt, def)| def.create_element(lt))
            .collect();
        let doc = SpecialsDocument {
            specials: SpecialsElement {
                specialblocks,
                palette: Some(self.special_palette.create_element()),
            },
        };
        persist::save_json(path, &doc)
    }

    /// One existence check on the definitions document picks the branch for
    /// both payloads; the graphics come from the `.chr` file beside it.
    /// Both payloads are decoded before either replaces the current state.
    pub fn load(&mut self, path: &Path) -> Result<LoadSource> {
        if path.exists() {
            let gfx_path = project_graphics_path(path)?;
            if !gfx_path.exists() {
                warn!(
                    "{} exists but {} does not",
                    path.display(),
                    gfx_path.display()
                );
                return Err(SpecialError::MissingGraphics(gfx_path));
            }
            let doc: SpecialsDocument = persist::load_json(path)?;
            let specials = build_definitions(&doc.specials, 0)?;
            info!("Loading {}", gfx_path.display());
            let banks = decode_banks(&std::fs::read(&gfx_path)?)?;
            self.install_banks(banks)?;
            self.install_definitions(specials);
            Ok(LoadSource::Project)
        } else {
            self.load_default_specials()?;
            self.load_default_special_graphics()?;
            Ok(LoadSource::Defaults)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let gfx_path = project_graphics_path(path)?;
        self.save_specials(path)?;
        self.save_graphics(&gfx_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_manager() -> SpecialManager {
        let mut manager = SpecialManager::new().unwrap();
        manager.load_default_specials().unwrap();
        manager.load_default_special_graphics().unwrap();
        manager
    }

    #[test]
    fn defaults_seed_level_types_one_to_fourteen() {
        let manager = loaded_manager();
        assert_eq!(manager.level_types(), (1..=14).collect::<Vec<LevelType>>());
        assert!(manager.get_special_definition(0).is_none());
        assert!(manager.get_special_definition(15).is_none());
        assert!(manager.get_special_definition(1).is_some());
        assert!(manager.special_palette().is_special);
    }

    #[test]
    fn default_graphics_fill_pattern_table() {
        let manager = loaded_manager();
        assert_eq!(manager.banks().len(), BANK_COUNT);
        assert!(manager.special_table().is_ready());
        let expected = Tile::decode(&resources::SPECIAL_GRAPHICS[BANK_BYTES + 16 * 5..]).unwrap();
        assert_eq!(manager.special_table().lookup(1, 5).unwrap(), &expected);
    }

    #[test]
    fn graphics_must_be_exact_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.chr");
        std::fs::write(&path, vec![0u8; SPECIAL_GRAPHICS_BYTES - 16]).unwrap();
        let mut manager = loaded_manager();
        let before = manager.banks().to_vec();
        assert!(matches!(
            manager.load_special_graphics(&path),
            Err(SpecialError::Format(_))
        ));
        assert_eq!(manager.banks(), &before[..]);
    }

    #[test]
    fn set_tile_updates_table() {
        let mut manager = SpecialManager::new().unwrap();
        assert!(matches!(
            manager.set_tile(0, 0, Tile::default()),
            Err(SpecialError::NotReady(_))
        ));
        manager.load_default_special_graphics().unwrap();
        let tile = Tile::from_pixels([[3; 8]; 8]).unwrap();
        manager.set_tile(3, 63, tile).unwrap();
        assert_eq!(manager.special_table().lookup(3, 63).unwrap(), &tile);
        assert_eq!(manager.banks()[3].tile(63).unwrap(), &tile);
        assert!(manager.set_tile(4, 0, tile).is_err());
    }

    #[test]
    fn out_of_range_level_type_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("special.json");
        let palette: Vec<u8> = vec![0x0F; 32];
        let doc = serde_json::json!({
            "specials": {
                "specialblocks": [{ "leveltype": 15, "blocks": [] }],
                "palette": { "name": "p", "colors": palette }
            }
        });
        std::fs::write(&path, doc.to_string()).unwrap();
        let mut manager = SpecialManager::new().unwrap();
        assert!(matches!(
            manager.load_special_definitions(&path),
            Err(SpecialError::Parse(_))
        ));
    }

    #[test]
    fn missing_palette_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("special.json");
        std::fs::write(&path, r#"{"specials": {"specialblocks": []}}"#).unwrap();
        let mut manager = SpecialManager::new().unwrap();
        assert!(matches!(
            manager.load_special_definitions(&path),
            Err(SpecialError::Parse(_))
        ));
        std::fs::write(&path, r#"{"other": {}}"#).unwrap();
        assert!(matches!(
            manager.load_special_definitions(&path),
            Err(SpecialError::Parse(_))
        ));
    }

    #[test]
    fn save_graphics_needs_banks() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SpecialManager::new().unwrap();
        assert!(matches!(
            manager.save_graphics(&dir.path().join("out.chr")),
            Err(SpecialError::NotReady(_))
        ));
    }
}
