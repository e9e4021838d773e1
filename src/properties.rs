use std::{fmt::Display, str::FromStr};

use hashbrown::HashMap;
use log::{debug, info};
use serde::Deserialize;

use crate::{
    common::{BlockValue, LevelType, LEVEL_TYPE_COUNT},
    error::{Result, SpecialError},
};

/// How a block behaves when the player touches it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockProperty {
    Background,
    Solid,
    TopSolid,
    Water,
    WaterFall,
    Slope,
    SlopeFiller,
    SlopeFillerSolidTop,
    SlopeFillerSolidBottom,
    Harmful,
    ConveyorLeft,
    ConveyorRight,
    Ice,
}

const PROPERTY_NAMES: [(&str, BlockProperty); 13] = [
    ("Background", BlockProperty::Background),
    ("Solid", BlockProperty::Solid),
    ("TopSolid", BlockProperty::TopSolid),
    ("Water", BlockProperty::Water),
    ("WaterFall", BlockProperty::WaterFall),
    ("Slope", BlockProperty::Slope),
    ("SlopeFiller", BlockProperty::SlopeFiller),
    ("SlopeFillerSolidTop", BlockProperty::SlopeFillerSolidTop),
    ("SlopeFillerSolidBottom", BlockProperty::SlopeFillerSolidBottom),
    ("Harmful", BlockProperty::Harmful),
    ("ConveyorLeft", BlockProperty::ConveyorLeft),
    ("ConveyorRight", BlockProperty::ConveyorRight),
    ("Ice", BlockProperty::Ice),
];

impl BlockProperty {
    pub const ALL: [BlockProperty; 13] = [
        BlockProperty::Background,
        BlockProperty::Solid,
        BlockProperty::TopSolid,
        BlockProperty::Water,
        BlockProperty::WaterFall,
        BlockProperty::Slope,
        BlockProperty::SlopeFiller,
        BlockProperty::SlopeFillerSolidTop,
        BlockProperty::SlopeFillerSolidBottom,
        BlockProperty::Harmful,
        BlockProperty::ConveyorLeft,
        BlockProperty::ConveyorRight,
        BlockProperty::Ice,
    ];

    pub fn name(self) -> &'static str {
        PROPERTY_NAMES[self as usize].0
    }
}

impl FromStr for BlockProperty {
    type Err = SpecialError;

    fn from_str(s: &str) -> Result<Self> {
        PROPERTY_NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s.trim()))
            .map(|&(_, property)| property)
            .ok_or_else(|| SpecialError::Parse(format!("unknown block property \"{}\"", s)))
    }
}

impl Display for BlockProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Deserialize)]
struct PropertiesDocument {
    properties: PropertiesElement,
}

#[derive(Deserialize)]
struct PropertiesElement {
    #[serde(default)]
    set: Vec<SetElement>,
}

#[derive(Deserialize)]
struct SetElement {
    leveltype: Option<String>,
    #[serde(default)]
    block: Vec<BlockElement>,
}

#[derive(Deserialize)]
struct BlockElement {
    value: Option<String>,
    property: Option<String>,
}

/// Parses a hexadecimal attribute, with or without a `0x` prefix.
pub fn parse_hex(s: &str) -> Result<u32> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16)
        .map_err(|e| SpecialError::Parse(format!("invalid hex value \"{}\": {}", s, e)))
}

fn required<'a>(attr: &'a Option<String>, name: &str, element: &str) -> Result<&'a str> {
    attr.as_deref().ok_or_else(|| {
        SpecialError::Parse(format!("<{}> is missing attribute \"{}\"", element, name))
    })
}

/// Block behaviour per (level type, block value). Reference data: built once and never edited.
#[derive(Clone, Debug)]
pub struct BlockPropertyTable {
    sets: [HashMap<BlockValue, BlockProperty>; LEVEL_TYPE_COUNT],
}

impl BlockPropertyTable {
    pub fn from_json(text: &str) -> Result<Self> {
        let doc: PropertiesDocument = serde_json::from_str(text)
            .map_err(|e| SpecialError::Parse(format!("block property document: {}", e)))?;
        let mut table = BlockPropertyTable {
            sets: std::array::from_fn(|_| HashMap::new()),
        };

        for set in &doc.properties.set {
            let level_type = parse_hex(required(&set.leveltype, "leveltype", "set")?)? as usize;
            if level_type >= LEVEL_TYPE_COUNT {
                return Err(SpecialError::Parse(format!(
                    "level type {:X} out of range",
                    level_type
                )));
            }
            for block in &set.block {
                let value = parse_hex(required(&block.value, "value", "block")?)?;
                let value = BlockValue::try_from(value).map_err(|_| {
                    SpecialError::Parse(format!("block value {:X} out of range", value))
                })?;
                let property: BlockProperty =
                    required(&block.property, "property", "block")?.parse()?;
                table.sets[level_type].insert(value, property);
            }
            debug!(
                "Level type {:X}: {} block properties",
                level_type,
                table.sets[level_type].len()
            );
        }
        info!("Loaded block properties for {} sets", doc.properties.set.len());
        Ok(table)
    }

    pub fn property(&self, level_type: LevelType, block: BlockValue) -> Result<BlockProperty> {
        self.sets
            .get(level_type as usize)
            .and_then(|set| set.get(&block))
            .copied()
            .ok_or(SpecialError::KeyNotFound { level_type, block })
    }

    pub fn block_count(&self, level_type: LevelType) -> usize {
        self.sets
            .get(level_type as usize)
            .map_or(0, |set| set.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "properties": {
            "set": [
                { "leveltype": "1", "block": [
                    { "value": "0x40", "property": "solid" },
                    { "value": "C2", "property": "WATER" }
                ]},
                { "leveltype": "E", "block": [
                    { "value": "1f", "property": "SlopeFillerSolidBottom" }
                ]}
            ]
        }
    }"#;

    #[test]
    fn names_match_case_insensitively() {
        assert_eq!("ice".parse::<BlockProperty>().unwrap(), BlockProperty::Ice);
        assert_eq!(
            "conveyorleft".parse::<BlockProperty>().unwrap(),
            BlockProperty::ConveyorLeft
        );
        for p in BlockProperty::ALL {
            assert_eq!(p.name().parse::<BlockProperty>().unwrap(), p);
        }
        assert!(matches!(
            "lava".parse::<BlockProperty>(),
            Err(SpecialError::Parse(_))
        ));
    }

    #[test]
    fn lookups_follow_document() {
        let table = BlockPropertyTable::from_json(DOC).unwrap();
        assert_eq!(table.property(1, 0x40).unwrap(), BlockProperty::Solid);
        assert_eq!(table.property(1, 0xC2).unwrap(), BlockProperty::Water);
        assert_eq!(
            table.property(14, 0x1F).unwrap(),
            BlockProperty::SlopeFillerSolidBottom
        );
        assert!(matches!(
            table.property(1, 0x41),
            Err(SpecialError::KeyNotFound { level_type: 1, block: 0x41 })
        ));
        assert!(matches!(
            table.property(15, 0x40),
            Err(SpecialError::KeyNotFound { level_type: 15, block: 0x40 })
        ));
        assert_eq!(table.block_count(1), 2);
        assert_eq!(table.block_count(0), 0);
    }

    #[test]
    fn unknown_property_name_fails() {
        let doc = r#"{"properties": {"set": [{"leveltype": "2", "block": [
            {"value": "10", "property": "Quicksand"}]}]}}"#;
        assert!(matches!(
            BlockPropertyTable::from_json(doc),
            Err(SpecialError::Parse(_))
        ));
    }

    #[test]
    fn missing_attributes_fail() {
        let no_level = r#"{"properties": {"set": [{"block": []}]}}"#;
        assert!(matches!(
            BlockPropertyTable::from_json(no_level),
            Err(SpecialError::Parse(_))
        ));
        let no_value = r#"{"properties": {"set": [{"leveltype": "3", "block": [
            {"property": "Solid"}]}]}}"#;
        assert!(matches!(
            BlockPropertyTable::from_json(no_value),
            Err(SpecialError::Parse(_))
        ));
        let out_of_range = r#"{"properties": {"set": [{"leveltype": "F"}]}}"#;
        assert!(matches!(
            BlockPropertyTable::from_json(out_of_range),
            Err(SpecialError::Parse(_))
        ));
        assert!(matches!(
            BlockPropertyTable::from_json("{}"),
            Err(SpecialError::Parse(_))
        ));
    }
}
