// Built-in defaults used when a project supplies no special content of its own.
use crate::common::SPECIAL_GRAPHICS_BYTES;

pub const BLOCK_PROPERTIES: &str = include_str!("../resources/properties.json");
pub const SPECIAL_DEFINITIONS: &str = include_str!("../resources/special_definitions.json");
pub const SPECIAL_GRAPHICS: &[u8; SPECIAL_GRAPHICS_BYTES] =
    include_bytes!("../resources/special_graphics.chr");
