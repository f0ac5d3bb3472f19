//! Material types stored in grid cells

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Material occupying a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Material {
    #[default]
    Air = 0,
    Sand = 1,
    Water = 2,
    Stone = 3,
}

/// Static physical and visual properties of a material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProperties {
    pub is_solid: bool,
    pub is_liquid: bool,
    pub density: f32,
    /// RGBA8888
    pub color: u32,
}

/// Property table indexed by `Material as usize`
pub const MATERIAL_PROPERTIES: [MaterialProperties; 4] = [
    MaterialProperties {
        is_solid: false,
        is_liquid: false,
        density: 0.0,
        color: 0x0000_00FF,
    },
    MaterialProperties {
        is_solid: true,
        is_liquid: false,
        density: 2.0,
        color: 0xC2B2_80FF,
    },
    MaterialProperties {
        is_solid: false,
        is_liquid: true,
        density: 1.0,
        color: 0x0080_FFFF,
    },
    MaterialProperties {
        is_solid: true,
        is_liquid: false,
        density: 10.0,
        color: 0x8080_80FF,
    },
];

impl Material {
    /// Every material, in discriminant order
    pub const ALL: [Material; 4] = [
        Material::Air,
        Material::Sand,
        Material::Water,
        Material::Stone,
    ];

    /// Lowercase name, as used in config files and chat commands
    pub fn name(self) -> &'static str {
        match self {
            Material::Air => "air",
            Material::Sand => "sand",
            Material::Water => "water",
            Material::Stone => "stone",
        }
    }

    pub fn properties(self) -> &'static MaterialProperties {
        &MATERIAL_PROPERTIES[self as usize]
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a material name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown material '{0}' (expected air, sand, water or stone)")]
pub struct UnknownMaterial(pub String);

impl FromStr for Material {
    type Err = UnknownMaterial;

    /// Case-insensitive lookup by name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Material::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMaterial(s.to_string()))
    }
}
