use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::{hex_color, ConfigError};
use crate::environment::EnvironmentState;

/// Which side of a surface is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Both,
}

impl Side {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "front" => Some(Self::Front),
            "back" => Some(Self::Back),
            "both" | "double" => Some(Self::Both),
            _ => None,
        }
    }
}

/// Lighting model applied to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Shading {
    /// Ambient + diffuse + specular from the lighting rig.
    #[default]
    Standard,
    /// Flat base color, ignores every light.
    Unlit,
}

/// Surface parameters for a mesh part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    pub color: Vec3,
    pub roughness: f32,
    pub metalness: f32,
    /// Samples the scene's environment map once it has loaded.
    #[serde(default)]
    pub reflects_environment: bool,
    #[serde(default)]
    pub side: Side,
    #[serde(default)]
    pub shading: Shading,
}

impl Default for MaterialSpec {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            roughness: 1.0,
            metalness: 0.0,
            reflects_environment: false,
            side: Side::Front,
            shading: Shading::Standard,
        }
    }
}

impl MaterialSpec {
    /// Perfect mirror: white, fully metallic, no roughness.
    pub fn reflective() -> Self {
        Self {
            color: Vec3::ONE,
            roughness: 0.0,
            metalness: 1.0,
            reflects_environment: true,
            side: Side::Front,
            shading: Shading::Standard,
        }
    }

    /// Unlit solid color, used for the back of the mirror.
    pub fn flat(color: Vec3) -> Self {
        Self {
            color,
            roughness: 1.0,
            metalness: 0.0,
            reflects_environment: false,
            side: Side::Front,
            shading: Shading::Unlit,
        }
    }

    /// Satin grey used for the mirror frame.
    pub fn frame() -> Self {
        Self {
            color: hex_color(0x808080),
            roughness: 0.6,
            metalness: 0.2,
            ..Self::default()
        }
    }

    pub fn validate(&self, role: &str) -> Result<(), ConfigError> {
        for (name, value) in [("roughness", self.roughness), ("metalness", self.metalness)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::MaterialRange {
                    role: role.to_string(),
                    parameter: name,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Whether the surface currently shows an environment reflection.
    ///
    /// Reflective materials fall back to their base color while the map is
    /// pending, absent or failed.
    pub fn reflection_active(&self, environment: &EnvironmentState) -> bool {
        self.reflects_environment && matches!(environment, EnvironmentState::Loaded(_))
    }

    /// Strength of the environment term fed to the shader.
    ///
    /// Smooth metals reflect almost everything; rough dielectrics barely do.
    pub fn reflectance(&self, environment: &EnvironmentState) -> f32 {
        if !self.reflection_active(environment) {
            return 0.0;
        }
        let base = 0.04 + (1.0 - 0.04) * self.metalness;
        base * (1.0 - self.roughness)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::environment::CubeFaces;

    #[test]
    fn reflective_material_only_reflects_loaded_maps() {
        let mirror = MaterialSpec::reflective();
        assert!(!mirror.reflection_active(&EnvironmentState::Pending));
        assert!(!mirror.reflection_active(&EnvironmentState::Failed("gone".into())));
        let loaded = EnvironmentState::Loaded(Arc::new(CubeFaces::solid(2, [10, 20, 30, 255])));
        assert!(mirror.reflection_active(&loaded));
        assert!((mirror.reflectance(&loaded) - 1.0).abs() < 1e-6);
        assert_eq!(mirror.reflectance(&EnvironmentState::Pending), 0.0);
    }

    #[test]
    fn flat_material_never_reflects() {
        let flat = MaterialSpec::flat(hex_color(0x6A0DAD));
        let loaded = EnvironmentState::Loaded(Arc::new(CubeFaces::solid(1, [0, 0, 0, 255])));
        assert!(!flat.reflection_active(&loaded));
        assert_eq!(flat.shading, Shading::Unlit);
    }

    #[test]
    fn out_of_range_roughness_is_rejected() {
        let material = MaterialSpec {
            roughness: 1.5,
            ..MaterialSpec::frame()
        };
        let err = material.validate("frame").unwrap_err();
        assert!(err.to_string().contains("roughness"));
        assert!(MaterialSpec::frame().validate("frame").is_ok());
    }

    #[test]
    fn side_names_parse() {
        assert_eq!(Side::from_name("Back"), Some(Side::Back));
        assert_eq!(Side::from_name("double"), Some(Side::Both));
        assert_eq!(Side::from_name("sideways"), None);
    }
}
