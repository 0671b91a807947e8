use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// The kinds of light a scene can hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    /// Uniform light from every direction.
    Ambient,
    /// Parallel rays arriving from `position` towards the origin.
    Directional { position: Vec3 },
    /// Omni light; `range` of zero means no falloff cut-off.
    Point { position: Vec3, range: f32 },
}

impl LightKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ambient => "ambient",
            Self::Directional { .. } => "directional",
            Self::Point { .. } => "point",
        }
    }
}

/// Immutable light added to the scene at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightDescriptor {
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
}

impl LightDescriptor {
    pub fn ambient(color: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity,
        }
    }

    pub fn directional(color: Vec3, intensity: f32, position: Vec3) -> Self {
        Self {
            kind: LightKind::Directional { position },
            color,
            intensity,
        }
    }

    pub fn point(color: Vec3, intensity: f32, position: Vec3, range: f32) -> Self {
        Self {
            kind: LightKind::Point { position, range },
            color,
            intensity,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.intensity.is_finite() || self.intensity < 0.0 {
            return Err(ConfigError::LightIntensity(self.intensity));
        }
        if let LightKind::Point { range, .. } = self.kind {
            if !range.is_finite() || range < 0.0 {
                return Err(ConfigError::LightRange(range));
            }
        }
        Ok(())
    }
}

/// Ordered set of lights, fixed once the scene is built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LightingRig {
    lights: Vec<LightDescriptor>,
}

impl LightingRig {
    pub fn build(lights: &[LightDescriptor]) -> Self {
        Self {
            lights: lights.to_vec(),
        }
    }

    pub fn lights(&self) -> &[LightDescriptor] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Sum of every ambient light, premultiplied by intensity.
    pub fn ambient(&self) -> Vec3 {
        self.lights
            .iter()
            .filter(|light| matches!(light.kind, LightKind::Ambient))
            .fold(Vec3::ZERO, |acc, light| acc + light.color * light.intensity)
    }

    /// Lights that have a position, in declaration order.
    pub fn positioned(&self) -> impl Iterator<Item = &LightDescriptor> {
        self.lights
            .iter()
            .filter(|light| !matches!(light.kind, LightKind::Ambient))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_keeps_declaration_order_and_mixes_kinds() {
        let rig = LightingRig::build(&[
            LightDescriptor::ambient(Vec3::ONE, 2.0),
            LightDescriptor::directional(Vec3::ONE, 1.5, Vec3::new(0.0, 5.0, 5.0).normalize()),
            LightDescriptor::point(Vec3::new(1.0, 0.5, 0.0), 3.0, Vec3::new(2.0, 2.0, 2.0), 10.0),
        ]);
        assert_eq!(rig.len(), 3);
        let kinds: Vec<_> = rig.lights().iter().map(|l| l.kind.name()).collect();
        assert_eq!(kinds, ["ambient", "directional", "point"]);
        assert_eq!(rig.positioned().count(), 2);
    }

    #[test]
    fn ambient_terms_accumulate() {
        let rig = LightingRig::build(&[
            LightDescriptor::ambient(Vec3::ONE, 0.5),
            LightDescriptor::ambient(Vec3::new(1.0, 0.0, 0.0), 1.0),
        ]);
        assert_eq!(rig.ambient(), Vec3::new(1.5, 0.5, 0.5));
    }

    #[test]
    fn negative_intensity_is_rejected() {
        let light = LightDescriptor::ambient(Vec3::ONE, -1.0);
        assert!(light.validate().is_err());
        let point = LightDescriptor::point(Vec3::ONE, 1.0, Vec3::ZERO, -2.0);
        assert!(point.validate().is_err());
    }
}
