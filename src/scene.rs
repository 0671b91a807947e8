use std::f32::consts::PI;

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::{CubeConfig, MirrorConfig, SceneConfig, SubjectConfig};
use crate::environment::{Backdrop, EnvironmentMap};
use crate::lighting::LightingRig;
use crate::material::{MaterialSpec, Side};

/// Keeps the two mirror planes clear of the frame's faces.
const PLANE_OFFSET: f32 = 0.001;

/// Position and Euler rotation (radians, applied Z * Y * X).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
        }
    }

    pub fn quat(&self) -> Quat {
        Quat::from_rotation_z(self.rotation.z)
            * Quat::from_rotation_y(self.rotation.y)
            * Quat::from_rotation_x(self.rotation.x)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.quat(), self.position)
    }
}

/// Mesh shapes, centered on the local origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Lies in the XY plane, front face towards +Z.
    Plane { width: f32, height: f32 },
    Box { width: f32, height: f32, depth: f32 },
}

/// One mesh with a single material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshPart {
    pub name: String,
    pub geometry: Geometry,
    pub material: MaterialSpec,
    pub transform: Transform,
}

impl MeshPart {
    /// World-space direction the visible face of a plane points to, or
    /// `None` for closed shapes and double-sided planes.
    pub fn visible_normal(&self, parent: &Transform) -> Option<Vec3> {
        if !matches!(self.geometry, Geometry::Plane { .. }) {
            return None;
        }
        let front = parent.quat() * self.transform.quat() * Vec3::Z;
        match self.material.side {
            Side::Front => Some(front),
            Side::Back => Some(-front),
            Side::Both => None,
        }
    }
}

/// A group of parts sharing one transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub transform: Transform,
    pub parts: Vec<MeshPart>,
}

impl SceneObject {
    pub fn part(&self, name: &str) -> Option<&MeshPart> {
        self.parts.iter().find(|part| part.name == name)
    }

    /// World matrix of a part, with the group transform applied first.
    pub fn part_matrix(&self, part: &MeshPart) -> Mat4 {
        self.transform.matrix() * part.transform.matrix()
    }

    pub fn normal_matrix(&self, part: &MeshPart) -> Mat3 {
        Mat3::from_mat4(self.part_matrix(part)).inverse().transpose()
    }

    /// Planes whose visible face points towards a viewer standing along
    /// `towards_viewer` from the object.
    pub fn visible_planes_from(&self, towards_viewer: Vec3) -> Vec<&MeshPart> {
        self.parts
            .iter()
            .filter(|part| match part.visible_normal(&self.transform) {
                Some(normal) => normal.dot(towards_viewer) > 0.0,
                None => matches!(part.geometry, Geometry::Plane { .. }),
            })
            .collect()
    }
}

/// Builds the two-sided mirror: reflective front plane, flat back plane and a
/// box frame, grouped so one rotation turns all three.
pub fn build_mirror_assembly(config: &MirrorConfig) -> SceneObject {
    let plane = Geometry::Plane {
        width: config.width,
        height: config.height,
    };
    let half_depth = config.thickness / 2.0 + PLANE_OFFSET;

    let front = MeshPart {
        name: "front".into(),
        geometry: plane,
        material: config.front,
        transform: Transform::at(Vec3::new(0.0, 0.0, half_depth)),
    };
    // Turned half a revolution so the flat face looks out of the back.
    let back = MeshPart {
        name: "back".into(),
        geometry: plane,
        material: config.back,
        transform: Transform {
            position: Vec3::new(0.0, 0.0, -half_depth),
            rotation: Vec3::new(0.0, PI, 0.0),
        },
    };
    let frame = MeshPart {
        name: "frame".into(),
        geometry: Geometry::Box {
            width: config.width + config.margin,
            height: config.height + config.margin,
            depth: config.thickness,
        },
        material: config.frame,
        transform: Transform::default(),
    };

    SceneObject {
        name: "mirror".into(),
        transform: Transform::default(),
        parts: vec![front, back, frame],
    }
}

pub fn build_cube(config: &CubeConfig) -> SceneObject {
    SceneObject {
        name: "cube".into(),
        transform: Transform::default(),
        parts: vec![MeshPart {
            name: "cube".into(),
            geometry: Geometry::Box {
                width: config.size,
                height: config.size,
                depth: config.size,
            },
            material: config.material,
            transform: Transform::default(),
        }],
    }
}

/// Top-level container: the animated subject, its lights and environment.
#[derive(Debug, Clone)]
pub struct Scene {
    pub subject: SceneObject,
    pub lights: LightingRig,
    pub environment: EnvironmentMap,
}

impl Scene {
    pub fn build(config: &SceneConfig) -> Self {
        let subject = match &config.subject {
            SubjectConfig::Mirror(mirror) => build_mirror_assembly(mirror),
            SubjectConfig::Cube(cube) => build_cube(cube),
        };
        Self {
            subject,
            lights: LightingRig::build(&config.lights),
            environment: EnvironmentMap::new(
                config.environment.clone(),
                config.clear_color,
                config.fallback_color,
            ),
        }
    }

    pub fn backdrop(&self) -> Backdrop {
        self.environment.backdrop()
    }
}
