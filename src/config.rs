//! Declarative scene configuration.
//!
//! Every variant of the scene is one [`SceneConfig`]: a preset from
//! [`SceneConfig::preset`] or a scene XML document read with
//! [`SceneConfig::from_xml`].

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::environment::{FaceBase, FaceSet, DEFAULT_FACE_NAMES, FACE_COUNT};
use crate::lighting::LightDescriptor;
use crate::material::{MaterialSpec, Shading, Side};

/// Names accepted by [`SceneConfig::preset`].
pub const PRESETS: &[&str] = &["mirror", "mirror-jpg", "mirror-remote", "cube"];

/// Color shown behind the subject when the environment fails to load.
pub const FALLBACK_COLOR: u32 = 0x666666;

/// Converts `0xRRGGBB` into a linear-ish `[0, 1]` color.
pub fn hex_color(rgb: u32) -> Vec3 {
    let r = ((rgb >> 16) & 0xff) as f32;
    let g = ((rgb >> 8) & 0xff) as f32;
    let b = (rgb & 0xff) as f32;
    Vec3::new(r / 255.0, g / 255.0, b / 255.0)
}

/// Configuration values rejected at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("clip planes must satisfy 0 < near < far (near={near}, far={far})")]
    ClipPlanes { near: f32, far: f32 },
    #[error("field of view must be between 0 and 180 degrees, got {0}")]
    FieldOfView(f32),
    #[error("camera distance must be positive, got {0}")]
    CameraDistance(f32),
    #[error("rotation step must be finite, got {0}")]
    RotationStep(f32),
    #[error("{role} material {parameter} must be within [0, 1], got {value}")]
    MaterialRange {
        role: String,
        parameter: &'static str,
        value: f32,
    },
    #[error("light intensity must be non-negative, got {0}")]
    LightIntensity(f32),
    #[error("point light range must be non-negative, got {0}")]
    LightRange(f32),
    #[error("{name} must be positive, got {value}")]
    Dimension { name: &'static str, value: f32 },
    #[error("unknown light kind {0:?}")]
    UnknownLightKind(String),
    #[error("unknown preset {0:?}")]
    UnknownPreset(String),
}

/// Perspective camera placed on +Z looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 3.5,
        }
    }
}

/// Two-sided mirror inside a box frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MirrorConfig {
    pub width: f32,
    pub height: f32,
    pub thickness: f32,
    /// Added to width and height to size the frame.
    pub margin: f32,
    pub front: MaterialSpec,
    pub back: MaterialSpec,
    pub frame: MaterialSpec,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            width: 2.5,
            height: 4.0,
            thickness: 0.1,
            margin: 0.2,
            front: MaterialSpec::reflective(),
            back: MaterialSpec::flat(hex_color(0x6A0DAD)),
            frame: MaterialSpec::frame(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubeConfig {
    pub size: f32,
    pub material: MaterialSpec,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            size: 1.0,
            material: MaterialSpec {
                color: hex_color(0x00aaff),
                roughness: 0.3,
                metalness: 0.4,
                ..MaterialSpec::default()
            },
        }
    }
}

/// The single animated object of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SubjectConfig {
    Mirror(MirrorConfig),
    Cube(CubeConfig),
}

/// Everything needed to build and animate one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub name: String,
    pub camera: CameraConfig,
    pub clear_color: Vec3,
    pub fallback_color: Vec3,
    /// Radians added to the subject's Y rotation on every tick.
    pub rotation_step: f32,
    pub lights: Vec<LightDescriptor>,
    pub environment: Option<FaceSet>,
    pub subject: SubjectConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::mirror("./textures/", "jpeg")
    }
}

impl SceneConfig {
    /// Looks up one of the built-in [`PRESETS`].
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        let config = match name {
            "mirror" => Self::mirror("./textures/", "jpeg"),
            "mirror-jpg" => Self {
                name: "mirror-jpg".into(),
                ..Self::mirror("./textures/", "jpg")
            },
            "mirror-remote" => Self {
                name: "mirror-remote".into(),
                environment: Some(FaceSet::url(
                    "https://threejs.org/examples/textures/cube/Park2/",
                    "jpg",
                )),
                ..Self::mirror("./textures/", "jpg")
            },
            "cube" => Self::cube(),
            other => return Err(ConfigError::UnknownPreset(other.to_string())),
        };
        Ok(config)
    }

    fn mirror(directory: &str, extension: &str) -> Self {
        Self {
            name: "mirror".into(),
            camera: CameraConfig::default(),
            clear_color: hex_color(0x333333),
            fallback_color: hex_color(FALLBACK_COLOR),
            rotation_step: 0.005,
            lights: vec![
                LightDescriptor::ambient(Vec3::ONE, 2.0),
                LightDescriptor::directional(Vec3::ONE, 1.5, Vec3::new(0.0, 5.0, 5.0).normalize()),
            ],
            environment: Some(FaceSet::directory(directory, extension)),
            subject: SubjectConfig::Mirror(MirrorConfig::default()),
        }
    }

    fn cube() -> Self {
        Self {
            name: "cube".into(),
            camera: CameraConfig {
                distance: 5.0,
                ..CameraConfig::default()
            },
            clear_color: hex_color(0x202020),
            fallback_color: hex_color(FALLBACK_COLOR),
            rotation_step: 0.003,
            lights: vec![
                LightDescriptor::ambient(Vec3::ONE, 0.4),
                LightDescriptor::point(Vec3::ONE, 1.2, Vec3::new(5.0, 5.0, 5.0), 0.0),
            ],
            environment: None,
            subject: SubjectConfig::Cube(CubeConfig::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let camera = &self.camera;
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(ConfigError::ClipPlanes {
                near: camera.near,
                far: camera.far,
            });
        }
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::FieldOfView(camera.fov_degrees));
        }
        if !(camera.distance > 0.0 && camera.distance.is_finite()) {
            return Err(ConfigError::CameraDistance(camera.distance));
        }
        if !self.rotation_step.is_finite() {
            return Err(ConfigError::RotationStep(self.rotation_step));
        }
        for light in &self.lights {
            light.validate()?;
        }
        match &self.subject {
            SubjectConfig::Mirror(mirror) => {
                positive("mirror width", mirror.width)?;
                positive("mirror height", mirror.height)?;
                positive("mirror thickness", mirror.thickness)?;
                positive("frame margin", mirror.margin)?;
                mirror.front.validate("front")?;
                mirror.back.validate("back")?;
                mirror.frame.validate("frame")?;
            }
            SubjectConfig::Cube(cube) => {
                positive("cube size", cube.size)?;
                cube.material.validate("cube")?;
            }
        }
        Ok(())
    }

    /// Parses a scene XML document. Omitted elements keep the `mirror`
    /// preset's values.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        if !root.has_tag_name("scene") {
            return Err(anyhow!("expected <scene> root, found <{}>", root.tag_name().name()));
        }

        let mut config = Self::default();
        if let Some(name) = root.attribute("name") {
            config.name = name.to_string();
        }
        if let Some(camera) = child(&root, "camera") {
            let c = &mut config.camera;
            c.fov_degrees = parse_f32(optional_text(&camera, "fov"), c.fov_degrees)?;
            c.near = parse_f32(optional_text(&camera, "near"), c.near)?;
            c.far = parse_f32(optional_text(&camera, "far"), c.far)?;
            c.distance = parse_f32(optional_text(&camera, "distance"), c.distance)?;
        }
        config.clear_color = parse_color(optional_text(&root, "clear-color"), config.clear_color)?;
        config.fallback_color =
            parse_color(optional_text(&root, "fallback-color"), config.fallback_color)?;
        config.rotation_step =
            parse_f32(optional_text(&root, "rotation-step"), config.rotation_step)?;

        let lights: Vec<_> = root.children().filter(|n| n.has_tag_name("light")).collect();
        if !lights.is_empty() {
            config.lights = lights
                .iter()
                .map(parse_light)
                .collect::<Result<_>>()?;
        }

        if let Some(environment) = child(&root, "environment") {
            config.environment = parse_environment(&environment)?;
        }

        if let Some(mirror) = child(&root, "mirror") {
            config.subject = SubjectConfig::Mirror(parse_mirror(&mirror)?);
        } else if let Some(cube) = child(&root, "cube") {
            config.subject = SubjectConfig::Cube(parse_cube(&cube)?);
        }

        config
            .validate()
            .with_context(|| format!("scene {:?} is invalid", config.name))?;
        Ok(config)
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Dimension { name, value })
    }
}

fn parse_light(node: &Node<'_, '_>) -> Result<LightDescriptor> {
    let kind = optional_text(node, "kind")
        .or_else(|| node.attribute("kind").map(str::to_string))
        .unwrap_or_else(|| "ambient".to_string());
    let color = parse_color(optional_text(node, "color"), Vec3::ONE)?;
    let intensity = parse_f32(optional_text(node, "intensity"), 1.0)?;
    let position = parse_vec3(optional_text(node, "position"), Vec3::ZERO)?;
    let light = match kind.as_str() {
        "ambient" => LightDescriptor::ambient(color, intensity),
        "directional" => {
            let normalize = optional_text(node, "normalize").as_deref() == Some("true");
            let position = if normalize {
                position.normalize_or_zero()
            } else {
                position
            };
            LightDescriptor::directional(color, intensity, position)
        }
        "point" => {
            let range = parse_f32(optional_text(node, "range"), 0.0)?;
            LightDescriptor::point(color, intensity, position, range)
        }
        other => return Err(ConfigError::UnknownLightKind(other.to_string()).into()),
    };
    Ok(light)
}

fn parse_environment(node: &Node<'_, '_>) -> Result<Option<FaceSet>> {
    let base = match (optional_text(node, "path"), optional_text(node, "url")) {
        (Some(path), None) => FaceBase::Directory(PathBuf::from(path)),
        (None, Some(url)) => FaceBase::Url(url),
        (None, None) => return Ok(None),
        (Some(_), Some(_)) => {
            return Err(anyhow!("<environment> takes either <path> or <url>, not both"))
        }
    };

    let faces: Vec<String> = node
        .children()
        .filter(|n| n.has_tag_name("face"))
        .filter_map(|n| n.text())
        .map(|text| text.trim().to_string())
        .collect();
    let names: [String; FACE_COUNT] = if faces.is_empty() {
        let extension = optional_text(node, "extension").unwrap_or_else(|| "jpg".to_string());
        let extension = extension.trim_start_matches('.').to_string();
        DEFAULT_FACE_NAMES.map(|name| format!("{name}.{extension}"))
    } else {
        faces
            .try_into()
            .map_err(|faces: Vec<String>| anyhow!("expected 6 <face> entries, found {}", faces.len()))?
    };
    Ok(Some(FaceSet::with_names(base, names)))
}

fn parse_mirror(node: &Node<'_, '_>) -> Result<MirrorConfig> {
    let mut mirror = MirrorConfig::default();
    mirror.width = parse_f32(optional_text(node, "width"), mirror.width)?;
    mirror.height = parse_f32(optional_text(node, "height"), mirror.height)?;
    mirror.thickness = parse_f32(optional_text(node, "thickness"), mirror.thickness)?;
    mirror.margin = parse_f32(optional_text(node, "margin"), mirror.margin)?;
    for material in node.children().filter(|n| n.has_tag_name("material")) {
        match material.attribute("role") {
            Some("front") => mirror.front = parse_material(&material, mirror.front)?,
            Some("back") => mirror.back = parse_material(&material, mirror.back)?,
            Some("frame") => mirror.frame = parse_material(&material, mirror.frame)?,
            other => return Err(anyhow!("unknown mirror material role {other:?}")),
        }
    }
    Ok(mirror)
}

fn parse_cube(node: &Node<'_, '_>) -> Result<CubeConfig> {
    let mut cube = CubeConfig::default();
    cube.size = parse_f32(optional_text(node, "size"), cube.size)?;
    if let Some(material) = child(node, "material") {
        cube.material = parse_material(&material, cube.material)?;
    }
    Ok(cube)
}

fn parse_material(node: &Node<'_, '_>, base: MaterialSpec) -> Result<MaterialSpec> {
    let mut material = base;
    material.color = parse_color(optional_text(node, "color"), material.color)?;
    material.roughness = parse_f32(optional_text(node, "roughness"), material.roughness)?;
    material.metalness = parse_f32(optional_text(node, "metalness"), material.metalness)?;
    if let Some(flag) = optional_text(node, "reflects-environment") {
        material.reflects_environment = parse_bool(&flag)?;
    }
    if let Some(side) = optional_text(node, "side") {
        material.side = Side::from_name(&side).ok_or_else(|| anyhow!("unknown side {side:?}"))?;
    }
    if let Some(flag) = optional_text(node, "unlit") {
        material.shading = if parse_bool(&flag)? {
            Shading::Unlit
        } else {
            Shading::Standard
        };
    }
    Ok(material)
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(anyhow!("expected a boolean, got {other:?}")),
    }
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let numbers = value
        .split_whitespace()
        .map(|component| component.parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| anyhow!("failed to parse vector {value:?}: {err}"))?;
    match numbers.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(anyhow!("vector {value:?} must have 3 components")),
    }
}

/// Accepts `0xRRGGBB`, `#RRGGBB` or three 0-255 components.
fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let hex = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .or_else(|| value.strip_prefix('#'));
    if let Some(hex) = hex {
        let rgb = u32::from_str_radix(hex, 16)
            .map_err(|err| anyhow!("failed to parse color {value:?}: {err}"))?;
        if rgb > 0xffffff {
            return Err(anyhow!("color {value:?} is out of range"));
        }
        return Ok(hex_color(rgb));
    }
    let rgb = parse_vec3(Some(value), default)?;
    Ok(rgb / 255.0)
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float {value:?}: {err}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;

    use super::*;
    use crate::lighting::LightKind;

    static SAMPLE: Lazy<String> = Lazy::new(|| {
        r#"
        <scene name="bridge">
            <camera><fov>60</fov><near>0.5</near><far>50</far><distance>4</distance></camera>
            <clear-color>#112233</clear-color>
            <fallback-color>0x666666</fallback-color>
            <rotation-step>0.004</rotation-step>
            <light><kind>ambient</kind><color>0xffffff</color><intensity>2.0</intensity></light>
            <light kind="directional">
                <intensity>1.5</intensity>
                <position>0 5 5</position>
                <normalize>true</normalize>
            </light>
            <light><kind>point</kind><position>1 2 3</position><range>20</range></light>
            <environment>
                <path>./textures/</path>
                <face>posx.jpeg</face><face>negx.jpeg</face>
                <face>posy.jpeg</face><face>negy.jpeg</face>
                <face>posz.jpeg</face><face>negz.jpg</face>
            </environment>
            <mirror>
                <width>2</width><height>3</height><margin>0.3</margin>
                <material role="back"><color>255 0 0</color><side>back</side></material>
            </mirror>
        </scene>
        "#
        .to_string()
    });

    #[test]
    fn presets_are_valid() {
        for name in PRESETS {
            let config = SceneConfig::preset(name).unwrap();
            config.validate().unwrap();
        }
        assert!(matches!(
            SceneConfig::preset("teapot"),
            Err(ConfigError::UnknownPreset(_))
        ));
    }

    #[test]
    fn camera_must_sit_in_front_of_the_subject() {
        for distance in [0.0, -1.0, f32::INFINITY, f32::NAN] {
            let mut config = SceneConfig::preset("mirror").unwrap();
            config.camera.distance = distance;
            assert!(
                matches!(config.validate(), Err(ConfigError::CameraDistance(_))),
                "distance {distance} accepted"
            );
        }
    }

    #[test]
    fn mirror_preset_matches_source_values() {
        let config = SceneConfig::preset("mirror").unwrap();
        assert_eq!(config.camera.distance, 3.5);
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.rotation_step, 0.005);
        assert_eq!(config.fallback_color, hex_color(0x666666));
        assert_eq!(config.lights.len(), 2);
        let faces = config.environment.unwrap();
        assert_eq!(faces.names[0], "posx.jpeg");
    }

    #[test]
    fn parses_full_scene_document() {
        let config = SceneConfig::from_xml(&SAMPLE).unwrap();
        assert_eq!(config.name, "bridge");
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.camera.distance, 4.0);
        assert_eq!(config.clear_color, hex_color(0x112233));
        assert_eq!(config.rotation_step, 0.004);
        assert_eq!(config.lights.len(), 3);
        match config.lights[1].kind {
            LightKind::Directional { position } => {
                assert!((position.length() - 1.0).abs() < 1e-5)
            }
            other => panic!("unexpected light {other:?}"),
        }
        assert!(matches!(
            config.lights[2].kind,
            LightKind::Point { range, .. } if range == 20.0
        ));
        let faces = config.environment.unwrap();
        assert_eq!(faces.names[5], "negz.jpg");
        let SubjectConfig::Mirror(mirror) = config.subject else {
            panic!("expected a mirror");
        };
        assert_eq!(mirror.width, 2.0);
        assert_eq!(mirror.margin, 0.3);
        assert_eq!(mirror.back.color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(mirror.back.side, Side::Back);
        assert_eq!(mirror.back.shading, Shading::Unlit);
    }

    #[test]
    fn extension_shorthand_builds_default_names() {
        let xml = "<scene><environment><url>https://cdn.example/cube</url><extension>png</extension></environment></scene>";
        let config = SceneConfig::from_xml(xml).unwrap();
        let faces = config.environment.unwrap();
        assert_eq!(faces.base, FaceBase::Url("https://cdn.example/cube".into()));
        assert_eq!(faces.names[3], "negy.png");
    }

    #[test]
    fn cube_subject_replaces_mirror() {
        let xml = "<scene><cube><size>2</size><material><roughness>0.1</roughness></material></cube></scene>";
        let config = SceneConfig::from_xml(xml).unwrap();
        match config.subject {
            SubjectConfig::Cube(cube) => {
                assert_eq!(cube.size, 2.0);
                assert_eq!(cube.material.roughness, 0.1);
            }
            other => panic!("unexpected subject {other:?}"),
        }
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let xml = "<scene><camera><near>10</near><far>1</far></camera></scene>";
        let err = SceneConfig::from_xml(xml).unwrap_err();
        assert!(format!("{err:#}").contains("near < far"));
    }

    #[test]
    fn rejects_zero_margin_and_bad_face_count() {
        let xml = "<scene><mirror><margin>0</margin></mirror></scene>";
        assert!(SceneConfig::from_xml(xml).is_err());
        let xml = "<scene><environment><path>t</path><face>a.png</face></environment></scene>";
        assert!(SceneConfig::from_xml(xml).is_err());
        let xml = "<scene><light><kind>spot</kind></light></scene>";
        assert!(SceneConfig::from_xml(xml).is_err());
    }

    #[test]
    fn hex_colors_convert() {
        assert_eq!(hex_color(0xffffff), Vec3::ONE);
        assert_eq!(hex_color(0x000000), Vec3::ZERO);
        assert_eq!(hex_color(0xff0000), Vec3::new(1.0, 0.0, 0.0));
    }
}
