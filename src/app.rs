use log::{debug, warn};

use crate::config::{ConfigError, SceneConfig};
use crate::environment::{Backdrop, CubeFaces, EnvironmentError, EnvironmentSlot, FaceBase};
use crate::render::FrameTarget;
use crate::render_loop::RenderLoop;
use crate::scene::Scene;
use crate::viewport::Viewport;

/// A running scene: the world, its viewport, the target it draws into and
/// the loop that animates it.
pub struct SceneHandle<T: FrameTarget> {
    pub scene: Scene,
    pub viewport: Viewport,
    pub target: T,
    pub render_loop: RenderLoop,
    pending: Option<EnvironmentSlot>,
}

impl<T: FrameTarget> SceneHandle<T> {
    /// Validates `config` and assembles the scene. Nothing is drawn yet.
    pub fn initialize(
        config: &SceneConfig,
        width: u32,
        height: u32,
        target: T,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let scene = Scene::build(config);
        debug!(
            "scene '{}' built with {} parts and {} lights",
            config.name,
            scene.subject.parts.len(),
            scene.lights.len()
        );
        Ok(Self {
            scene,
            viewport: Viewport::initialize(config.camera, width, height),
            target,
            render_loop: RenderLoop::new(config.rotation_step),
            pending: None,
        })
    }

    /// Hands over a background load; its result is applied on a later tick.
    pub fn attach_environment(&mut self, slot: EnvironmentSlot) {
        if !self.scene.environment.is_pending() {
            warn!("environment already settled; ignoring a second load");
            return;
        }
        self.pending = Some(slot);
    }

    /// Applies a load result directly. Returns false once the map has settled.
    pub fn resolve_environment(&mut self, result: Result<CubeFaces, EnvironmentError>) -> bool {
        self.pending = None;
        self.scene.environment.resolve(result)
    }

    /// Propagates a surface resize to the camera and the target.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.viewport.on_resize(width, height) {
            self.target.resize(width, height);
        }
    }

    /// One animation step: settle the environment if its load finished,
    /// then rotate and draw.
    pub fn tick(&mut self) -> Result<(), T::Error> {
        self.poll_environment();
        self.render_loop
            .tick(&mut self.scene, &self.viewport, &mut self.target)
    }

    pub fn backdrop(&self) -> Backdrop {
        self.scene.backdrop()
    }

    fn poll_environment(&mut self) {
        let Some(result) = self.pending.as_ref().and_then(EnvironmentSlot::take) else {
            return;
        };
        self.resolve_environment(result);
    }
}

/// Prints where the scene ended up, one line per part.
pub fn print_summary<T: FrameTarget>(handle: &SceneHandle<T>) {
    let scene = &handle.scene;
    let (width, height) = handle.viewport.size();
    println!(
        "Scene '{}' after {} ticks ({}x{})",
        scene.subject.name,
        handle.render_loop.ticks(),
        width,
        height
    );
    println!("Environment: {}", scene.environment.state().label());
    if let Some(source) = scene.environment.source() {
        match &source.base {
            FaceBase::Directory(dir) => println!("Environment source: {}", dir.display()),
            FaceBase::Url(url) => println!("Environment source: {url}"),
        }
    }
    match handle.backdrop() {
        Backdrop::Color(color) => println!("Backdrop: color {}", hex_string(color)),
        Backdrop::Environment(faces) => {
            println!("Backdrop: environment {}x{}", faces.size(), faces.size())
        }
    }
    println!(
        "Rotation: {:.4} rad",
        scene.subject.transform.rotation.y
    );
    for part in &scene.subject.parts {
        let position = part.transform.position;
        println!(
            " - {} pos=({:.3}, {:.3}, {:.3}) color={} reflective={}",
            part.name,
            position.x,
            position.y,
            position.z,
            hex_string(part.material.color),
            part.material.reflection_active(scene.environment.state())
        );
    }
}

fn hex_string(color: glam::Vec3) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(color.x),
        channel(color.y),
        channel(color.z)
    )
}
