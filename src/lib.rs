//! A small 3D stage: one subject (a framed mirror or a cube) spinning in
//! front of a perspective camera, lit by a configurable rig and surrounded
//! by an optional cube-map environment.
//!
//! Scene assembly, environment loading and the animation loop are plain
//! data and run headless; the wgpu renderer is one [`FrameTarget`] among
//! others.

pub mod app;
pub mod config;
pub mod environment;
pub mod lighting;
pub mod material;
pub mod render;
pub mod render_loop;
pub mod scene;
pub mod viewport;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{print_summary, SceneHandle};
pub use config::{
    hex_color, CameraConfig, ConfigError, CubeConfig, MirrorConfig, SceneConfig, SubjectConfig,
    FALLBACK_COLOR, PRESETS,
};
#[cfg(not(target_arch = "wasm32"))]
pub use environment::spawn_load;
pub use environment::{
    Backdrop, CubeFaces, EnvironmentError, EnvironmentMap, EnvironmentSlot, EnvironmentState,
    FaceFetcher, FaceRef, FaceSet, NativeFetcher,
};
pub use lighting::{LightDescriptor, LightKind, LightingRig};
pub use material::{MaterialSpec, Shading, Side};
pub use render::{FrameRecord, FrameTarget, HeadlessTarget, Renderer};
pub use render_loop::{Frame, LoopState, RenderLoop};
pub use scene::{build_cube, build_mirror_assembly, Geometry, MeshPart, Scene, SceneObject};
pub use viewport::{CameraParams, Viewport};
