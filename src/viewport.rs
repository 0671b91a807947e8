use glam::{Mat4, Vec3};
use log::debug;

use crate::config::CameraConfig;

/// Camera matrices consumed by the renderer's uniform buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraParams {
    pub view: Mat4,
    pub projection: Mat4,
    pub position: Vec3,
}

impl CameraParams {
    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Inverse of the rotation-only view-projection, for backdrop lookups.
    pub fn inverse_sky_view_proj(&self) -> Mat4 {
        let mut rotation_only = self.view;
        rotation_only.w_axis = glam::Vec4::W;
        (self.projection * rotation_only).inverse()
    }
}

/// Surface size plus the perspective camera that fills it.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    aspect: f32,
    camera: CameraConfig,
}

impl Viewport {
    /// Creates the viewport for a surface of `width` x `height` pixels.
    pub fn initialize(camera: CameraConfig, width: u32, height: u32) -> Self {
        let mut viewport = Self {
            width: 1,
            height: 1,
            aspect: 1.0,
            camera,
        };
        viewport.on_resize(width, height);
        viewport
    }

    /// Recomputes the aspect ratio and surface size.
    ///
    /// Zero-sized surfaces (minimized windows) keep the previous state.
    pub fn on_resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            debug!("ignoring resize to {width}x{height}");
            return false;
        }
        self.width = width;
        self.height = height;
        self.aspect = width as f32 / height as f32;
        debug!("viewport resized to {width}x{height} (aspect {:.3})", self.aspect);
        true
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn camera_config(&self) -> &CameraConfig {
        &self.camera
    }

    pub fn camera(&self) -> CameraParams {
        let position = Vec3::new(0.0, 0.0, self.camera.distance);
        let view = Mat4::look_at_rh(position, Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(
            self.camera.fov_degrees.to_radians(),
            self.aspect,
            self.camera.near,
            self.camera.far,
        );
        CameraParams {
            view,
            projection,
            position,
        }
    }
}
