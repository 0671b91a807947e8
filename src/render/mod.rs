use std::convert::Infallible;

use crate::environment::Backdrop;
use crate::render_loop::Frame;

pub mod geometry;
mod gpu;
mod shader;

pub use gpu::Renderer;

/// Anything the render loop can draw into.
pub trait FrameTarget {
    type Error;

    /// Resizes the drawing surface; called before the next frame.
    fn resize(&mut self, width: u32, height: u32);

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error>;
}

/// What a headless run observed about the most recent frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub index: u64,
    pub surface: (u32, u32),
    pub aspect: f32,
    pub backdrop: Backdrop,
    pub rotation: f32,
    pub reflecting_parts: usize,
}

/// Target without a GPU: counts frames and remembers the last one.
#[derive(Debug, Clone)]
pub struct HeadlessTarget {
    surface: (u32, u32),
    frames: u64,
    last: Option<FrameRecord>,
}

impl HeadlessTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: (width, height),
            frames: 0,
            last: None,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn surface(&self) -> (u32, u32) {
        self.surface
    }

    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.last.as_ref()
    }
}

impl FrameTarget for HeadlessTarget {
    type Error = Infallible;

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface = (width, height);
    }

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), Infallible> {
        let environment = frame.scene.environment.state();
        let subject = &frame.scene.subject;
        let projection = frame.camera.projection;
        self.frames += 1;
        self.last = Some(FrameRecord {
            index: frame.index,
            surface: self.surface,
            aspect: projection.y_axis.y / projection.x_axis.x,
            backdrop: frame.backdrop.clone(),
            rotation: subject.transform.rotation.y,
            reflecting_parts: subject
                .parts
                .iter()
                .filter(|part| part.material.reflection_active(environment))
                .count(),
        });
        Ok(())
    }
}
