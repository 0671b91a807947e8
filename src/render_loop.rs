use std::f32::consts::TAU;

use log::info;

use crate::environment::Backdrop;
use crate::render::FrameTarget;
use crate::scene::Scene;
use crate::viewport::{CameraParams, Viewport};

/// Everything a target needs to draw one frame. Not retained between ticks.
pub struct Frame<'a> {
    pub index: u64,
    pub camera: CameraParams,
    pub surface: (u32, u32),
    pub backdrop: Backdrop,
    pub scene: &'a Scene,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Advances the subject by a fixed angle and renders once per tick.
///
/// The increment is not scaled by elapsed time, so the apparent speed follows
/// the host's tick rate.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    state: LoopState,
    rotation_step: f32,
    ticks: u64,
}

impl RenderLoop {
    pub fn new(rotation_step: f32) -> Self {
        Self {
            state: LoopState::Idle,
            rotation_step,
            ticks: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Moves from idle to running. Later calls do nothing.
    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            info!("render loop started ({} rad per tick)", self.rotation_step);
            self.state = LoopState::Running;
        }
    }

    /// Rotates the subject, then renders exactly one frame.
    pub fn tick<T>(
        &mut self,
        scene: &mut Scene,
        viewport: &Viewport,
        target: &mut T,
    ) -> Result<(), T::Error>
    where
        T: FrameTarget + ?Sized,
    {
        self.start();
        let rotation = &mut scene.subject.transform.rotation.y;
        *rotation = (*rotation + self.rotation_step).rem_euclid(TAU);
        self.ticks += 1;

        let frame = Frame {
            index: self.ticks,
            camera: viewport.camera(),
            surface: viewport.size(),
            backdrop: scene.backdrop(),
            scene,
        };
        target.render(&frame)
    }
}
