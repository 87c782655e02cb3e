//! The animation loop: one tick per display frame, at most one tick pending.

use glam::Vec2;
use log::{debug, info, warn};
use rand::Rng;

use crate::{
    connections::{render_connections, ConnectionStyle},
    field::{FieldConfig, ParticleField},
    input::PointerBinding,
    physics::{self, PhysicsParams},
    surface::Surface,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// "Run a tick before the next repaint" primitive of the host
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
}

#[derive(Clone, Debug, Default)]
pub struct DriverSettings {
    pub field: FieldConfig,
    pub physics: PhysicsParams,
    pub connections: ConnectionStyle,
}

pub struct AnimationDriver<F, R> {
    settings: DriverSettings,
    field: ParticleField,
    pointer: PointerBinding,
    scheduler: F,
    rng: R,

    pending: Option<FrameHandle>,
    frames: u64,
}

impl<F: FrameScheduler, R: Rng> AnimationDriver<F, R> {
    /// Starts `Idle` with an empty field, `resize` seeds it.
    pub fn new(
        settings: DriverSettings,
        pointer: PointerBinding,
        scheduler: F,
        mut rng: R,
    ) -> Self {
        let field = ParticleField::new(0.0, 0.0, &settings.field, &mut rng);

        Self {
            settings,
            field,
            pointer,
            scheduler,
            rng,

            pending: None,
            frames: 0,
        }
    }

    /// Cancels any pending tick before scheduling the first one of a new chain
    pub fn start(&mut self) {
        if let Some(handle) = self.pending.take() {
            debug!("Cancelling pending frame {handle:?}");
            self.scheduler.cancel_frame(handle);
        }

        self.pending = Some(self.scheduler.request_frame());
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
            info!("Animation stopped after {} frames", self.frames);
        }
    }

    /// Discards the field, seeds one for the new bounds and restarts the loop
    pub fn resize(&mut self, width: f32, height: f32) {
        self.seed_field(width, height);
        self.start();
    }

    /// Fresh particles for the current bounds. A stopped driver stays
    /// stopped, `draw` shows the new field without advancing it.
    pub fn reseed(&mut self) {
        let size = self.field.size();
        self.seed_field(size.x, size.y);

        if self.state() == DriverState::Running {
            self.start();
        }
    }

    fn seed_field(&mut self, width: f32, height: f32) {
        self.field
            .reseed(width, height, &self.settings.field, &mut self.rng);
        if self.field.is_empty() {
            warn!("A {width}x{height} surface is too small for any particles");
        } else {
            info!(
                "Field reseeded with {} particles for {width}x{height}",
                self.field.len()
            );
        }
    }

    /// Runs one tick if `handle` is the pending frame. Stale handles from a
    /// cancelled chain are ignored and `false` is returned.
    pub fn tick<S: Surface>(&mut self, handle: FrameHandle, surface: &mut S) -> bool {
        if self.pending != Some(handle) {
            debug!("Ignoring stale frame {handle:?}");
            return false;
        }
        self.pending = None;

        let pointer = self.pointer.position();
        let bounds = self.field.size();
        for particle in self.field.particles_mut() {
            physics::step(particle, pointer, bounds, &self.settings.physics);
        }
        self.draw(surface);

        self.frames += 1;
        self.pending = Some(self.scheduler.request_frame());
        true
    }

    /// Paints the field as it stands, without stepping it
    pub fn draw<S: Surface>(&self, surface: &mut S) {
        let palette = self.settings.field.particle.palette;

        surface.clear();
        for particle in self.field.particles() {
            surface.fill_circle(
                particle.position,
                particle.radius,
                palette.resolve(particle.color).with_alpha(particle.opacity),
            );
        }
        render_connections(self.field.particles(), &self.settings.connections, surface);
    }

    pub fn state(&self) -> DriverState {
        if self.pending.is_some() {
            DriverState::Running
        } else {
            DriverState::Idle
        }
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer.position()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }
}
