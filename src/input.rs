//! Pointer and viewport input, normalized for the simulation.

use std::{cell::Cell, rc::Rc};

use clap::ValueEnum;
use glam::Vec2;
use log::{info, warn};

/// Pointer position used before any pointer activity, far enough from the
/// surface that nothing is ever within repulsion range
pub const FAR_AWAY: Vec2 = Vec2::new(-1000.0, -1000.0);

/// Pointer position shared between one `InputAdapter` and one driver.
///
/// Everything runs on the event loop thread, so a plain `Cell` is enough.
#[derive(Clone, Debug)]
pub struct PointerBinding(Rc<Cell<Vec2>>);

impl Default for PointerBinding {
    fn default() -> Self {
        Self(Rc::new(Cell::new(FAR_AWAY)))
    }
}

impl PointerBinding {
    pub fn position(&self) -> Vec2 {
        self.0.get()
    }

    pub fn is_active(&self) -> bool {
        self.position() != FAR_AWAY
    }

    fn set(&self, position: Vec2) {
        self.0.set(position);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PointerMode {
    /// Use the pointer when the platform has a precise one
    Auto,
    Fine,
    /// Never feed pointer positions, as on touch-only devices
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerCapability {
    Fine,
    Coarse,
}

impl PointerCapability {
    /// Resolved once at startup
    pub fn detect(mode: PointerMode) -> Self {
        let capability = match mode {
            PointerMode::Fine => Self::Fine,
            PointerMode::None => Self::Coarse,
            PointerMode::Auto if cfg!(any(target_os = "android", target_os = "ios")) => {
                Self::Coarse
            }
            PointerMode::Auto => Self::Fine,
        };

        info!("Pointer capability: {capability:?}");
        capability
    }
}

pub struct InputAdapter {
    pointer: PointerBinding,
    capability: PointerCapability,
}

impl InputAdapter {
    pub fn new(capability: PointerCapability) -> Self {
        Self {
            pointer: PointerBinding::default(),
            capability,
        }
    }

    /// A handle on the pointer this adapter writes to
    pub fn pointer(&self) -> PointerBinding {
        self.pointer.clone()
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if self.capability != PointerCapability::Fine {
            return;
        }

        let position = Vec2::new(x as f32, y as f32);
        if !position.is_finite() {
            warn!("Discarding non-finite pointer position ({x}, {y})");
            return;
        }

        self.pointer.set(position);
    }

    /// Surface bounds for a reseed after a viewport change
    pub fn resized(&self, width: u32, height: u32) -> Vec2 {
        Vec2::new(width as f32, height as f32)
    }
}
