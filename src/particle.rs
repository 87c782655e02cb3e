use std::ops::Range;

use glam::Vec2;
use rand::Rng;

use crate::color::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorTag {
    Primary,
    Secondary,
}

#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub primary: Rgb,
    pub secondary: Rgb,
    /// Probability of a particle being tagged `Secondary`
    pub secondary_chance: f64,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Rgb::ACCENT_GREEN,
            secondary: Rgb::GOLD,
            secondary_chance: 0.3,
        }
    }
}

impl Palette {
    pub fn resolve(&self, tag: ColorTag) -> Rgb {
        match tag {
            ColorTag::Primary => self.primary,
            ColorTag::Secondary => self.secondary,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ParticleConfig {
    /// Each velocity component is drawn from `-speed..speed`
    pub speed: f32,
    pub radius: Range<f32>,
    pub opacity: Range<f32>,
    pub palette: Palette,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            speed: 0.2,
            radius: 0.5..2.5,
            opacity: 0.1..0.6,
            palette: Palette::default(),
        }
    }
}

/// One drifting point.
///
/// `velocity` never changes after creation. Pointer repulsion nudges
/// `position` directly, so near the pointer the observed motion differs
/// from the stored velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub opacity: f32,
    pub color: ColorTag,
}

impl Particle {
    /// `bounds` must be strictly positive on both axes.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, bounds: Vec2, config: &ParticleConfig) -> Self {
        let chance = config.palette.secondary_chance;
        let chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };
        let color = if rng.gen_bool(chance) {
            ColorTag::Secondary
        } else {
            ColorTag::Primary
        };

        Self {
            position: Vec2::new(rng.gen_range(0.0..bounds.x), rng.gen_range(0.0..bounds.y)),
            velocity: Vec2::new(
                rng.gen_range(-config.speed..=config.speed),
                rng.gen_range(-config.speed..=config.speed),
            ),
            radius: rng.gen_range(config.radius.clone()),
            opacity: rng.gen_range(config.opacity.clone()),
            color,
        }
    }
}
