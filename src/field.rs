use glam::Vec2;
use log::debug;
use rand::Rng;

use crate::particle::{Particle, ParticleConfig};

#[derive(Clone, Debug)]
pub struct FieldConfig {
    pub max_particles: usize,
    /// Surface area, in square pixels, per particle
    pub density_divisor: f32,
    pub particle: ParticleConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            max_particles: 80,
            density_divisor: 15000.0,
            particle: ParticleConfig::default(),
        }
    }
}

/// `min(max_particles, floor(width * height / density_divisor))`, zero for a
/// degenerate surface
pub fn particle_count(width: f32, height: f32, config: &FieldConfig) -> usize {
    if !(width > 0.0 && height > 0.0 && config.density_divisor > 0.0) {
        return 0;
    }

    let by_area = (width as f64 * height as f64 / config.density_divisor as f64).floor();
    if !by_area.is_finite() {
        return 0;
    }

    (by_area as usize).min(config.max_particles)
}

/// All live particles plus the surface they live on
pub struct ParticleField {
    particles: Vec<Particle>,
    size: Vec2,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(
        width: f32,
        height: f32,
        config: &FieldConfig,
        rng: &mut R,
    ) -> Self {
        let count = particle_count(width, height, config);
        let size = Vec2::new(width, height);
        let particles = (0..count)
            .map(|_| Particle::random(rng, size, &config.particle))
            .collect();

        debug!("Seeded {count} particles on a {width}x{height} surface");

        Self { particles, size }
    }

    /// Discards every particle and seeds a fresh set for the new size
    pub fn reseed<R: Rng + ?Sized>(
        &mut self,
        width: f32,
        height: f32,
        config: &FieldConfig,
        rng: &mut R,
    ) {
        *self = Self::new(width, height, config, rng);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn count_follows_surface_area() {
        let config = FieldConfig::default();
        assert_eq!(particle_count(800.0, 600.0, &config), 32);
        assert_eq!(particle_count(1200.0, 800.0, &config), 64);
    }

    #[test]
    fn count_is_capped() {
        let config = FieldConfig::default();
        assert_eq!(particle_count(4000.0, 4000.0, &config), 80);

        let uncapped = FieldConfig {
            max_particles: usize::MAX,
            ..FieldConfig::default()
        };
        assert_eq!(particle_count(4000.0, 4000.0, &uncapped), 1066);
    }

    #[test]
    fn degenerate_surface_is_empty() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(0);

        for (w, h) in [(0.0, 600.0), (800.0, 0.0), (-800.0, -600.0), (100.0, 100.0)] {
            let field = ParticleField::new(w, h, &config, &mut rng);
            assert!(field.is_empty(), "{w}x{h}");
        }
        assert_eq!(particle_count(f32::NAN, 600.0, &config), 0);
    }

    #[test]
    fn particles_start_inside_the_surface() {
        let mut rng = StdRng::seed_from_u64(9);
        let field = ParticleField::new(1920.0, 1080.0, &FieldConfig::default(), &mut rng);

        assert_eq!(field.len(), 80);
        assert_eq!(field.size(), Vec2::new(1920.0, 1080.0));
        for p in field.particles() {
            assert!((0.0..1920.0).contains(&p.position.x));
            assert!((0.0..1080.0).contains(&p.position.y));
        }
    }

    #[test]
    fn reseed_with_same_size_keeps_count_but_not_positions() {
        let config = FieldConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut field = ParticleField::new(800.0, 600.0, &config, &mut rng);
        let before = field.particles().to_vec();

        field.reseed(800.0, 600.0, &config, &mut rng);
        assert_eq!(field.len(), before.len());
        assert_ne!(field.particles(), &before[..]);

        field.reseed(800.0, 600.0, &config, &mut rng);
        assert_eq!(field.len(), 32);
    }

    #[test]
    fn seeded_rng_gives_reproducible_fields() {
        let config = FieldConfig::default();
        let a = ParticleField::new(800.0, 600.0, &config, &mut StdRng::seed_from_u64(5));
        let b = ParticleField::new(800.0, 600.0, &config, &mut StdRng::seed_from_u64(5));
        assert_eq!(a.particles(), b.particles());
    }
}
