use glam::Vec2;

use crate::particle::Particle;

#[derive(Clone, Copy, Debug)]
pub struct PhysicsParams {
    pub repulsion_radius: f32,
    /// Displacement per tick for a particle sitting right on the pointer
    pub repulsion_strength: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            repulsion_radius: 120.0,
            repulsion_strength: 1.5,
        }
    }
}

/// Advances a particle by one tick: drift, pointer repulsion, then wrap.
///
/// There is no delta time, the drift speed is tied to the display refresh.
pub fn step(particle: &mut Particle, pointer: Vec2, bounds: Vec2, params: &PhysicsParams) {
    particle.position += particle.velocity;
    particle.position += repulsion(particle.position, pointer, params);
    particle.position = wrap(particle.position, bounds);
}

/// Displacement pushing `position` straight away from `pointer`, with a
/// linear falloff reaching zero at the repulsion radius
pub fn repulsion(position: Vec2, pointer: Vec2, params: &PhysicsParams) -> Vec2 {
    let delta = pointer - position;
    let dist = delta.length();

    // dist == 0 has no direction to push along
    if !(dist > 0.0 && dist < params.repulsion_radius) {
        return Vec2::ZERO;
    }

    let force = (params.repulsion_radius - dist) / params.repulsion_radius;
    -(delta / dist) * force * params.repulsion_strength
}

/// Toroidal snap: leaving one edge lands the particle on the opposite edge.
pub fn wrap(position: Vec2, bounds: Vec2) -> Vec2 {
    Vec2::new(wrap_axis(position.x, bounds.x), wrap_axis(position.y, bounds.y))
}

fn wrap_axis(value: f32, extent: f32) -> f32 {
    if value < 0.0 {
        just_below(extent)
    } else if value >= extent {
        0.0
    } else {
        value
    }
}

// Largest float strictly less than `edge`, keeping coordinates in [0, edge)
fn just_below(edge: f32) -> f32 {
    if edge > 0.0 && edge.is_finite() {
        f32::from_bits(edge.to_bits() - 1)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{field::ParticleField, field::FieldConfig, particle::ColorTag};

    const FAR_AWAY: Vec2 = Vec2::new(-1000.0, -1000.0);

    fn particle_at(position: Vec2, velocity: Vec2) -> Particle {
        Particle {
            position,
            velocity,
            radius: 1.0,
            opacity: 0.5,
            color: ColorTag::Primary,
        }
    }

    fn in_bounds(p: &Particle, bounds: Vec2) -> bool {
        (0.0..bounds.x).contains(&p.position.x) && (0.0..bounds.y).contains(&p.position.y)
    }

    #[test]
    fn drift_integrates_velocity() {
        let mut p = particle_at(Vec2::new(10.0, 10.0), Vec2::new(0.2, -0.1));
        step(&mut p, FAR_AWAY, Vec2::splat(100.0), &PhysicsParams::default());
        assert!(p.position.abs_diff_eq(Vec2::new(10.2, 9.9), 1e-5));
    }

    #[test]
    fn wrap_snaps_to_opposite_edge() {
        let bounds = Vec2::new(100.0, 50.0);
        let params = PhysicsParams::default();

        let mut p = particle_at(Vec2::new(0.1, 25.0), Vec2::new(-0.2, 0.0));
        step(&mut p, FAR_AWAY, bounds, &params);
        assert!(p.position.x < 100.0 && p.position.x > 99.99);

        let mut p = particle_at(Vec2::new(99.9, 49.9), Vec2::new(0.2, 0.2));
        step(&mut p, FAR_AWAY, bounds, &params);
        assert_eq!(p.position, Vec2::ZERO);
    }

    #[test]
    fn repulsion_pushes_away_for_every_distance_inside_radius() {
        let params = PhysicsParams::default();
        let bounds = Vec2::splat(2000.0);
        let pointer = Vec2::new(1000.0, 1000.0);

        for d in [0.01, 1.0, 30.0, 60.0, 90.0, 119.0, 119.9] {
            let mut p = particle_at(pointer - Vec2::new(d, 0.0), Vec2::ZERO);
            step(&mut p, pointer, bounds, &params);
            assert!(p.position.distance(pointer) > d, "d = {d}");
        }
    }

    #[test]
    fn repulsion_is_zero_outside_radius_and_at_the_pointer() {
        let params = PhysicsParams::default();
        let pointer = Vec2::new(500.0, 500.0);

        for d in [120.0, 150.0, 1000.0] {
            let position = pointer + Vec2::new(0.0, d);
            assert_eq!(repulsion(position, pointer, &params), Vec2::ZERO);
        }
        assert_eq!(repulsion(pointer, pointer, &params), Vec2::ZERO);
    }

    #[test]
    fn repulsion_falls_off_linearly() {
        let params = PhysicsParams::default();
        let push = repulsion(Vec2::new(40.0, 0.0), Vec2::new(100.0, 0.0), &params);
        assert!((push.x + 0.75).abs() < 1e-5);
        assert_eq!(push.y, 0.0);
    }

    #[test]
    fn particles_stay_in_bounds_under_drift_and_repulsion() {
        let config = FieldConfig::default();
        let params = PhysicsParams::default();
        let mut rng = StdRng::seed_from_u64(21);
        let mut field = ParticleField::new(640.0, 360.0, &config, &mut rng);
        let bounds = field.size();

        for tick in 0..2000 {
            let pointer = Vec2::new((tick % 640) as f32, (tick % 360) as f32);
            for p in field.particles_mut() {
                step(p, pointer, bounds, &params);
                assert!(in_bounds(p, bounds), "{:?} at tick {tick}", p.position);
            }
        }
    }

    #[test]
    fn far_pointer_leaves_only_drift() {
        let params = PhysicsParams::default();
        let mut rng = StdRng::seed_from_u64(100);
        let mut field = ParticleField::new(1200.0, 800.0, &FieldConfig::default(), &mut rng);
        let bounds = field.size();
        let max_drift = (0.2f32 * 0.2 + 0.2 * 0.2).sqrt() + 1e-4;

        for _ in 0..100 {
            for p in field.particles_mut() {
                let before = p.position;
                step(p, FAR_AWAY, bounds, &params);

                let delta = (p.position - before).abs();
                let wrapped = delta.x > bounds.x / 2.0 || delta.y > bounds.y / 2.0;
                assert!(wrapped || delta.length() <= max_drift, "{delta:?}");
            }
        }
    }
}
