use std::collections::HashMap;

use glam::{IVec2, Vec2};

use crate::{color::Rgb, particle::Particle, surface::Surface};

/// Above this many particles the pair scan goes through a `SpatialGrid`
pub const BRUTE_FORCE_LIMIT: usize = 80;

#[derive(Clone, Copy, Debug)]
pub struct ConnectionStyle {
    pub radius: f32,
    /// Stroke alpha for two coincident particles
    pub max_alpha: f32,
    pub width: f32,
    pub color: Rgb,
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        Self {
            radius: 150.0,
            max_alpha: 0.12,
            width: 0.5,
            color: Rgb::ACCENT_GREEN,
        }
    }
}

/// Stroke alpha for a pair `distance` apart, `None` when they are too far
/// apart to connect
pub fn connection_alpha(distance: f32, style: &ConnectionStyle) -> Option<f32> {
    (distance < style.radius)
        .then(|| (style.radius - distance) / style.radius * style.max_alpha)
}

/// Draws a faint line between every pair of particles closer than the
/// connection radius.
pub fn render_connections<S: Surface>(
    particles: &[Particle],
    style: &ConnectionStyle,
    surface: &mut S,
) {
    if particles.len() <= BRUTE_FORCE_LIMIT {
        for (i, a) in particles.iter().enumerate() {
            for b in &particles[i + 1..] {
                connect(a, b, style, surface);
            }
        }
    } else {
        let grid = SpatialGrid::new(particles, style.radius);
        grid.for_each_candidate(|i, j| connect(&particles[i], &particles[j], style, surface));
    }
}

fn connect<S: Surface>(a: &Particle, b: &Particle, style: &ConnectionStyle, surface: &mut S) {
    let distance = a.position.distance(b.position);
    if let Some(alpha) = connection_alpha(distance, style) {
        surface.stroke_line(a.position, b.position, style.width, style.color.with_alpha(alpha));
    }
}

/// Uniform grid bucketing particle indices by `floor(position / cell_size)`.
///
/// With `cell_size` equal to the connection radius every connectable pair
/// lies in the same or an adjacent cell.
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<IVec2, Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(particles: &[Particle], cell_size: f32) -> Self {
        let mut grid = Self {
            cell_size,
            cells: HashMap::new(),
        };

        for (i, p) in particles.iter().enumerate() {
            let cell = grid.cell_of(p.position);
            grid.cells.entry(cell).or_default().push(i);
        }

        grid
    }

    fn cell_of(&self, position: Vec2) -> IVec2 {
        (position / self.cell_size).floor().as_ivec2()
    }

    /// Calls `f(i, j)` with `i < j` once for every pair sharing a 3x3
    /// neighbourhood
    pub fn for_each_candidate(&self, mut f: impl FnMut(usize, usize)) {
        for (cell, members) in &self.cells {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let Some(neighbours) = self.cells.get(&(*cell + IVec2::new(dx, dy))) else {
                        continue;
                    };

                    for &i in members {
                        for &j in neighbours {
                            if i < j {
                                f(i, j);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        field::{FieldConfig, ParticleField},
        particle::ColorTag,
        surface::DrawList,
    };

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            radius: 1.0,
            opacity: 0.5,
            color: ColorTag::Primary,
        }
    }

    fn line_keys(list: &DrawList) -> Vec<[u32; 4]> {
        let mut keys: Vec<_> = list
            .lines
            .iter()
            .map(|l| {
                let (a, b) = if (l.from.x, l.from.y) <= (l.to.x, l.to.y) {
                    (l.from, l.to)
                } else {
                    (l.to, l.from)
                };
                [a.x.to_bits(), a.y.to_bits(), b.x.to_bits(), b.y.to_bits()]
            })
            .collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn alpha_falls_off_linearly() {
        let style = ConnectionStyle::default();
        assert_eq!(connection_alpha(0.0, &style), Some(0.12));
        assert!((connection_alpha(75.0, &style).unwrap() - 0.06).abs() < 1e-6);
        assert_eq!(connection_alpha(150.0, &style), None);
        assert_eq!(connection_alpha(400.0, &style), None);
    }

    #[test]
    fn only_close_pairs_are_connected() {
        let style = ConnectionStyle::default();
        let particles = [
            particle_at(0.0, 0.0),
            particle_at(75.0, 0.0),
            particle_at(300.0, 0.0),
        ];
        let mut list = DrawList::new();
        render_connections(&particles, &style, &mut list);

        assert_eq!(list.lines.len(), 1);
        let line = list.lines[0];
        assert_eq!((line.from, line.to), (Vec2::ZERO, Vec2::new(75.0, 0.0)));
        assert_eq!(line.width, 0.5);
        assert!((line.color[3] - 0.06).abs() < 1e-6);
        assert_eq!(line.color[..3], Rgb::ACCENT_GREEN.with_alpha(1.0)[..3]);
    }

    #[test]
    fn coincident_particles_connect_at_full_alpha() {
        let style = ConnectionStyle::default();
        let particles = [particle_at(10.0, 10.0), particle_at(10.0, 10.0)];
        let mut list = DrawList::new();
        render_connections(&particles, &style, &mut list);

        assert_eq!(list.lines.len(), 1);
        assert!((list.lines[0].color[3] - 0.12).abs() < 1e-6);
    }

    #[test]
    fn grid_finds_the_same_pairs_as_the_full_scan() {
        let style = ConnectionStyle::default();
        let config = FieldConfig {
            max_particles: 600,
            density_divisor: 2000.0,
            ..FieldConfig::default()
        };
        let field = ParticleField::new(1600.0, 900.0, &config, &mut StdRng::seed_from_u64(8));
        assert!(field.len() > BRUTE_FORCE_LIMIT);

        let mut via_grid = DrawList::new();
        render_connections(field.particles(), &style, &mut via_grid);

        let mut brute = DrawList::new();
        for (i, a) in field.particles().iter().enumerate() {
            for b in &field.particles()[i + 1..] {
                connect(a, b, &style, &mut brute);
            }
        }

        assert!(!brute.lines.is_empty());
        assert_eq!(line_keys(&via_grid), line_keys(&brute));
    }
}
