use clap::Parser;

use crate::{
    color::Rgb,
    connections::ConnectionStyle,
    driver::DriverSettings,
    field::FieldConfig,
    input::PointerMode,
    particle::{Palette, ParticleConfig},
    physics::PhysicsParams,
};

/// A drifting particle constellation that shies away from the cursor
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Upper bound on the particle count, whatever the window size
    #[arg(short, long, default_value_t = 80)]
    pub max_particles: usize,

    /// Window area in square pixels per particle
    #[arg(short, long, default_value_t = 15000.0)]
    pub density: f32,

    /// Cap the framerate, by default frames follow the display refresh
    #[arg(short, long)]
    pub framerate: Option<u32>,

    /// Seed the particle generator for a reproducible field
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Whether pointer positions repel particles
    #[arg(short, long, value_enum, default_value_t = PointerMode::Auto)]
    pub pointer: PointerMode,

    /// Particle and connection color, `#rrggbb` or `r,g,b`
    #[arg(long, default_value_t = Rgb::ACCENT_GREEN)]
    pub primary: Rgb,

    /// Color of the less common particles
    #[arg(long, default_value_t = Rgb::GOLD)]
    pub secondary: Rgb,

    /// Probability of a particle using the secondary color
    #[arg(long, default_value_t = 0.3, value_parser = parse_chance)]
    pub secondary_chance: f64,

    #[arg(long, default_value_t = Rgb::BACKGROUND)]
    pub background: Rgb,

    /// Start in borderless fullscreen
    #[arg(long)]
    pub fullscreen: bool,
}

/// A probability, finite and within `0..=1`
fn parse_chance(s: &str) -> Result<f64, String> {
    let chance: f64 = s
        .trim()
        .parse()
        .map_err(|err| format!("invalid probability `{s}`: {err}"))?;

    if (0.0..=1.0).contains(&chance) {
        Ok(chance)
    } else {
        Err(format!("probability must be between 0 and 1, got `{s}`"))
    }
}

impl Args {
    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            field: FieldConfig {
                max_particles: self.max_particles,
                density_divisor: self.density,
                particle: ParticleConfig {
                    palette: Palette {
                        primary: self.primary,
                        secondary: self.secondary,
                        secondary_chance: self.secondary_chance,
                    },
                    ..ParticleConfig::default()
                },
            },
            physics: PhysicsParams::default(),
            connections: ConnectionStyle {
                color: self.primary,
                ..ConnectionStyle::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_built_in_settings() {
        let args = Args::try_parse_from(["constellation"]).unwrap();
        let settings = args.driver_settings();

        assert_eq!(settings.field.max_particles, 80);
        assert_eq!(settings.field.density_divisor, 15000.0);
        assert_eq!(settings.field.particle.palette.primary, Rgb::ACCENT_GREEN);
        assert_eq!(settings.connections.color, Rgb::ACCENT_GREEN);
        assert_eq!(args.pointer, PointerMode::Auto);
        assert!(args.framerate.is_none());
    }

    #[test]
    fn colors_and_pointer_mode_are_parsed() {
        let args = Args::try_parse_from([
            "constellation",
            "--primary",
            "#ff0000",
            "--secondary",
            "0,0,255",
            "--pointer",
            "none",
            "--seed",
            "4",
        ])
        .unwrap();
        let settings = args.driver_settings();

        assert_eq!(settings.connections.color, Rgb::new(255, 0, 0));
        assert_eq!(settings.field.particle.palette.secondary, Rgb::new(0, 0, 255));
        assert_eq!(args.pointer, PointerMode::None);
        assert_eq!(args.seed, Some(4));
    }

    #[test]
    fn bad_color_is_rejected() {
        assert!(Args::try_parse_from(["constellation", "--primary", "green"]).is_err());
    }

    #[test]
    fn secondary_chance_must_be_a_probability() {
        for value in ["nan", "NaN", "inf", "-0.1", "1.5", "often"] {
            let parsed = Args::try_parse_from(["constellation", "--secondary-chance", value]);
            assert!(parsed.is_err(), "{value} was accepted");
        }

        let args = Args::try_parse_from(["constellation", "--secondary-chance", "1"]).unwrap();
        assert_eq!(args.driver_settings().field.particle.palette.secondary_chance, 1.0);
    }
}
