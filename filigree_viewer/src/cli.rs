use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use filigree_scene::config::SceneConfig;

#[derive(Parser, Debug)]
#[command(about = "Animated string-art globe rendered with wgpu", version)]
pub struct Args {
    /// Surface points fed to the chord builder
    #[arg(long, default_value_t = 80)]
    pub points: usize,

    /// Chord attempts; accepted strings may be fewer
    #[arg(long, default_value_t = 200)]
    pub lines: usize,

    /// Globe radius in world units
    #[arg(long, default_value_t = 2.5)]
    pub radius: f32,

    /// Particles floating in the shell around the globe
    #[arg(long, default_value_t = 150)]
    pub particles: usize,

    /// Pulsing glow markers on the globe surface
    #[arg(long, default_value_t = 60)]
    pub glow_points: usize,

    /// Seed for reproducible chord selection and ambient placement
    #[arg(long)]
    pub seed: Option<u64>,

    /// Optional scene preset JSON; set fields override the flags above
    #[arg(long)]
    pub preset: Option<PathBuf>,

    /// Run the simulation without a window; exits once the globe settles
    #[arg(long)]
    pub headless: bool,

    /// Upper bound on simulated seconds in headless mode
    #[arg(long, default_value_t = 30.0)]
    pub headless_seconds: f32,
}

/// Scene preset file. Every field is optional; missing fields fall back to
/// whatever the CLI flags resolved to.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScenePreset {
    #[serde(default)]
    pub points: Option<usize>,
    #[serde(default)]
    pub lines: Option<usize>,
    #[serde(default)]
    pub radius: Option<f32>,
    #[serde(default)]
    pub particles: Option<usize>,
    #[serde(default)]
    pub glow_points: Option<usize>,
    #[serde(default)]
    pub formation_duration: Option<f32>,
    #[serde(default)]
    pub formation_stagger: Option<f32>,
    #[serde(default)]
    pub seed: Option<u64>,
}

pub fn load_scene_preset(path: &Path) -> Result<ScenePreset> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading scene preset {}", path.display()))?;
    let preset: ScenePreset = serde_json::from_str(&data)
        .with_context(|| format!("parsing scene preset {}", path.display()))?;
    Ok(preset)
}

/// CLI flags first, preset fields on top.
pub fn resolve_config(args: &Args, preset: Option<&ScenePreset>) -> SceneConfig {
    let mut config = SceneConfig {
        radius: args.radius,
        point_count: args.points,
        line_attempts: args.lines,
        particle_count: args.particles,
        glow_count: args.glow_points,
        seed: args.seed,
        ..SceneConfig::default()
    };

    if let Some(preset) = preset {
        if let Some(points) = preset.points {
            config.point_count = points;
        }
        if let Some(lines) = preset.lines {
            config.line_attempts = lines;
        }
        if let Some(radius) = preset.radius {
            config.radius = radius;
        }
        if let Some(particles) = preset.particles {
            config.particle_count = particles;
        }
        if let Some(glow_points) = preset.glow_points {
            config.glow_count = glow_points;
        }
        if let Some(duration) = preset.formation_duration {
            config.formation_duration = duration;
        }
        if let Some(stagger) = preset.formation_stagger {
            config.formation_stagger = stagger;
        }
        if let Some(seed) = preset.seed {
            config.seed = Some(seed);
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn default_args() -> Args {
        Args::parse_from(["filigree_viewer"])
    }

    #[test]
    fn default_flags_match_the_scene_defaults() {
        let config = resolve_config(&default_args(), None);
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn preset_fields_override_flags() {
        let args = Args::parse_from(["filigree_viewer", "--points", "40", "--seed", "5"]);
        let preset = ScenePreset {
            points: Some(120),
            formation_duration: Some(1.5),
            ..ScenePreset::default()
        };
        let config = resolve_config(&args, Some(&preset));
        assert_eq!(config.point_count, 120);
        assert_eq!(config.formation_duration, 1.5);
        // Flags without a preset override survive.
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.line_attempts, 200);
    }

    #[test]
    fn preset_loads_with_missing_fields_defaulted() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "radius": 4.0, "glow_points": 10 }}"#).expect("write preset");
        let preset = load_scene_preset(file.path()).expect("preset parses");
        assert_eq!(preset.radius, Some(4.0));
        assert_eq!(preset.glow_points, Some(10));
        assert_eq!(preset.points, None);
        assert_eq!(preset.seed, None);
    }

    #[test]
    fn malformed_preset_reports_the_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write preset");
        let err = load_scene_preset(file.path()).expect_err("parse fails");
        assert!(format!("{err:#}").contains(&file.path().display().to_string()));
    }

    #[test]
    fn missing_preset_reports_the_path() {
        let err = load_scene_preset(Path::new("/nonexistent/preset.json"))
            .expect_err("read fails");
        assert!(format!("{err:#}").contains("/nonexistent/preset.json"));
    }
}
