//! Scene parameters and their validation. Construction from a validated
//! config cannot fail, so every range check lives here at the boundary.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("globe radius must be positive (got {0})")]
    NonPositiveRadius(f32),
    #[error("sphere distribution needs at least 2 points (got {0})")]
    TooFewPoints(usize),
    #[error("formation duration must be positive (got {0})")]
    NonPositiveDuration(f32),
    #[error("formation stagger must not be negative (got {0})")]
    NegativeStagger(f32),
}

/// Everything that shapes one globe instance. Counts are fixed for the life
/// of the scene; nothing is created or destroyed after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    /// Sphere radius in world units.
    pub radius: f32,
    /// Points fed to the golden-angle distribution.
    pub point_count: usize,
    /// Chord attempts. Accepted lines may be fewer; that is not retried.
    pub line_attempts: usize,
    /// Particles in the shell around the globe.
    pub particle_count: usize,
    /// Pulsing surface markers.
    pub glow_count: usize,
    /// Seconds one line takes from spawn to its sphere position.
    pub formation_duration: f32,
    /// Per-line start delay increment, seconds.
    pub formation_stagger: f32,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            radius: 2.5,
            point_count: 80,
            line_attempts: 200,
            particle_count: 150,
            glow_count: 60,
            formation_duration: 3.0,
            formation_stagger: 0.01,
            seed: None,
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius(self.radius));
        }
        if self.point_count < 2 {
            return Err(ConfigError::TooFewPoints(self.point_count));
        }
        if !(self.formation_duration > 0.0) {
            return Err(ConfigError::NonPositiveDuration(self.formation_duration));
        }
        if self.formation_stagger < 0.0 {
            return Err(ConfigError::NegativeStagger(self.formation_stagger));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(SceneConfig::default().validate(), Ok(()));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let base = SceneConfig::default();

        let zero_radius = SceneConfig {
            radius: 0.0,
            ..base
        };
        assert_eq!(
            zero_radius.validate(),
            Err(ConfigError::NonPositiveRadius(0.0))
        );

        let one_point = SceneConfig {
            point_count: 1,
            ..base
        };
        assert_eq!(one_point.validate(), Err(ConfigError::TooFewPoints(1)));

        let nan_duration = SceneConfig {
            formation_duration: f32::NAN,
            ..base
        };
        assert!(matches!(
            nan_duration.validate(),
            Err(ConfigError::NonPositiveDuration(_))
        ));

        let negative_stagger = SceneConfig {
            formation_stagger: -0.01,
            ..base
        };
        assert_eq!(
            negative_stagger.validate(),
            Err(ConfigError::NegativeStagger(-0.01))
        );
    }

    #[test]
    fn zero_stagger_is_allowed() {
        let simultaneous = SceneConfig {
            formation_stagger: 0.0,
            ..SceneConfig::default()
        };
        assert_eq!(simultaneous.validate(), Ok(()));
    }
}
