//! Construction errors.
//!
//! Every error here is raised while assembling a world, before the first frame runs. Once a
//! world is running, stepping it cannot fail.

use thiserror::Error;

use super::ContextId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{anchors} tire anchors but {tires} tire configurations")]
    MismatchedTires { anchors: usize, tires: usize },
    #[error("vehicle needs at least one tire")]
    NoTires,
    #[error("laser array needs at least one sensor")]
    NoSensors,
    #[error("degenerate angle range [{start}, {end}] for {n_sensors} sensors")]
    DegenerateAngleRange {
        start: f64,
        end: f64,
        n_sensors: usize,
    },
    #[error("invalid laser range ({near}, {far})")]
    InvalidRange { near: f64, far: f64 },
    #[error("polygon with {0} vertices has no area")]
    DegenerateShape(usize),
    #[error("boundary needs at least two vertices, got {0}")]
    ShortBoundary(usize),
    #[error("invalid timestep {0}")]
    InvalidTimestep(f64),
    #[error("at least one velocity iteration is required")]
    NoVelocityIterations,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    #[error("body was built against solver context {body:?}, world runs {world:?}")]
    ForeignBody { body: ContextId, world: ContextId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        insta::assert_snapshot!(
            ConfigError::MismatchedTires { anchors: 2, tires: 3 }.to_string(),
            @"2 tire anchors but 3 tire configurations"
        );
        insta::assert_snapshot!(
            ConfigError::InvalidRange { near: 6.0, far: 3.0 }.to_string(),
            @"invalid laser range (6, 3)"
        );
        insta::assert_snapshot!(
            ConfigError::DegenerateAngleRange {
                start: 1.0,
                end: 1.0,
                n_sensors: 3
            }
            .to_string(),
            @"degenerate angle range [1, 1] for 3 sensors"
        );
    }
}
