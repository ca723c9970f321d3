//! Predefined worlds the shell can run.

use std::{f64::consts::FRAC_PI_4, str::FromStr};

use rover_sim::domain::{
    self, Angle, Ball, BodyId, ConfigError, Maze, Position, RoverBuilder, SolverConfig, Wall,
    WorldError, DEFAULT_MAZE,
};
use thiserror::Error;

use crate::controller::{Scripted, Wander};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Scenario {
    /// Keyboard rover in the rectangular arena.
    #[default]
    Arena,
    /// Keyboard rover and a ball in the maze.
    Maze,
    /// Wandering rover among inner walls, with a keyboard rover to chase it.
    Wander,
    /// Bare vehicle replaying a timed tire script.
    Scripted,
}

#[derive(Error, Debug, PartialEq)]
pub enum ScenarioError {
    #[error("unknown scenario '{0}', expected one of: arena, maze, wander, scripted")]
    Unknown(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    World(#[from] WorldError),
}

impl FromStr for Scenario {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arena" => Ok(Scenario::Arena),
            "maze" => Ok(Scenario::Maze),
            "wander" => Ok(Scenario::Wander),
            "scripted" => Ok(Scenario::Scripted),
            _ => Err(ScenarioError::Unknown(s.to_string())),
        }
    }
}

/// A built world and the body whose sensors the HUD reports.
pub struct Setup {
    pub world: domain::World,
    pub tracked: Option<BodyId>,
}

impl Scenario {
    pub fn pixels_per_unit(self) -> f32 {
        match self {
            Scenario::Maze => 3.5,
            _ => 5.0,
        }
    }

    pub fn build(self) -> Result<Setup, ScenarioError> {
        let mut world = domain::World::new(SolverConfig::default())?;
        let physics = world.physics_mut();

        let tracked = match self {
            Scenario::Arena => {
                let wall = Wall::arena(physics)?;
                let rover = RoverBuilder::keyboard_rover().build(
                    physics,
                    Position::new(20.0, 10.0),
                    Angle::new(FRAC_PI_4),
                )?;
                world.add(wall)?;
                Some(world.add(rover)?)
            }
            Scenario::Maze => {
                let maze = Maze::new(physics, &DEFAULT_MAZE)?;
                let rover = RoverBuilder::keyboard_rover().build(
                    physics,
                    Position::new(90.0, -50.0),
                    Angle::default(),
                )?;
                let ball = Ball::new(physics, Position::new(-30.0, -30.0));
                world.add(maze)?;
                let rover = world.add(rover)?;
                world.add(ball)?;
                Some(rover)
            }
            Scenario::Wander => {
                let walls = [
                    Wall::arena(physics)?,
                    Wall::new(
                        physics,
                        &[
                            Position::new(-30.0, -30.0),
                            Position::new(-30.0, 20.0),
                            Position::new(-20.0, 20.0),
                            Position::new(-20.0, -30.0),
                            Position::new(-30.0, -30.0),
                        ],
                    )?,
                    Wall::new(
                        physics,
                        &[
                            Position::new(30.0, 30.0),
                            Position::new(30.0, -20.0),
                            Position::new(20.0, -20.0),
                            Position::new(20.0, 30.0),
                            Position::new(30.0, 30.0),
                        ],
                    )?,
                ];
                let wanderer = RoverBuilder::rover().policy(Wander::default()).build(
                    physics,
                    Position::default(),
                    Angle::default(),
                )?;
                let chaser = RoverBuilder::keyboard_rover().build(
                    physics,
                    Position::new(-50.0, 20.0),
                    Angle::default(),
                )?;
                let ball = Ball::new(physics, Position::new(40.0, 50.0));
                for wall in walls {
                    world.add(wall)?;
                }
                let wanderer = world.add(wanderer)?;
                world.add(chaser)?;
                world.add(ball)?;
                Some(wanderer)
            }
            Scenario::Scripted => {
                let wall = Wall::arena(physics)?;
                let vehicle = RoverBuilder::new().policy(Scripted::default()).build(
                    physics,
                    Position::default(),
                    Angle::default(),
                )?;
                world.add(wall)?;
                Some(world.add(vehicle)?)
            }
        };

        Ok(Setup { world, tracked })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rover_sim::domain::{Input, Rover};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("arena", Scenario::Arena)]
    #[case("Maze", Scenario::Maze)]
    #[case("WANDER", Scenario::Wander)]
    #[case("scripted", Scenario::Scripted)]
    fn test_parse_scenario(#[case] name: &str, #[case] expected: Scenario) {
        assert_eq!(name.parse::<Scenario>(), Ok(expected));
    }

    #[test]
    fn test_parse_unknown_scenario() {
        let error = "moon".parse::<Scenario>().unwrap_err();
        insta::assert_snapshot!(
            error.to_string(),
            @"unknown scenario 'moon', expected one of: arena, maze, wander, scripted"
        );
    }

    #[rstest]
    #[case(Scenario::Arena, 2)]
    #[case(Scenario::Maze, 3)]
    #[case(Scenario::Wander, 6)]
    #[case(Scenario::Scripted, 2)]
    fn test_build_scenario(#[case] scenario: Scenario, #[case] bodies: usize) {
        let mut setup = scenario.build().unwrap();
        assert_eq!(setup.world.len(), bodies);
        for _ in 0..10 {
            setup.world.step(&Input::new());
        }
        let tracked = setup.tracked.unwrap();
        assert!(setup.world.body::<Rover>(tracked).is_some());
    }
}
