//! The domain module holds the simulation core: rigid bodies, tires, vehicles, sensors,
//! actuators and the world that steps them.
//!
//! Nothing here depends on the interactive shell. Bodies draw through the [`Canvas`] trait and
//! read keys through [`Input`], so any host can drive and render a [`World`].

mod basis;
mod body;
mod environment;
mod error;
mod gripper;
mod input;
mod laser;
mod physics;
mod rover;
mod simulation;
mod tire;
mod vehicle;
mod world;

pub use basis::{Angle, Position};
pub use body::{Body, Canvas, Color, Frame};
pub use environment::{Ball, Maze, MazeLayout, Wall, ARENA_BOUNDARY, DEFAULT_MAZE};
pub use error::{ConfigError, WorldError};
pub use gripper::{Gripper, GripperConfig, LEFT_CLAW, RIGHT_CLAW};
pub use input::{Input, Key};
pub use laser::{Laser, LaserArray, LaserArrayConfig, LaserRange};
pub use physics::{ContextId, Hinge, Material, PhysicsContext, SolverConfig};
pub use rover::{Capability, Policy, Rover, RoverBuilder};
pub use simulation::{LoopState, Pacing, Simulation};
pub use tire::{drive_force, lateral_correction, FrictionUpdate, Tire, TireConfig};
pub use vehicle::{Vehicle, VehicleConfig, DEFAULT_CHASSIS, DEFAULT_TIRES, DEFAULT_TIRE_ANCHORS};
pub use world::{BodyId, World};
