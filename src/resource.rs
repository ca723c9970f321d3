//! The resource module encapsulates domain entities for use with Bevy.

use std::ops::{Deref, DerefMut};

use bevy::ecs::system::Resource;

use rover_sim::domain;

#[derive(Resource)]
pub struct SimulationRes(domain::Simulation);

impl Deref for SimulationRes {
    type Target = domain::Simulation;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SimulationRes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<domain::Simulation> for SimulationRes {
    fn from(value: domain::Simulation) -> Self {
        Self(value)
    }
}

/// Keys held during the current frame.
#[derive(Resource, Default)]
pub struct InputRes(domain::Input);

impl Deref for InputRes {
    type Target = domain::Input;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<domain::Input> for InputRes {
    fn from(value: domain::Input) -> Self {
        Self(value)
    }
}
