//! Fixed-timestep simulation of the world.
//!
//! Every fixed tick runs one frame with the keys currently held. When the simulation stops,
//! whether by a quit key or a stop request, the app exits.

use bevy::{app::AppExit, prelude::*};
use rover_sim::domain::SolverConfig;

use crate::resource::{InputRes, SimulationRes};

pub struct Simulator;

impl Plugin for Simulator {
    fn build(&self, app: &mut App) {
        let timestep = app
            .world
            .get_resource::<SimulationRes>()
            .map_or(SolverConfig::default().timestep, |simulation| {
                simulation.world().physics().timestep()
            });

        app.insert_resource(Time::<Fixed>::from_seconds(timestep))
            .add_systems(Startup, start)
            .add_systems(FixedUpdate, simulate);
    }
}

fn start(mut simulation: ResMut<SimulationRes>) {
    simulation.start();
}

fn simulate(
    mut simulation: ResMut<SimulationRes>,
    input: Res<InputRes>,
    mut exit: EventWriter<AppExit>,
) {
    if !simulation.frame(&input) {
        exit.send(AppExit);
    }
}
