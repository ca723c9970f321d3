use std::process::ExitCode;

use bevy::prelude::*;
use rover_sim::domain::Simulation;

mod controller;
mod resource;
mod scenario;
mod simulator;
mod visualizer;

use crate::{resource::SimulationRes, scenario::Scenario, visualizer::Scene};

fn main() -> ExitCode {
    let scenario = match std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<Scenario>())
        .transpose()
    {
        Ok(scenario) => scenario.unwrap_or_default(),
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };
    let setup = match scenario.build() {
        Ok(setup) => setup,
        Err(error) => {
            eprintln!("failed to build scenario {scenario:?}: {error}");
            return ExitCode::FAILURE;
        }
    };

    App::new()
        .add_plugins(DefaultPlugins)
        .insert_resource(SimulationRes::from(Simulation::new(setup.world)))
        .insert_resource(Scene {
            pixels_per_unit: scenario.pixels_per_unit(),
            tracked: setup.tracked,
            ..default()
        })
        .add_plugins(controller::Controller)
        .add_plugins(visualizer::Visualizer)
        .add_plugins(simulator::Simulator)
        .run();

    ExitCode::SUCCESS
}
