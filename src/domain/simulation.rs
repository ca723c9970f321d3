//! Fixed-timestep simulation loop.
//!
//! The loop is `Idle` until started and returns to `Idle` on a stop request or a [`Key::Quit`]
//! input. A stop request never interrupts a frame; it only prevents the next one from starting.

use std::{
    thread,
    time::{Duration, Instant},
};

use tracing::{info, warn};

use super::{Input, Key, World};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoopState {
    #[default]
    Idle,
    Running,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Pacing {
    /// Frames run back to back.
    #[default]
    Unpaced,
    /// Every frame lasts at least one timestep of wall-clock time.
    RealTime,
}

pub struct Simulation {
    world: World,
    state: LoopState,
    stop_requested: bool,
}

impl Simulation {
    pub fn new(world: World) -> Self {
        Self {
            world,
            state: LoopState::Idle,
            stop_requested: false,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            info!(frame = self.world.frame(), "simulation started");
            self.state = LoopState::Running;
            self.stop_requested = false;
        }
    }

    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// Runs one frame unless the loop is idle or asked to stop. Returns whether a frame ran.
    pub fn frame(&mut self, input: &Input) -> bool {
        if self.state == LoopState::Idle {
            return false;
        }
        if input.is_pressed(Key::Quit) {
            self.stop_requested = true;
        }
        if self.stop_requested {
            info!(frame = self.world.frame(), "simulation stopped");
            self.state = LoopState::Idle;
            self.stop_requested = false;
            return false;
        }
        self.world.step(input);
        true
    }

    /// Starts the loop and runs frames until `driver` returns `None` or a stop is requested.
    /// Returns the number of frames that ran.
    pub fn run(
        &mut self,
        mut driver: impl FnMut(&World) -> Option<Input>,
        pacing: Pacing,
    ) -> u64 {
        let timestep = Duration::from_secs_f64(self.world.physics().timestep());
        let mut frames = 0;
        self.start();
        loop {
            let started = Instant::now();
            let input = driver(&self.world).unwrap_or_else(|| {
                self.stop_requested = true;
                Input::new()
            });
            if !self.frame(&input) {
                break;
            }
            frames += 1;

            if pacing == Pacing::RealTime {
                let elapsed = started.elapsed();
                match timestep.checked_sub(elapsed) {
                    Some(remaining) => thread::sleep(remaining),
                    None => warn!(
                        frame = self.world.frame(),
                        elapsed_ms = elapsed.as_secs_f64() * 1e3,
                        "frame overran its timestep"
                    ),
                }
            }
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::{Ball, Position, SolverConfig};

    fn simulation() -> Simulation {
        let mut world = World::new(SolverConfig::default()).unwrap();
        let ball = Ball::new(world.physics_mut(), Position::default());
        world.add(ball).unwrap();
        Simulation::new(world)
    }

    #[test]
    fn test_idle_until_started() {
        let mut simulation = simulation();
        assert_eq!(simulation.state(), LoopState::Idle);
        assert!(!simulation.frame(&Input::new()));
        assert_eq!(simulation.world().frame(), 0);

        simulation.start();
        assert!(simulation.is_running());
        assert!(simulation.frame(&Input::new()));
        assert_eq!(simulation.world().frame(), 1);
    }

    #[test]
    fn test_stop_prevents_next_frame() {
        let mut simulation = simulation();
        simulation.start();
        simulation.frame(&Input::new());
        simulation.request_stop();

        assert!(!simulation.frame(&Input::new()));
        assert_eq!(simulation.state(), LoopState::Idle);
        assert_eq!(simulation.world().frame(), 1);

        simulation.start();
        assert!(simulation.frame(&Input::new()));
        assert_eq!(simulation.world().frame(), 2);
    }

    #[test]
    fn test_quit_key_stops() {
        let mut simulation = simulation();
        simulation.start();
        assert!(!simulation.frame(&Input::with_pressed(&[Key::Quit])));
        assert_eq!(simulation.state(), LoopState::Idle);
        assert_eq!(simulation.world().frame(), 0);
    }

    #[test]
    fn test_run_until_driver_finishes() {
        let mut simulation = simulation();
        let frames = simulation.run(
            |world| (world.frame() < 5).then(Input::new),
            Pacing::Unpaced,
        );
        assert_eq!(frames, 5);
        assert_eq!(simulation.world().frame(), 5);
        assert_eq!(simulation.state(), LoopState::Idle);
    }

    #[test]
    fn test_into_world_keeps_progress() {
        let mut simulation = simulation();
        simulation.start();
        simulation.frame(&Input::new());
        simulation.frame(&Input::new());
        let world = simulation.into_world();
        assert_eq!(world.frame(), 2);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_run_until_quit() {
        let mut simulation = simulation();
        let frames = simulation.run(
            |world| {
                Some(if world.frame() == 3 {
                    Input::with_pressed(&[Key::Quit])
                } else {
                    Input::new()
                })
            },
            Pacing::Unpaced,
        );
        assert_eq!(frames, 3);
    }

    #[test]
    fn test_real_time_pacing() {
        let mut simulation = simulation();
        let started = Instant::now();
        let frames = simulation.run(|world| (world.frame() < 3).then(Input::new), Pacing::RealTime);
        assert_eq!(frames, 3);
        assert!(started.elapsed() >= Duration::from_millis(45));
    }
}
