//! Controller steering the rovers.
//!
//! Keyboard state is translated into the simulation's [`Input`] every frame. Rovers without a
//! driver at the keyboard follow one of the demo policies below.

use bevy::{input::InputSystem, prelude::*};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use rover_sim::domain::{Frame, Input, Key, PhysicsContext, Policy, Rover};

use crate::resource::InputRes;

const KEY_MAP: [(KeyCode, Key); 7] = [
    (KeyCode::ArrowUp, Key::Up),
    (KeyCode::ArrowDown, Key::Down),
    (KeyCode::ArrowLeft, Key::Left),
    (KeyCode::ArrowRight, Key::Right),
    (KeyCode::KeyO, Key::Open),
    (KeyCode::KeyC, Key::Close),
    (KeyCode::Escape, Key::Quit),
];

pub struct Controller;

impl Plugin for Controller {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputRes>()
            .add_systems(PreUpdate, read_keyboard.after(InputSystem));
    }
}

pub fn key_for(code: KeyCode) -> Option<Key> {
    KEY_MAP
        .iter()
        .find(|(mapped, _)| *mapped == code)
        .map(|(_, key)| *key)
}

fn read_keyboard(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<InputRes>) {
    let mut pressed = Input::new();
    for code in keys.get_pressed() {
        if let Some(key) = key_for(*code) {
            pressed.press(key);
        }
    }
    if **input != pressed {
        *input = pressed.into();
    }
}

/// Mean distances of the right, center and left third of a scan, in that order.
pub fn scan_thirds(values: &[f64]) -> Option<[f64; 3]> {
    let third = values.len() / 3;
    if third == 0 {
        return None;
    }
    let mean = |slice: &[f64]| slice.iter().sum::<f64>() / slice.len() as f64;
    Some([
        mean(&values[..third]),
        mean(&values[third..2 * third]),
        mean(&values[2 * third..]),
    ])
}

const RNG_SEED: u64 = 19878367467712;
const CRUISE: f64 = 5.0;
const REVERSE: f64 = -10.0;
const TURN: f64 = 5.0;
const SHARP_TURN: f64 = 10.0;
const NOISE: f64 = 5.0;
const CLEARANCE: f64 = 20.0;
const IR_THRESHOLD: f64 = 6.0;

/// Linear and angular speed for the obstacle-avoiding wanderer.
pub fn wander_command(scan: &[f64], front_ir: &[f64], rear_ir: &[f64], noise: f64) -> (f64, f64) {
    let Some([right, center, left]) = scan_thirds(scan) else {
        return (0.0, 0.0);
    };

    let (mut linear, mut angular) = (CRUISE, 0.0);
    if left > center {
        angular = TURN;
    } else if right > center {
        angular = -TURN;
    }
    if left.max(center).max(right) < CLEARANCE {
        (linear, angular) = (REVERSE, noise);
    }

    let close = |values: &[f64], i: usize| values.get(i).is_some_and(|&v| v < IR_THRESHOLD);
    if close(front_ir, 0) {
        angular = -SHARP_TURN;
    }
    if close(front_ir, 2) {
        angular = SHARP_TURN;
    }
    if close(rear_ir, 0) {
        angular = SHARP_TURN;
    }
    if close(rear_ir, 2) {
        angular = -SHARP_TURN;
    }
    if close(rear_ir, 1) {
        (linear, angular) = (SHARP_TURN, 0.0);
    }
    (linear, angular)
}

/// Drives forward, turns towards the most open third of the scan and backs off from close
/// obstacles.
pub struct Wander {
    rng: ChaCha8Rng,
}

impl Wander {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for Wander {
    fn default() -> Self {
        Self::with_seed(RNG_SEED)
    }
}

impl Policy for Wander {
    fn act(&mut self, rover: &mut Rover, physics: &mut PhysicsContext, _frame: &Frame) {
        let noise = NOISE * self.rng.sample::<f64, _>(StandardNormal);
        let (Some(scan), Some(front_ir), Some(rear_ir)) =
            (rover.laser_scan(), rover.front_ir(), rover.rear_ir())
        else {
            return;
        };
        let (linear, angular) =
            wander_command(scan.values(), front_ir.values(), rear_ir.values(), noise);
        rover.vehicle_mut().drive(physics, linear, angular);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScriptStep {
    /// Target speeds of the left and right tire.
    pub speeds: (f64, f64),
    /// Seconds before moving on.
    pub duration: f64,
    pub next: usize,
}

pub const DEFAULT_SCRIPT: [ScriptStep; 2] = [
    ScriptStep {
        speeds: (10.0, 10.0),
        duration: 1.5,
        next: 1,
    },
    ScriptStep {
        speeds: (14.0, 2.0),
        duration: 1.0,
        next: 0,
    },
];

/// Open-loop tire commands replayed from a list of timed steps.
#[derive(Clone, Debug)]
pub struct Scripted {
    steps: Vec<ScriptStep>,
    current: usize,
    since: Option<f64>,
}

impl Scripted {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            current: 0,
            since: None,
        }
    }

    /// Tire speeds for the simulated time `time`.
    pub fn advance(&mut self, time: f64) -> Option<(f64, f64)> {
        let step = self.steps.get(self.current)?;
        let since = *self.since.get_or_insert(time);
        if time - since > step.duration {
            self.current = step.next % self.steps.len();
            self.since = Some(time);
        }
        self.steps.get(self.current).map(|step| step.speeds)
    }
}

impl Default for Scripted {
    fn default() -> Self {
        Self::new(DEFAULT_SCRIPT.to_vec())
    }
}

impl Policy for Scripted {
    fn act(&mut self, rover: &mut Rover, physics: &mut PhysicsContext, frame: &Frame) {
        let Some((left, right)) = self.advance(frame.time) else {
            return;
        };
        if let [left_tire, right_tire, ..] = rover.vehicle_mut().tires_mut() {
            left_tire.update_drive(physics, left);
            right_tire.update_drive(physics, right);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rover_sim::domain::{Angle, Position, RoverBuilder, SolverConfig, World};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(KeyCode::ArrowUp, Some(Key::Up))]
    #[case(KeyCode::KeyO, Some(Key::Open))]
    #[case(KeyCode::Escape, Some(Key::Quit))]
    #[case(KeyCode::KeyX, None)]
    fn test_key_for(#[case] code: KeyCode, #[case] expected: Option<Key>) {
        assert_eq!(key_for(code), expected);
    }

    #[test]
    fn test_every_key_mapped() {
        for key in Key::ALL {
            assert_eq!(
                KEY_MAP.iter().filter(|(_, mapped)| *mapped == key).count(),
                1,
                "{key:?}"
            );
        }
    }

    #[test]
    fn test_scan_thirds() {
        let scan = [[1.0; 15], [2.0; 15], [3.0; 15]].concat();
        assert_eq!(scan_thirds(&scan), Some([1.0, 2.0, 3.0]));
        assert_eq!(scan_thirds(&[1.0, 2.0]), None);
    }

    fn scan(right: f64, center: f64, left: f64) -> Vec<f64> {
        [[right; 15], [center; 15], [left; 15]].concat()
    }

    const CLEAR: [f64; 3] = [6.0; 3];

    #[rstest]
    #[case::open_field(scan(30.0, 30.0, 30.0), CLEAR, CLEAR, (5.0, 0.0))]
    #[case::left_open(scan(25.0, 22.0, 28.0), CLEAR, CLEAR, (5.0, 5.0))]
    #[case::right_open(scan(28.0, 22.0, 22.0), CLEAR, CLEAR, (5.0, -5.0))]
    #[case::boxed_in(scan(10.0, 12.0, 15.0), CLEAR, CLEAR, (-10.0, 1.5))]
    #[case::front_left_close(scan(30.0, 30.0, 30.0), [5.0, 6.0, 6.0], CLEAR, (5.0, -10.0))]
    #[case::front_right_close(scan(30.0, 30.0, 30.0), [6.0, 6.0, 4.0], CLEAR, (5.0, 10.0))]
    #[case::rear_close(scan(10.0, 12.0, 15.0), CLEAR, [6.0, 3.0, 6.0], (10.0, 0.0))]
    fn test_wander_command(
        #[case] scan: Vec<f64>,
        #[case] front_ir: [f64; 3],
        #[case] rear_ir: [f64; 3],
        #[case] expected: (f64, f64),
    ) {
        assert_eq!(wander_command(&scan, &front_ir, &rear_ir, 1.5), expected);
    }

    #[test]
    fn test_scripted_advance() {
        let mut scripted = Scripted::default();
        assert_eq!(scripted.advance(0.0), Some((10.0, 10.0)));
        assert_eq!(scripted.advance(1.5), Some((10.0, 10.0)));
        assert_eq!(scripted.advance(1.6), Some((14.0, 2.0)));
        assert_eq!(scripted.advance(2.5), Some((14.0, 2.0)));
        assert_eq!(scripted.advance(2.7), Some((10.0, 10.0)));
        assert_eq!(Scripted::new(vec![]).advance(0.0), None);
    }

    #[test]
    fn test_wander_moves_rover() {
        let mut world = World::new(SolverConfig::default()).unwrap();
        let rover = RoverBuilder::rover()
            .policy(Wander::with_seed(7))
            .build(world.physics_mut(), Position::default(), Angle::default())
            .unwrap();
        let id = world.add(rover).unwrap();
        for _ in 0..60 {
            world.step(&Input::new());
        }
        let (position, _) = world.body::<Rover>(id).unwrap().pose(world.physics());
        assert!(position.y() > 0.5);
    }
}
