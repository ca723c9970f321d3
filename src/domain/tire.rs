//! Tire friction and drive model for top-down vehicles.
//!
//! A tire is a small box body. Every step it cancels (part of) its sideways velocity with an
//! impulse, damps its spin and feels a linear drag along its rolling direction. The sideways
//! correction is capped at `max_lateral_impulse`, which is what lets a tire slip instead of
//! gripping the road perfectly. Driving is bang-bang: full force towards the desired speed, or
//! nothing if the tire already runs exactly at that speed.
//!
//! Forward is the body's local +y axis, lateral is local +x.

use rapier2d_f64::prelude::RigidBodyHandle;

use super::{Angle, Canvas, Color, Material, PhysicsContext, Position};

const FORWARD: Position = Position::new(0.0, 1.0);
const LATERAL: Position = Position::new(1.0, 0.0);
const ANGULAR_DAMPING: f64 = 0.1;
const DRAG_COEFFICIENT: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TireConfig {
    pub max_forward_speed: f64,
    pub max_backward_speed: f64,
    pub max_drive_force: f64,
    pub max_lateral_impulse: f64,
    pub half_extents: Position,
    pub density: f64,
}

impl TireConfig {
    pub const DEFAULT: TireConfig = TireConfig {
        max_forward_speed: 50.0,
        max_backward_speed: -25.0,
        max_drive_force: 150.0,
        max_lateral_impulse: 3.0,
        half_extents: Position::new(0.5, 1.25),
        density: 1.0,
    };
}

impl Default for TireConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What one call of [`Tire::update_friction`] applied.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrictionUpdate {
    pub lateral_impulse: Position,
    pub angular_impulse: f64,
    pub drag_force: Position,
}

#[derive(Clone, Debug)]
pub struct Tire {
    body: RigidBodyHandle,
    config: TireConfig,
    traction: f64,
    mass: f64,
    inertia: f64,
}

impl Tire {
    pub fn new(
        physics: &mut PhysicsContext,
        config: TireConfig,
        position: Position,
        angle: Angle,
    ) -> Self {
        let body = physics.create_dynamic_body(position, angle);
        physics.attach_box(body, config.half_extents, Material::new(config.density, 0.2));

        let (w, h) = (2.0 * config.half_extents.x(), 2.0 * config.half_extents.y());
        let mass = config.density * w * h;

        Self {
            body,
            config,
            traction: 1.0,
            mass,
            inertia: mass * (w * w + h * h) / 12.0,
        }
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn config(&self) -> &TireConfig {
        &self.config
    }

    pub fn traction(&self) -> f64 {
        self.traction
    }

    pub fn max_forward_speed(&self) -> f64 {
        self.config.max_forward_speed
    }

    pub fn max_backward_speed(&self) -> f64 {
        self.config.max_backward_speed
    }

    pub fn lateral_velocity(&self, physics: &PhysicsContext) -> Position {
        self.velocity_along(physics, LATERAL)
    }

    pub fn forward_velocity(&self, physics: &PhysicsContext) -> Position {
        self.velocity_along(physics, FORWARD)
    }

    /// Signed speed along the rolling direction.
    pub fn forward_speed(&self, physics: &PhysicsContext) -> f64 {
        match (
            physics.world_vector(self.body, FORWARD),
            physics.linear_velocity(self.body),
        ) {
            (Some(normal), Some(velocity)) => normal.dot(velocity),
            _ => 0.0,
        }
    }

    fn velocity_along(&self, physics: &PhysicsContext, local_axis: Position) -> Position {
        match (
            physics.world_vector(self.body, local_axis),
            physics.linear_velocity(self.body),
        ) {
            (Some(normal), Some(velocity)) => velocity.project_on(normal),
            _ => Position::default(),
        }
    }

    pub fn update_friction(&mut self, physics: &mut PhysicsContext) -> FrictionUpdate {
        let angular_velocity = physics.angular_velocity(self.body).unwrap_or_default();

        let lateral_impulse = lateral_correction(
            self.lateral_velocity(physics),
            self.mass,
            self.config.max_lateral_impulse,
        ) * self.traction;
        physics.apply_impulse(self.body, lateral_impulse);

        let angular_impulse = ANGULAR_DAMPING * self.traction * self.inertia * -angular_velocity;
        physics.apply_angular_impulse(self.body, angular_impulse);

        let drag_force = match self.forward_velocity(physics).normalized() {
            Some((normal, speed)) => normal * (-DRAG_COEFFICIENT * speed * self.traction),
            None => Position::default(),
        };
        physics.add_force(self.body, drag_force);

        FrictionUpdate {
            lateral_impulse,
            angular_impulse,
            drag_force,
        }
    }

    /// Pushes the tire towards `desired_speed` with its full drive force. Returns the signed
    /// force that was applied, or `None` if the tire already runs at exactly that speed.
    pub fn update_drive(&mut self, physics: &mut PhysicsContext, desired_speed: f64) -> Option<f64> {
        let force = drive_force(
            desired_speed,
            self.forward_speed(physics),
            self.config.max_drive_force,
        )?;
        if let Some(normal) = physics.world_vector(self.body, FORWARD) {
            physics.add_force(self.body, normal * (self.traction * force));
        }
        Some(force)
    }

    pub fn draw(&self, physics: &PhysicsContext, canvas: &mut dyn Canvas) {
        let (hx, hy) = (self.config.half_extents.x(), self.config.half_extents.y());
        let vertices = [
            Position::new(-hx, -hy),
            Position::new(hx, -hy),
            Position::new(hx, hy),
            Position::new(-hx, hy),
        ]
        .iter()
        .filter_map(|&v| physics.world_point(self.body, v))
        .collect::<Vec<_>>();
        canvas.polygon(&vertices, Color::WHITE);
    }
}

/// Impulse cancelling `lateral_velocity` for a body of `mass`, scaled down to at most
/// `max_impulse`.
pub fn lateral_correction(lateral_velocity: Position, mass: f64, max_impulse: f64) -> Position {
    let impulse = -lateral_velocity * mass;
    match impulse.normalized() {
        Some((direction, magnitude)) if magnitude > max_impulse => direction * max_impulse,
        Some(_) => impulse,
        None => Position::default(),
    }
}

/// Bang-bang drive: full force towards the desired speed, none when already there.
pub fn drive_force(desired_speed: f64, current_speed: f64, max_force: f64) -> Option<f64> {
    if desired_speed > current_speed {
        Some(max_force)
    } else if desired_speed < current_speed {
        Some(-max_force)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    use super::*;
    use crate::domain::SolverConfig;

    const EPSILON: f64 = 1e-9;

    fn tire(angle: Angle) -> (PhysicsContext, Tire) {
        let mut physics = PhysicsContext::new(SolverConfig::default()).unwrap();
        let tire = Tire::new(&mut physics, TireConfig::DEFAULT, Position::default(), angle);
        (physics, tire)
    }

    #[rstest]
    #[case::below_cap(Position::new(0.5, 0.0), 2.0, 3.0, Position::new(-1.0, 0.0))]
    #[case::at_cap(Position::new(0.0, 1.5), 2.0, 3.0, Position::new(0.0, -3.0))]
    #[case::clamped(Position::new(3.0, 4.0), 2.0, 3.0, Position::new(-1.8, -2.4))]
    #[case::stationary(Position::new(0.0, 0.0), 2.0, 3.0, Position::new(0.0, 0.0))]
    fn test_lateral_correction(
        #[case] lateral_velocity: Position,
        #[case] mass: f64,
        #[case] max_impulse: f64,
        #[case] expected: Position,
    ) {
        let impulse = lateral_correction(lateral_velocity, mass, max_impulse);
        assert_abs_diff_eq!(impulse, expected, epsilon = EPSILON);
        assert!(impulse.length() <= max_impulse + EPSILON);
    }

    #[rstest]
    #[case::accelerate(10.0, 2.0, Some(150.0))]
    #[case::brake(-5.0, 2.0, Some(-150.0))]
    #[case::exact(2.0, 2.0, None)]
    #[case::saturated(1e12, 0.0, Some(150.0))]
    fn test_drive_force(
        #[case] desired_speed: f64,
        #[case] current_speed: f64,
        #[case] expected: Option<f64>,
    ) {
        assert_eq!(drive_force(desired_speed, current_speed, 150.0), expected);
    }

    #[test]
    fn test_tire_forward_speed() {
        let (mut physics, tire) = tire(Angle::new(0.5 * PI));
        let body = physics.body_mut(tire.body()).unwrap();
        body.set_linvel([-3.0, 4.0].into(), true);

        assert_abs_diff_eq!(tire.forward_speed(&physics), 3.0, epsilon = EPSILON);
        assert_abs_diff_eq!(
            tire.forward_velocity(&physics),
            Position::new(-3.0, 0.0),
            epsilon = EPSILON
        );
        assert_abs_diff_eq!(
            tire.lateral_velocity(&physics),
            Position::new(0.0, 4.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_tire_mass_matches_solver() {
        let (mut physics, tire) = tire(Angle::new(0.0));
        physics.step();
        assert_abs_diff_eq!(physics.mass(tire.body()).unwrap(), 2.5, epsilon = 1e-6);
        assert_eq!(tire.config(), &TireConfig::DEFAULT);
        assert_eq!(tire.traction(), 1.0);
    }

    #[test]
    fn test_tire_update_drive_at_desired_speed() {
        let (mut physics, mut tire) = tire(Angle::new(0.0));
        assert_eq!(tire.update_drive(&mut physics, 0.0), None);
        physics.step();
        assert_eq!(tire.forward_speed(&physics), 0.0);
    }

    #[test]
    fn test_tire_update_drive_accelerates() {
        let (mut physics, mut tire) = tire(Angle::new(0.0));
        assert_eq!(tire.update_drive(&mut physics, 10.0), Some(150.0));
        physics.step();
        assert!(tire.forward_speed(&physics) > 0.0);
    }

    #[test]
    fn test_tire_update_friction_caps_lateral_impulse() {
        let (mut physics, mut tire) = tire(Angle::new(0.0));
        physics
            .body_mut(tire.body())
            .unwrap()
            .set_linvel([20.0, 0.0].into(), true);
        physics.step();

        let update = tire.update_friction(&mut physics);

        assert_abs_diff_eq!(
            update.lateral_impulse,
            Position::new(-3.0, 0.0),
            epsilon = EPSILON
        );
        assert_abs_diff_eq!(update.drag_force, Position::default());
        // 3 units of impulse on a 2.5 kg tire
        assert_abs_diff_eq!(
            tire.lateral_velocity(&physics),
            Position::new(20.0 - 1.2, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_tire_update_friction_drag() {
        let (mut physics, mut tire) = tire(Angle::new(0.0));
        physics
            .body_mut(tire.body())
            .unwrap()
            .set_linvel([0.0, 5.0].into(), true);
        physics.step();

        let update = tire.update_friction(&mut physics);

        assert_abs_diff_eq!(update.lateral_impulse, Position::default());
        assert_abs_diff_eq!(
            update.drag_force,
            Position::new(0.0, -10.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_tire_update_friction_damps_spin() {
        let (mut physics, mut tire) = tire(Angle::new(0.0));
        physics.body_mut(tire.body()).unwrap().set_angvel(2.0, true);
        physics.step();

        let update = tire.update_friction(&mut physics);

        assert!(update.angular_impulse < 0.0);
        assert!(physics.angular_velocity(tire.body()).unwrap() < 2.0);
    }
}
