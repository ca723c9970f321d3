//! Differential-drive vehicle: a polygonal chassis with tires pinned to it by locked hinges.

use std::borrow::Cow;

use rapier2d_f64::prelude::{ImpulseJointHandle, RigidBodyHandle};

use super::{
    Angle, Body, Canvas, Color, ConfigError, ContextId, Frame, Hinge, Material, PhysicsContext,
    Position, Tire, TireConfig,
};

pub const DEFAULT_CHASSIS: [Position; 8] = [
    Position::new(1.5, 0.0),
    Position::new(3.0, 2.5),
    Position::new(2.8, 5.5),
    Position::new(1.0, 9.0),
    Position::new(-1.0, 9.0),
    Position::new(-2.8, 5.5),
    Position::new(-3.0, 2.5),
    Position::new(-1.5, 0.0),
];

/// Left tire first.
pub const DEFAULT_TIRE_ANCHORS: [Position; 2] = [Position::new(-4.0, 3.5), Position::new(4.0, 3.5)];

pub const DEFAULT_TIRES: [TireConfig; 2] = [TireConfig::DEFAULT, TireConfig::DEFAULT];

#[derive(Clone, Debug, PartialEq)]
pub struct VehicleConfig {
    /// Chassis outline in the chassis frame.
    pub vertices: Cow<'static, [Position]>,
    pub tire_anchors: Cow<'static, [Position]>,
    pub tires: Cow<'static, [TireConfig]>,
    pub density: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            vertices: Cow::Borrowed(&DEFAULT_CHASSIS),
            tire_anchors: Cow::Borrowed(&DEFAULT_TIRE_ANCHORS),
            tires: Cow::Borrowed(&DEFAULT_TIRES),
            density: 1.0,
        }
    }
}

#[derive(Debug)]
pub struct Vehicle {
    context: ContextId,
    body: RigidBodyHandle,
    vertices: Vec<Position>,
    tires: Vec<Tire>,
    joints: Vec<ImpulseJointHandle>,
}

impl Vehicle {
    pub fn new(
        physics: &mut PhysicsContext,
        config: &VehicleConfig,
        position: Position,
        angle: Angle,
    ) -> Result<Self, ConfigError> {
        if config.tires.is_empty() {
            return Err(ConfigError::NoTires);
        }
        if config.tires.len() != config.tire_anchors.len() {
            return Err(ConfigError::MismatchedTires {
                anchors: config.tire_anchors.len(),
                tires: config.tires.len(),
            });
        }

        let body = physics.create_dynamic_body(position, angle);
        physics.attach_polygon(body, &config.vertices, Material::new(config.density, 0.2))?;

        let (tires, joints) = config
            .tire_anchors
            .iter()
            .zip(config.tires.iter())
            .map(|(&anchor, &tire_config)| {
                let tire = Tire::new(
                    physics,
                    tire_config,
                    position + anchor.rotate_vector(angle),
                    angle,
                );
                let joint = physics.insert_hinge(
                    body,
                    tire.body(),
                    Hinge {
                        anchor1: anchor,
                        anchor2: Position::default(),
                        limits: [0.0, 0.0],
                        max_motor_torque: None,
                        contacts_enabled: false,
                    },
                );
                (tire, joint)
            })
            .unzip();

        Ok(Self {
            context: physics.id(),
            body,
            vertices: config.vertices.to_vec(),
            tires,
            joints,
        })
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn tires(&self) -> &[Tire] {
        &self.tires
    }

    pub fn tires_mut(&mut self) -> &mut [Tire] {
        &mut self.tires
    }

    pub fn joints(&self) -> &[ImpulseJointHandle] {
        &self.joints
    }

    pub fn pose(&self, physics: &PhysicsContext) -> (Position, Angle) {
        physics.pose(self.body).unwrap_or_default()
    }

    /// Applies the friction model of every tire, in tire order.
    pub fn update_friction(&mut self, physics: &mut PhysicsContext) {
        for tire in &mut self.tires {
            tire.update_friction(physics);
        }
    }

    /// Differential drive: the left tire (0) targets `linear - angular / 2`, the right tire (1)
    /// `linear + angular / 2`. Further tires are left alone.
    pub fn drive(&mut self, physics: &mut PhysicsContext, linear: f64, angular: f64) {
        let targets = [linear - 0.5 * angular, linear + 0.5 * angular];
        for (tire, target) in self.tires.iter_mut().zip(targets) {
            tire.update_drive(physics, target);
        }
    }

    pub fn draw_chassis(&self, physics: &PhysicsContext, canvas: &mut dyn Canvas) {
        let vertices = self
            .vertices
            .iter()
            .filter_map(|&v| physics.world_point(self.body, v))
            .collect::<Vec<_>>();
        canvas.polygon(&vertices, Color::WHITE);
        for tire in &self.tires {
            tire.draw(physics, canvas);
        }
    }
}

impl Body for Vehicle {
    fn context(&self) -> ContextId {
        self.context
    }

    fn step(&mut self, physics: &mut PhysicsContext, _frame: &Frame) {
        self.update_friction(physics);
    }

    fn draw(&self, physics: &PhysicsContext, canvas: &mut dyn Canvas) {
        self.draw_chassis(physics, canvas);
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tests::{advance, context};

    fn vehicle(physics: &mut PhysicsContext) -> Vehicle {
        Vehicle::new(
            physics,
            &VehicleConfig::default(),
            Position::default(),
            Angle::default(),
        )
        .unwrap()
    }

    fn drive(physics: &mut PhysicsContext, vehicle: &mut Vehicle, frames: usize, cmd: (f64, f64)) {
        advance(physics, frames, |physics| {
            vehicle.drive(physics, cmd.0, cmd.1);
            vehicle.update_friction(physics);
        });
    }

    #[test]
    fn test_vehicle_topology() {
        let mut physics = context();
        let vehicle = vehicle(&mut physics);
        assert_eq!(vehicle.tires().len(), 2);
        assert_eq!(vehicle.joints().len(), 2);
        assert_eq!(physics.body_count(), 3);
        assert_abs_diff_eq!(
            physics.pose(vehicle.tires()[0].body()).unwrap().0,
            Position::new(-4.0, 3.5)
        );
    }

    #[test]
    fn test_tires_placed_in_chassis_frame() {
        let mut physics = context();
        let vehicle = Vehicle::new(
            &mut physics,
            &VehicleConfig::default(),
            Position::new(10.0, 0.0),
            Angle::new(0.5 * PI),
        )
        .unwrap();
        let (position, angle) = physics.pose(vehicle.tires()[1].body()).unwrap();
        assert_abs_diff_eq!(position, Position::new(6.5, 4.0), epsilon = 1e-9);
        assert_abs_diff_eq!(angle, Angle::new(0.5 * PI), epsilon = 1e-9);
    }

    #[test]
    fn test_vehicle_construction_errors() {
        let mut physics = context();
        let config = VehicleConfig {
            tires: Cow::Owned(vec![TireConfig::DEFAULT; 3]),
            ..VehicleConfig::default()
        };
        assert_eq!(
            Vehicle::new(&mut physics, &config, Position::default(), Angle::default()).err(),
            Some(ConfigError::MismatchedTires { anchors: 2, tires: 3 })
        );

        let config = VehicleConfig {
            tires: Cow::Owned(vec![]),
            tire_anchors: Cow::Owned(vec![]),
            ..VehicleConfig::default()
        };
        assert_eq!(
            Vehicle::new(&mut physics, &config, Position::default(), Angle::default()).err(),
            Some(ConfigError::NoTires)
        );
    }

    #[test]
    fn test_vehicle_drives_straight() {
        let mut physics = context();
        let mut vehicle = vehicle(&mut physics);
        drive(&mut physics, &mut vehicle, 60, (10.0, 0.0));
        let mut previous = vehicle.pose(&physics).0.y();
        for _ in 0..4 {
            drive(&mut physics, &mut vehicle, 30, (10.0, 0.0));
            let (position, angle) = vehicle.pose(&physics);
            assert!(position.y() > previous);
            assert!(position.x().abs() < 0.5);
            assert!(f64::from(angle).abs() < 0.05);
            previous = position.y();
        }
    }

    #[test]
    fn test_vehicle_turns_in_place() {
        let mut physics = context();
        let mut vehicle = vehicle(&mut physics);
        let axle_center = |physics: &PhysicsContext, vehicle: &Vehicle| {
            let [left, right] = [0, 1].map(|i| physics.pose(vehicle.tires()[i].body()).unwrap().0);
            (left + right) * 0.5
        };
        let start = axle_center(&physics, &vehicle);
        drive(&mut physics, &mut vehicle, 30, (0.0, 10.0));
        let first = f64::from(vehicle.pose(&physics).1);
        drive(&mut physics, &mut vehicle, 30, (0.0, 10.0));
        let second = f64::from(vehicle.pose(&physics).1);

        assert!(first > 0.0);
        assert!(second > first);
        assert!(axle_center(&physics, &vehicle).distance(start) < 0.5);
    }

    #[test]
    fn test_tires_locked_to_chassis() {
        let mut physics = context();
        let mut vehicle = vehicle(&mut physics);
        drive(&mut physics, &mut vehicle, 45, (5.0, -10.0));
        let chassis = vehicle.pose(&physics).1;
        for tire in vehicle.tires() {
            let (_, angle) = physics.pose(tire.body()).unwrap();
            assert_abs_diff_eq!(angle, chassis, epsilon = 0.05);
        }
    }

    #[test]
    fn test_vehicle_deterministic() {
        let run = || {
            let mut physics = context();
            let mut vehicle = vehicle(&mut physics);
            drive(&mut physics, &mut vehicle, 90, (8.0, 3.0));
            vehicle.pose(&physics)
        };
        assert_eq!(run(), run());
    }
}
