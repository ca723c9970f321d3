//! Two-claw gripper on motorized hinges at the front of a chassis.
//!
//! Both hinges are always driven with opposite motor speeds, so the claws move symmetrically.
//! The hinge limits stop the claws at ±π/8 no matter how long the motors run.

use std::{borrow::Cow, f64::consts::PI};

use rapier2d_f64::prelude::{ImpulseJointHandle, RigidBodyHandle};

use super::{Angle, Canvas, Color, ConfigError, Hinge, Material, PhysicsContext, Position};

const MOTOR_SPEED: f64 = 0.5;
const MAX_MOTOR_TORQUE: f64 = 1000.0;
const ANGLE_LIMIT: f64 = PI / 8.0;

const AXLE: f64 = 0.5;
const LENGTH: f64 = 4.8;
const LIP: f64 = 3.0;
const WIDTH: f64 = 2.0;
const BASE: f64 = 0.5;
const SLACK: f64 = 0.01;

pub const LEFT_CLAW: [Position; 7] = [
    Position::new(-AXLE, 0.0),
    Position::new(-WIDTH, BASE),
    Position::new(-WIDTH, LENGTH - LIP),
    Position::new(-AXLE, LENGTH),
    Position::new(-WIDTH - SLACK, LENGTH - LIP),
    Position::new(-WIDTH - SLACK, BASE),
    Position::new(-AXLE, 0.0),
];

pub const RIGHT_CLAW: [Position; 7] = [
    Position::new(AXLE, 0.0),
    Position::new(WIDTH, BASE),
    Position::new(WIDTH, LENGTH - LIP),
    Position::new(AXLE, LENGTH),
    Position::new(WIDTH + SLACK, LENGTH - LIP),
    Position::new(WIDTH + SLACK, BASE),
    Position::new(AXLE, 0.0),
];

#[derive(Clone, Debug, PartialEq)]
pub struct GripperConfig {
    /// Mount point in the chassis frame.
    pub position: Position,
    /// Claw outlines relative to the mount point. The first vertex of each is its hinge.
    pub claws: [Cow<'static, [Position]>; 2],
    pub material: Material,
}

impl Default for GripperConfig {
    fn default() -> Self {
        Self {
            position: Position::new(0.0, 8.5),
            claws: [Cow::Borrowed(&LEFT_CLAW), Cow::Borrowed(&RIGHT_CLAW)],
            material: Material::new(0.01, 0.001),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Gripper {
    bodies: [RigidBodyHandle; 2],
    joints: [ImpulseJointHandle; 2],
    /// Claw outlines in each claw's own frame.
    outlines: [Vec<Position>; 2],
    aperture: Angle,
}

impl Gripper {
    pub fn new(
        physics: &mut PhysicsContext,
        chassis: RigidBodyHandle,
        config: &GripperConfig,
    ) -> Result<Self, ConfigError> {
        let (chassis_position, chassis_angle) = physics.pose(chassis).unwrap_or_default();

        let mut claw = |vertices: &[Position]| {
            let hinge = *vertices.first().ok_or(ConfigError::DegenerateShape(0))?;
            let anchor = config.position + hinge;
            let outline = vertices.iter().map(|&v| v - hinge).collect::<Vec<_>>();

            let body = physics.create_dynamic_body(
                chassis_position + anchor.rotate_vector(chassis_angle),
                chassis_angle,
            );
            physics.attach_polygon(body, &outline, config.material)?;
            let joint = physics.insert_hinge(
                chassis,
                body,
                Hinge {
                    anchor1: anchor,
                    anchor2: Position::default(),
                    limits: [-ANGLE_LIMIT, ANGLE_LIMIT],
                    max_motor_torque: Some(MAX_MOTOR_TORQUE),
                    contacts_enabled: false,
                },
            );
            Ok::<_, ConfigError>((body, joint, outline))
        };

        let (left_body, left_joint, left_outline) = claw(&config.claws[0])?;
        let (right_body, right_joint, right_outline) = claw(&config.claws[1])?;

        Ok(Self {
            bodies: [left_body, right_body],
            joints: [left_joint, right_joint],
            outlines: [left_outline, right_outline],
            aperture: Angle::default(),
        })
    }

    pub fn bodies(&self) -> [RigidBodyHandle; 2] {
        self.bodies
    }

    pub fn joints(&self) -> [ImpulseJointHandle; 2] {
        self.joints
    }

    pub fn open(&mut self, physics: &mut PhysicsContext) {
        self.set_motor_speeds(physics, MOTOR_SPEED);
    }

    pub fn close(&mut self, physics: &mut PhysicsContext) {
        self.set_motor_speeds(physics, -MOTOR_SPEED);
    }

    fn set_motor_speeds(&mut self, physics: &mut PhysicsContext, speed: f64) {
        physics.set_motor_speed(self.joints[0], speed);
        physics.set_motor_speed(self.joints[1], -speed);
    }

    pub fn motor_speeds(&self, physics: &PhysicsContext) -> [f64; 2] {
        self.joints
            .map(|joint| physics.motor_speed(joint).unwrap_or_default())
    }

    /// Current angle of the right claw's hinge, a proxy for the aperture.
    pub fn get_angle(&self, physics: &PhysicsContext) -> Angle {
        physics.hinge_angle(self.joints[1]).unwrap_or_default()
    }

    /// Aperture sampled during the last step.
    pub fn aperture(&self) -> Angle {
        self.aperture
    }

    pub fn step(&mut self, physics: &PhysicsContext) {
        self.aperture = self.get_angle(physics);
    }

    pub fn draw(&self, physics: &PhysicsContext, canvas: &mut dyn Canvas) {
        for (body, outline) in self.bodies.iter().zip(&self.outlines) {
            let vertices = outline
                .iter()
                .filter_map(|&v| physics.world_point(*body, v))
                .collect::<Vec<_>>();
            canvas.polygon(&vertices, Color::BLUE);
        }
    }
}
