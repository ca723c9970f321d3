//! Rovers: a vehicle with an explicit, ordered list of attached capabilities.
//!
//! Each frame a rover applies tire friction, then steps its capabilities in the order they were
//! attached, then hands control to its [`Policy`] if it has one. Sensor values a policy reads were
//! therefore measured against the poses of the previous solver step.

use std::any::Any;

use tracing::debug;

use super::{
    Angle, Body, Canvas, ConfigError, ContextId, Frame, Gripper, GripperConfig, Input, Key,
    LaserArray, LaserArrayConfig, PhysicsContext, Position, Vehicle, VehicleConfig,
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Capability {
    /// Keyboard driving and, with a gripper attached, claw control.
    Teleop,
    FrontIr,
    RearIr,
    Gripper,
    LaserScan,
}

/// Control decisions made at the end of a rover's step.
pub trait Policy: Send + Sync {
    fn act(&mut self, rover: &mut Rover, physics: &mut PhysicsContext, frame: &Frame);
}

impl<F> Policy for F
where
    F: FnMut(&mut Rover, &mut PhysicsContext, &Frame) + Send + Sync,
{
    fn act(&mut self, rover: &mut Rover, physics: &mut PhysicsContext, frame: &Frame) {
        self(rover, physics, frame)
    }
}

pub struct RoverBuilder {
    vehicle: VehicleConfig,
    capabilities: Vec<Capability>,
    laser_scan: LaserArrayConfig,
    front_ir: LaserArrayConfig,
    rear_ir: LaserArrayConfig,
    gripper: GripperConfig,
    policy: Option<Box<dyn Policy>>,
}

impl Default for RoverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RoverBuilder {
    /// A bare vehicle without capabilities.
    pub fn new() -> Self {
        Self {
            vehicle: VehicleConfig::default(),
            capabilities: Vec::new(),
            laser_scan: LaserArrayConfig::LASER_SCAN,
            front_ir: LaserArrayConfig::FRONT_IR,
            rear_ir: LaserArrayConfig::REAR_IR,
            gripper: GripperConfig::default(),
            policy: None,
        }
    }

    pub fn rover() -> Self {
        Self::new()
            .with(Capability::FrontIr)
            .with(Capability::RearIr)
            .with(Capability::Gripper)
            .with(Capability::LaserScan)
    }

    pub fn keyboard_rover() -> Self {
        Self::new()
            .with(Capability::Teleop)
            .with(Capability::FrontIr)
            .with(Capability::RearIr)
            .with(Capability::Gripper)
            .with(Capability::LaserScan)
    }

    /// Appends `capability` to the step sequence. Attaching it twice has no effect.
    pub fn with(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    pub fn vehicle(mut self, config: VehicleConfig) -> Self {
        self.vehicle = config;
        self
    }

    pub fn laser_scan(mut self, config: LaserArrayConfig) -> Self {
        self.laser_scan = config;
        self
    }

    pub fn front_ir(mut self, config: LaserArrayConfig) -> Self {
        self.front_ir = config;
        self
    }

    pub fn rear_ir(mut self, config: LaserArrayConfig) -> Self {
        self.rear_ir = config;
        self
    }

    pub fn gripper(mut self, config: GripperConfig) -> Self {
        self.gripper = config;
        self
    }

    pub fn policy(mut self, policy: impl Policy + 'static) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn build(
        self,
        physics: &mut PhysicsContext,
        position: Position,
        angle: Angle,
    ) -> Result<Rover, ConfigError> {
        let vehicle = Vehicle::new(physics, &self.vehicle, position, angle)?;
        let chassis = vehicle.body();

        let mut rover = Rover {
            context: physics.id(),
            vehicle,
            laser_scan: None,
            front_ir: None,
            rear_ir: None,
            gripper: None,
            sequence: self.capabilities,
            policy: self.policy,
        };
        for capability in &rover.sequence {
            match capability {
                Capability::Teleop => {}
                Capability::FrontIr => {
                    rover.front_ir = Some(LaserArray::new(chassis, &self.front_ir)?);
                }
                Capability::RearIr => {
                    rover.rear_ir = Some(LaserArray::new(chassis, &self.rear_ir)?);
                }
                Capability::Gripper => {
                    rover.gripper = Some(Gripper::new(physics, chassis, &self.gripper)?);
                }
                Capability::LaserScan => {
                    rover.laser_scan = Some(LaserArray::new(chassis, &self.laser_scan)?);
                }
            }
        }

        debug!(
            capabilities = ?rover.sequence,
            policy = rover.policy.is_some(),
            "rover assembled"
        );
        Ok(rover)
    }
}

pub struct Rover {
    context: ContextId,
    vehicle: Vehicle,
    laser_scan: Option<LaserArray>,
    front_ir: Option<LaserArray>,
    rear_ir: Option<LaserArray>,
    gripper: Option<Gripper>,
    sequence: Vec<Capability>,
    policy: Option<Box<dyn Policy>>,
}

impl Rover {
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn vehicle_mut(&mut self) -> &mut Vehicle {
        &mut self.vehicle
    }

    pub fn laser_scan(&self) -> Option<&LaserArray> {
        self.laser_scan.as_ref()
    }

    pub fn front_ir(&self) -> Option<&LaserArray> {
        self.front_ir.as_ref()
    }

    pub fn rear_ir(&self) -> Option<&LaserArray> {
        self.rear_ir.as_ref()
    }

    pub fn gripper(&self) -> Option<&Gripper> {
        self.gripper.as_ref()
    }

    pub fn gripper_mut(&mut self) -> Option<&mut Gripper> {
        self.gripper.as_mut()
    }

    /// Attached capabilities in step order.
    pub fn capabilities(&self) -> &[Capability] {
        &self.sequence
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.sequence.contains(&capability)
    }

    pub fn pose(&self, physics: &PhysicsContext) -> (Position, Angle) {
        self.vehicle.pose(physics)
    }

    fn teleop(&mut self, physics: &mut PhysicsContext, input: &Input) {
        let tires = self.vehicle.tires_mut();
        if input.is_pressed(Key::Up) {
            for tire in tires.iter_mut().take(2) {
                let speed = tire.max_forward_speed();
                tire.update_drive(physics, speed);
            }
        }
        if input.is_pressed(Key::Down) {
            for tire in tires.iter_mut().take(2) {
                let speed = tire.max_backward_speed();
                tire.update_drive(physics, speed);
            }
        }
        if input.is_pressed(Key::Left) {
            if let Some(tire) = tires.get_mut(1) {
                let speed = 0.5 * tire.max_forward_speed();
                tire.update_drive(physics, speed);
            }
        }
        if input.is_pressed(Key::Right) {
            if let Some(tire) = tires.get_mut(0) {
                let speed = 0.5 * tire.max_forward_speed();
                tire.update_drive(physics, speed);
            }
        }
    }

    fn step_capability(
        &mut self,
        capability: Capability,
        physics: &mut PhysicsContext,
        frame: &Frame,
    ) {
        match capability {
            Capability::Teleop => self.teleop(physics, frame.input),
            Capability::FrontIr => {
                if let Some(front_ir) = &mut self.front_ir {
                    front_ir.step(physics);
                }
            }
            Capability::RearIr => {
                if let Some(rear_ir) = &mut self.rear_ir {
                    rear_ir.step(physics);
                }
            }
            Capability::Gripper => {
                let teleop = self.has(Capability::Teleop);
                if let Some(gripper) = &mut self.gripper {
                    gripper.step(physics);
                    if teleop && frame.input.is_pressed(Key::Open) {
                        gripper.open(physics);
                    }
                    if teleop && frame.input.is_pressed(Key::Close) {
                        gripper.close(physics);
                    }
                }
            }
            Capability::LaserScan => {
                if let Some(laser_scan) = &mut self.laser_scan {
                    laser_scan.step(physics);
                }
            }
        }
    }
}

impl Body for Rover {
    fn context(&self) -> ContextId {
        self.context
    }

    fn step(&mut self, physics: &mut PhysicsContext, frame: &Frame) {
        self.vehicle.update_friction(physics);
        for index in 0..self.sequence.len() {
            let capability = self.sequence[index];
            self.step_capability(capability, physics, frame);
        }
        if let Some(mut policy) = self.policy.take() {
            policy.act(self, physics, frame);
            self.policy = Some(policy);
        }
    }

    fn draw(&self, physics: &PhysicsContext, canvas: &mut dyn Canvas) {
        self.vehicle.draw_chassis(physics, canvas);
        for array in [&self.front_ir, &self.rear_ir, &self.laser_scan]
            .into_iter()
            .flatten()
        {
            array.draw(physics, canvas);
        }
        if let Some(gripper) = &self.gripper {
            gripper.draw(physics, canvas);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
