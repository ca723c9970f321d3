//! Raycast distance sensors mounted on a body.
//!
//! A [`Laser`] has an emitter pose in its body's frame and a `(near, far)` range. Each step it
//! casts the segment between the near and far points, transformed by the body's current pose, and
//! reports the distance from the emitter to the nearest hit, or `far` if nothing is hit. A
//! [`LaserArray`] is a fan of lasers sharing one emitter position, evenly spread over an angle
//! range.

use std::f64::consts::PI;

use rapier2d_f64::prelude::RigidBodyHandle;

use super::{Angle, Canvas, Color, ConfigError, PhysicsContext, Position};

const HIT_MARKER_RADIUS: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaserRange {
    pub near: f64,
    pub far: f64,
}

impl LaserRange {
    pub const fn new(near: f64, far: f64) -> Self {
        Self { near, far }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.near.is_finite() && self.far.is_finite() && 0.0 <= self.near && self.near < self.far
        {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange {
                near: self.near,
                far: self.far,
            })
        }
    }
}

#[derive(Clone, Debug)]
pub struct Laser {
    body: RigidBodyHandle,
    position: Position,
    angle: Angle,
    range: LaserRange,
    hit: bool,
    hit_point: Option<Position>,
    value: f64,
}

impl Laser {
    pub fn new(
        body: RigidBodyHandle,
        position: Position,
        angle: Angle,
        range: LaserRange,
    ) -> Result<Self, ConfigError> {
        range.validate()?;
        Ok(Self {
            body,
            position,
            angle,
            range,
            hit: false,
            hit_point: None,
            value: range.far,
        })
    }

    pub fn angle(&self) -> Angle {
        self.angle
    }

    pub fn range(&self) -> LaserRange {
        self.range
    }

    pub fn hit(&self) -> bool {
        self.hit
    }

    pub fn hit_point(&self) -> Option<Position> {
        self.hit_point
    }

    /// Distance to the nearest hit of the last step, `far` without one.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn reset(&mut self) {
        self.hit = false;
        self.hit_point = None;
    }

    pub fn emitter_position(&self, physics: &PhysicsContext) -> Position {
        physics
            .world_point(self.body, self.position)
            .unwrap_or(self.position)
    }

    /// World-space endpoints of the ray for the body's current pose.
    pub fn ray(&self, physics: &PhysicsContext) -> (Position, Position) {
        let direction = self.angle.unit_vector();
        let local = |distance: f64| self.position + direction * distance;
        let world = |point: Position| physics.world_point(self.body, point).unwrap_or(point);
        (world(local(self.range.near)), world(local(self.range.far)))
    }

    pub fn step(&mut self, physics: &PhysicsContext) {
        let (from, to) = self.ray(physics);
        self.hit_point = physics.cast_ray(from, to, Some(self.body));
        self.hit = self.hit_point.is_some();
        self.value = match self.hit_point {
            Some(point) => point.distance(self.emitter_position(physics)),
            None => self.range.far,
        };
    }

    pub fn draw(&self, physics: &PhysicsContext, canvas: &mut dyn Canvas) {
        let (from, to) = self.ray(physics);
        match self.hit_point {
            Some(point) => {
                canvas.edge(from, point, Color::RAY);
                canvas.circle(point, HIT_MARKER_RADIUS, Color::RED);
            }
            None => canvas.edge(from, to, Color::RAY),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaserArrayConfig {
    pub position: Position,
    pub range: LaserRange,
    /// First and last emitter angle, inclusive.
    pub angle_range: (Angle, Angle),
    pub n_sensors: usize,
}

impl LaserArrayConfig {
    /// Long-range scan over the front half plane.
    pub const LASER_SCAN: LaserArrayConfig = LaserArrayConfig {
        position: Position::new(0.0, 5.0),
        range: LaserRange::new(8.0, 30.0),
        angle_range: (Angle::new(0.0), Angle::new(PI)),
        n_sensors: 45,
    };

    pub const FRONT_IR: LaserArrayConfig = LaserArrayConfig {
        position: Position::new(0.0, 6.0),
        range: LaserRange::new(3.0, 6.0),
        angle_range: (Angle::new(0.25 * PI), Angle::new(0.75 * PI)),
        n_sensors: 3,
    };

    pub const REAR_IR: LaserArrayConfig = LaserArrayConfig {
        position: Position::new(0.0, 2.6),
        range: LaserRange::new(3.0, 6.0),
        angle_range: (Angle::new(1.25 * PI), Angle::new(1.75 * PI)),
        n_sensors: 3,
    };
}

impl Default for LaserArrayConfig {
    fn default() -> Self {
        Self {
            n_sensors: 5,
            ..Self::LASER_SCAN
        }
    }
}

#[derive(Clone, Debug)]
pub struct LaserArray {
    lasers: Vec<Laser>,
    values: Vec<f64>,
}

impl LaserArray {
    pub fn new(body: RigidBodyHandle, config: &LaserArrayConfig) -> Result<Self, ConfigError> {
        let lasers = evenly_spaced(config.angle_range, config.n_sensors)?
            .into_iter()
            .map(|angle| Laser::new(body, config.position, angle, config.range))
            .collect::<Result<Vec<_>, _>>()?;
        let values = lasers.iter().map(Laser::value).collect();
        Ok(Self { lasers, values })
    }

    pub fn lasers(&self) -> &[Laser] {
        &self.lasers
    }

    /// Distances measured during the last step, in angle order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn angles(&self) -> Vec<Angle> {
        self.lasers.iter().map(Laser::angle).collect()
    }

    pub fn len(&self) -> usize {
        self.lasers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lasers.is_empty()
    }

    pub fn step(&mut self, physics: &PhysicsContext) {
        for laser in &mut self.lasers {
            laser.reset();
        }
        for (laser, value) in self.lasers.iter_mut().zip(self.values.iter_mut()) {
            laser.step(physics);
            *value = laser.value();
        }
    }

    pub fn draw(&self, physics: &PhysicsContext, canvas: &mut dyn Canvas) {
        for laser in &self.lasers {
            laser.draw(physics, canvas);
        }
    }
}

/// `n` angles from `start` to `end`, both included. A single sample sits at `start`.
fn evenly_spaced((start, end): (Angle, Angle), n: usize) -> Result<Vec<Angle>, ConfigError> {
    let (start, end) = (f64::from(start), f64::from(end));
    let degenerate = || ConfigError::DegenerateAngleRange {
        start,
        end,
        n_sensors: n,
    };
    match n {
        0 => Err(ConfigError::NoSensors),
        _ if !start.is_finite() || !end.is_finite() => Err(degenerate()),
        1 => Ok(vec![Angle::new(start)]),
        _ if start == end => Err(degenerate()),
        _ => {
            let step = (end - start) / (n - 1) as f64;
            Ok((0..n)
                .map(|i| {
                    if i == n - 1 {
                        Angle::new(end)
                    } else {
                        Angle::new(start + step * i as f64)
                    }
                })
                .collect())
        }
    }
}
