//! The world: an ordered registry of bodies sharing one solver context.
//!
//! A frame steps every body in registration order, then advances the solver once, then clears
//! the forces accumulated during the frame.

use tracing::debug;

use super::{
    Body, Canvas, ConfigError, Frame, Input, PhysicsContext, SolverConfig, WorldError,
};

/// Index of a body in registration order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BodyId(usize);

impl BodyId {
    pub fn index(&self) -> usize {
        self.0
    }
}

pub struct World {
    physics: PhysicsContext,
    bodies: Vec<Box<dyn Body>>,
    frame: u64,
    time: f64,
}

impl World {
    pub fn new(config: SolverConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            physics: PhysicsContext::new(config)?,
            bodies: Vec::new(),
            frame: 0,
            time: 0.0,
        })
    }

    pub fn physics(&self) -> &PhysicsContext {
        &self.physics
    }

    /// Solver access for building bodies before they are added.
    pub fn physics_mut(&mut self) -> &mut PhysicsContext {
        &mut self.physics
    }

    pub fn add(&mut self, body: impl Body) -> Result<BodyId, WorldError> {
        self.add_boxed(Box::new(body))
    }

    pub fn add_boxed(&mut self, body: Box<dyn Body>) -> Result<BodyId, WorldError> {
        if body.context() != self.physics.id() {
            return Err(WorldError::ForeignBody {
                body: body.context(),
                world: self.physics.id(),
            });
        }
        let id = BodyId(self.bodies.len());
        debug!(body = id.0, "body registered");
        self.bodies.push(body);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn body<T: Body>(&self, id: BodyId) -> Option<&T> {
        self.bodies.get(id.0)?.as_any().downcast_ref()
    }

    pub fn body_mut<T: Body>(&mut self, id: BodyId) -> Option<&mut T> {
        self.bodies.get_mut(id.0)?.as_any_mut().downcast_mut()
    }

    /// Number of completed frames.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds elapsed.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step(&mut self, input: &Input) {
        let dt = self.physics.timestep();
        let frame = Frame {
            index: self.frame,
            time: self.time,
            dt,
            input,
        };
        for body in &mut self.bodies {
            body.step(&mut self.physics, &frame);
        }
        self.physics.step();
        self.physics.clear_forces();

        self.frame += 1;
        self.time += dt;
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        for body in &self.bodies {
            body.draw(&self.physics, canvas);
        }
    }
}
