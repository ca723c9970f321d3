//! Rigid-body solver context.
//!
//! Wraps the solver sets and exposes the handful of operations the rover model needs: creating
//! bodies and shapes, joining them, applying forces and impulses, casting rays and stepping.
//! Forces added with [`PhysicsContext::add_force`] persist until [`PhysicsContext::clear_forces`]
//! is called; impulses change velocities immediately.

use std::{
    num::NonZeroUsize,
    sync::atomic::{AtomicU64, Ordering},
};

use rapier2d_f64::{parry::query::PointQuery, prelude::*};

use super::{Angle, ConfigError, Position};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Identifies the solver context a body was built against.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ContextId(u64);

/// Fixed stepping configuration, chosen once when the context is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    pub timestep: f64,
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    pub gravity: Position,
}

impl SolverConfig {
    pub const fn new(
        timestep: f64,
        velocity_iterations: usize,
        position_iterations: usize,
        gravity: Position,
    ) -> Self {
        Self {
            timestep,
            velocity_iterations,
            position_iterations,
            gravity,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new(1.0 / 60.0, 10, 10, Position::new(0.0, 0.0))
    }
}

/// Physical parameters of a collision shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub density: f64,
    pub friction: f64,
}

impl Material {
    pub const fn new(density: f64, friction: f64) -> Self {
        Self { density, friction }
    }
}

/// Anchors, limits and motor of a revolute joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hinge {
    pub anchor1: Position,
    pub anchor2: Position,
    pub limits: [f64; 2],
    pub max_motor_torque: Option<f64>,
    pub contacts_enabled: bool,
}

pub struct PhysicsContext {
    id: ContextId,
    config: SolverConfig,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

/// Damping factor of joint velocity motors. Large enough for the motor to track its target
/// speed within a few steps.
const MOTOR_FACTOR: f64 = 100.0;

impl PhysicsContext {
    pub fn new(config: SolverConfig) -> Result<Self, ConfigError> {
        if !config.timestep.is_finite() || config.timestep <= 0.0 {
            return Err(ConfigError::InvalidTimestep(config.timestep));
        }
        let num_solver_iterations = NonZeroUsize::new(config.velocity_iterations)
            .ok_or(ConfigError::NoVelocityIterations)?;

        let integration_parameters = IntegrationParameters {
            dt: config.timestep,
            num_solver_iterations,
            num_internal_stabilization_iterations: config.position_iterations,
            ..IntegrationParameters::default()
        };

        Ok(Self {
            id: ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)),
            config,
            gravity: config.gravity.into(),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        })
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn timestep(&self) -> f64 {
        self.config.timestep
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn create_dynamic_body(&mut self, position: Position, angle: Angle) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(position.into())
            .rotation(angle.into())
            .can_sleep(false)
            .build();
        self.bodies.insert(body)
    }

    pub fn create_static_body(&mut self, position: Position) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(position.into())
            .build();
        self.bodies.insert(body)
    }

    /// Attaches the convex hull of `vertices` (body-local) to `body`.
    pub fn attach_polygon(
        &mut self,
        body: RigidBodyHandle,
        vertices: &[Position],
        material: Material,
    ) -> Result<ColliderHandle, ConfigError> {
        let points = vertices
            .iter()
            .map(|&v| Point::<Real>::from(v))
            .collect::<Vec<_>>();
        let collider = ColliderBuilder::convex_hull(&points)
            .ok_or(ConfigError::DegenerateShape(vertices.len()))?
            .density(material.density)
            .friction(material.friction)
            .build();
        Ok(self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies))
    }

    pub fn attach_box(
        &mut self,
        body: RigidBodyHandle,
        half_extents: Position,
        material: Material,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x(), half_extents.y())
            .density(material.density)
            .friction(material.friction)
            .build();
        self.colliders
            .insert_with_parent(collider, body, &mut self.bodies)
    }

    pub fn attach_ball(
        &mut self,
        body: RigidBodyHandle,
        radius: f64,
        material: Material,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius)
            .density(material.density)
            .friction(material.friction)
            .build();
        self.colliders
            .insert_with_parent(collider, body, &mut self.bodies)
    }

    /// Attaches an open chain of edges through `vertices` (body-local) to `body`.
    pub fn attach_edge_chain(
        &mut self,
        body: RigidBodyHandle,
        vertices: &[Position],
    ) -> Result<ColliderHandle, ConfigError> {
        if vertices.len() < 2 {
            return Err(ConfigError::ShortBoundary(vertices.len()));
        }
        let points = vertices.iter().map(|&v| Point::<Real>::from(v)).collect();
        let collider = ColliderBuilder::polyline(points, None).build();
        Ok(self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies))
    }

    pub fn insert_hinge(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        hinge: Hinge,
    ) -> ImpulseJointHandle {
        let mut builder = RevoluteJointBuilder::new()
            .local_anchor1(hinge.anchor1.into())
            .local_anchor2(hinge.anchor2.into())
            .limits(hinge.limits)
            .contacts_enabled(hinge.contacts_enabled);
        if let Some(max_torque) = hinge.max_motor_torque {
            builder = builder
                .motor_velocity(0.0, MOTOR_FACTOR)
                .motor_max_force(max_torque);
        }
        self.impulse_joints
            .insert(body1, body2, builder.build(), true)
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    pub fn pose(&self, handle: RigidBodyHandle) -> Option<(Position, Angle)> {
        self.bodies.get(handle).map(|body| {
            (
                Position::from(*body.translation()),
                Angle::new(body.rotation().angle()),
            )
        })
    }

    /// Transforms a body-local point into world coordinates.
    pub fn world_point(&self, handle: RigidBodyHandle, local: Position) -> Option<Position> {
        self.bodies
            .get(handle)
            .map(|body| Position::from(body.position() * Point::<Real>::from(local)))
    }

    /// Rotates a body-local direction into world coordinates.
    pub fn world_vector(&self, handle: RigidBodyHandle, local: Position) -> Option<Position> {
        self.bodies
            .get(handle)
            .map(|body| Position::from(body.rotation() * Vector::<Real>::from(local)))
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Option<Position> {
        self.bodies
            .get(handle)
            .map(|body| Position::from(*body.linvel()))
    }

    pub fn angular_velocity(&self, handle: RigidBodyHandle) -> Option<f64> {
        self.bodies.get(handle).map(|body| body.angvel())
    }

    pub fn mass(&self, handle: RigidBodyHandle) -> Option<f64> {
        self.bodies.get(handle).map(|body| body.mass())
    }

    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Position) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.apply_impulse(impulse.into(), true);
        }
    }

    pub fn apply_angular_impulse(&mut self, handle: RigidBodyHandle, impulse: f64) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.apply_torque_impulse(impulse, true);
        }
    }

    pub fn add_force(&mut self, handle: RigidBodyHandle, force: Position) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.add_force(force.into(), true);
        }
    }

    pub fn set_motor_speed(&mut self, handle: ImpulseJointHandle, speed: f64) {
        let Some(joint) = self.impulse_joints.get_mut(handle) else {
            return;
        };
        if let Some(revolute) = joint.data.as_revolute_mut() {
            revolute.set_motor_velocity(speed, MOTOR_FACTOR);
        }
        let (body1, body2) = (joint.body1, joint.body2);
        for body in [body1, body2] {
            if let Some(body) = self.bodies.get_mut(body) {
                body.wake_up(true);
            }
        }
    }

    pub fn motor_speed(&self, handle: ImpulseJointHandle) -> Option<f64> {
        self.impulse_joints
            .get(handle)?
            .data
            .as_revolute()?
            .motor()
            .map(|motor| motor.target_vel)
    }

    /// Rotation of the second body relative to the first, in `(-π, π]`.
    pub fn hinge_angle(&self, handle: ImpulseJointHandle) -> Option<Angle> {
        let joint = self.impulse_joints.get(handle)?;
        let body1 = self.bodies.get(joint.body1)?;
        let body2 = self.bodies.get(joint.body2)?;
        Some(Angle::new(
            (body1.rotation().inverse() * body2.rotation()).angle(),
        ))
    }

    /// Nearest intersection of the segment `from -> to` with any collider not attached to
    /// `exclude`. Colliders that already contain `from` are ignored.
    pub fn cast_ray(
        &self,
        from: Position,
        to: Position,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<Position> {
        let ray = Ray::new(from.into(), (to - from).into());
        let outside = |_: ColliderHandle, collider: &Collider| {
            !collider
                .shape()
                .contains_point(collider.position(), &ray.origin)
        };
        let mut filter = QueryFilter::default().predicate(&outside);
        if let Some(body) = exclude {
            filter = filter.exclude_rigid_body(body);
        }
        self.query_pipeline
            .cast_ray(&self.bodies, &self.colliders, &ray, 1.0, true, filter)
            .map(|(_, toi)| Position::from(ray.point_at(toi)))
    }

    /// Advances the solver by one fixed timestep.
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Drops the forces and torques accumulated since the last call.
    pub fn clear_forces(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            body.reset_forces(false);
            body.reset_torques(false);
        }
    }
}
