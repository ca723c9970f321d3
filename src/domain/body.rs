//! The capabilities every simulated body provides to the world.

use std::any::Any;

use super::{ContextId, Input, PhysicsContext, Position};

/// Per-frame information handed to every body while it steps.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub index: u64,
    /// Simulated time at the start of the frame in seconds.
    pub time: f64,
    pub dt: f64,
    pub input: &'a Input,
}

pub trait Body: Any + Send + Sync {
    /// The solver context the body's handles belong to.
    fn context(&self) -> ContextId;

    /// Sensing and actuation for this frame, run before the solver integrates.
    fn step(&mut self, _physics: &mut PhysicsContext, _frame: &Frame) {}

    fn draw(&self, physics: &PhysicsContext, canvas: &mut dyn Canvas);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0, 255);
    pub const GREEN: Color = Color::new(0, 255, 0, 255);
    pub const BLUE: Color = Color::new(0, 0, 255, 255);
    pub const RAY: Color = Color::new(128, 128, 255, 128);
    pub const FINISH: Color = Color::new(0, 255, 128, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Drawing surface in world coordinates.
pub trait Canvas {
    /// Closed outline through `vertices`.
    fn polygon(&mut self, vertices: &[Position], color: Color);

    fn circle(&mut self, center: Position, radius: f64, color: Color);

    fn edge(&mut self, from: Position, to: Position, color: Color);
}
