//! Basic building blocks.

use std::{
    f64::consts::PI,
    ops::{Add, Mul, Neg, Sub},
};

use nalgebra::{Point2, Vector2};

/// A point or a free vector in the plane, depending on context.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn distance(&self, position: Self) -> f64 {
        ((self.x - position.x).powi(2) + (self.y - position.y).powi(2)).sqrt()
    }

    pub fn rotate_vector(&self, angle: Angle) -> Position {
        Position::new(
            self.x * angle.0.cos() - self.y * angle.0.sin(),
            self.x * angle.0.sin() + self.y * angle.0.cos(),
        )
    }

    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    /// Splits the vector into its unit direction and its length. The zero vector has no
    /// direction.
    pub fn normalized(&self) -> Option<(Position, f64)> {
        let length = self.length();
        if length < f64::EPSILON {
            None
        } else {
            Some((*self * length.recip(), length))
        }
    }

    /// Projection onto the line spanned by the unit vector `axis`.
    pub fn project_on(&self, axis: Self) -> Position {
        axis * self.dot(axis)
    }
}

impl From<Position> for (f32, f32) {
    fn from(value: Position) -> Self {
        (value.x as f32, value.y as f32)
    }
}

impl From<Position> for (f64, f64) {
    fn from(value: Position) -> Self {
        (value.x, value.y)
    }
}

impl From<(f64, f64)> for Position {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<Position> for Point2<f64> {
    fn from(value: Position) -> Self {
        Point2::new(value.x, value.y)
    }
}

impl From<Point2<f64>> for Position {
    fn from(value: Point2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Position> for Vector2<f64> {
    fn from(value: Position) -> Self {
        Vector2::new(value.x, value.y)
    }
}

impl From<Vector2<f64>> for Position {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Neg for Position {
    type Output = Position;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Mul<f64> for Position {
    type Output = Position;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Angle(f64);

impl Angle {
    pub const fn new(radians: f64) -> Self {
        Self(radians)
    }

    pub fn from_deg(degree: f64) -> Self {
        Self(degree * PI / 180.0)
    }

    pub fn to_deg(self) -> f64 {
        (self.0 * (180.0 / PI) + 360.0) % 360.0
    }

    pub fn unit_vector(self) -> Position {
        Position::new(self.0.cos(), self.0.sin())
    }
}

impl Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Angle(-self.0)
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl From<Angle> for f64 {
    fn from(value: Angle) -> Self {
        value.0
    }
}

impl From<Angle> for f32 {
    fn from(value: Angle) -> Self {
        value.0 as f32
    }
}
