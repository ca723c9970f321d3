//! Scenery: static walls, a maze and loose balls.

use std::any::Any;

use once_cell::sync::Lazy;
use rapier2d_f64::prelude::RigidBodyHandle;

use super::{
    Angle, Body, Canvas, Color, ConfigError, ContextId, Material, PhysicsContext, Position,
};

/// Origin of every static scenery body.
const SCENERY_ORIGIN: Position = Position::new(0.0, 20.0);

pub const ARENA_BOUNDARY: [Position; 5] = [
    Position::new(-70.0, -50.0),
    Position::new(-70.0, 50.0),
    Position::new(70.0, 50.0),
    Position::new(70.0, -50.0),
    Position::new(-70.0, -50.0),
];

const MAZE_SCALE: f64 = 1.5;

const MAZE_WALLS: [&[(f64, f64)]; 6] = [
    &[(51., -50.), (51., -9.), (49., -9.), (49., -50.), (51., -50.)],
    &[
        (-11., -50.),
        (-11., -29.),
        (29., -29.),
        (29., -9.),
        (31., -9.),
        (31., -31.),
        (-9., -31.),
        (-9., -50.),
        (-11., -50.),
    ],
    &[
        (-11., 50.),
        (-11., 29.),
        (11., 29.),
        (11., 31.),
        (-9., 31.),
        (-9., 50.),
        (-11., 50.),
    ],
    &[
        (-31., 50.),
        (-31., 31.),
        (-51., 31.),
        (-51., 29.),
        (-29., 29.),
        (-29., 50.),
        (-31., 50.),
    ],
    &[
        (-31., -50.),
        (-31., -31.),
        (-51., -31.),
        (-51., -29.),
        (-31., -29.),
        (-31., -9.),
        (-11., -9.),
        (-11., 9.),
        (-49., 9.),
        (-49., -11.),
        (-51., -11.),
        (-51., 11.),
        (49., 11.),
        (49., 29.),
        (29., 29.),
        (29., 31.),
        (51., 31.),
        (51., 9.),
        (-9., 9.),
        (-9., -9.),
        (11., -9.),
        (11., -11.),
        (-29., -11.),
        (-29., -50.),
    ],
    &[(-70., -50.), (-70., 50.), (70., 50.), (70., -50.), (-70., -50.)],
];

pub static DEFAULT_MAZE: Lazy<MazeLayout> = Lazy::new(|| MazeLayout::scaled(MAZE_SCALE));

#[derive(Debug)]
pub struct Wall {
    context: ContextId,
    body: RigidBodyHandle,
    boundary: Vec<Position>,
}

impl Wall {
    /// An edge chain through `boundary`, given relative to the scenery origin.
    pub fn new(physics: &mut PhysicsContext, boundary: &[Position]) -> Result<Self, ConfigError> {
        let body = physics.create_static_body(SCENERY_ORIGIN);
        physics.attach_edge_chain(body, boundary)?;
        Ok(Self {
            context: physics.id(),
            body,
            boundary: boundary.to_vec(),
        })
    }

    /// The default rectangular arena.
    pub fn arena(physics: &mut PhysicsContext) -> Result<Self, ConfigError> {
        Self::new(physics, &ARENA_BOUNDARY)
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn boundary(&self) -> &[Position] {
        &self.boundary
    }
}

impl Body for Wall {
    fn context(&self) -> ContextId {
        self.context
    }

    fn draw(&self, physics: &PhysicsContext, canvas: &mut dyn Canvas) {
        draw_outline(physics, self.body, &self.boundary, Color::WHITE, canvas);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct Ball {
    context: ContextId,
    body: RigidBodyHandle,
    radius: f64,
}

impl Ball {
    pub const RADIUS: f64 = 1.0;
    pub const MATERIAL: Material = Material::new(0.01, 0.1);

    pub fn new(physics: &mut PhysicsContext, position: Position) -> Self {
        Self::with_radius(physics, position, Self::RADIUS)
    }

    pub fn with_radius(physics: &mut PhysicsContext, position: Position, radius: f64) -> Self {
        let body = physics.create_dynamic_body(position, Angle::default());
        physics.attach_ball(body, radius, Self::MATERIAL);
        Self {
            context: physics.id(),
            body,
            radius,
        }
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn position(&self, physics: &PhysicsContext) -> Position {
        physics.pose(self.body).map(|(p, _)| p).unwrap_or_default()
    }
}

impl Body for Ball {
    fn context(&self) -> ContextId {
        self.context
    }

    fn draw(&self, physics: &PhysicsContext, canvas: &mut dyn Canvas) {
        canvas.circle(self.position(physics), self.radius, Color::GREEN);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Maze walls plus the start and finish lines, relative to the scenery origin.
#[derive(Clone, Debug, PartialEq)]
pub struct MazeLayout {
    pub boundaries: Vec<Vec<Position>>,
    pub start_line: [Position; 2],
    pub finish_line: [Position; 2],
}

impl MazeLayout {
    /// The built-in maze with every wall vertex scaled by `ratio` and truncated to whole units.
    pub fn scaled(ratio: f64) -> Self {
        let boundaries = MAZE_WALLS
            .iter()
            .map(|wall| {
                wall.iter()
                    .map(|&(x, y)| Position::new((x * ratio).trunc(), (y * ratio).trunc()))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let start = boundaries[5][3];
        let finish = boundaries[4][5];
        Self {
            start_line: [
                start + Position::new(-19.0, 25.0) * ratio,
                start + Position::new(0.0, 25.0) * ratio,
            ],
            finish_line: [finish, finish + Position::new(0.0, 17.0) * ratio],
            boundaries,
        }
    }
}

#[derive(Debug)]
pub struct Maze {
    context: ContextId,
    body: RigidBodyHandle,
    layout: MazeLayout,
}

impl Maze {
    pub fn new(physics: &mut PhysicsContext, layout: &MazeLayout) -> Result<Self, ConfigError> {
        let body = physics.create_static_body(SCENERY_ORIGIN);
        for boundary in &layout.boundaries {
            physics.attach_edge_chain(body, boundary)?;
        }
        Ok(Self {
            context: physics.id(),
            body,
            layout: layout.clone(),
        })
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn layout(&self) -> &MazeLayout {
        &self.layout
    }
}

impl Body for Maze {
    fn context(&self) -> ContextId {
        self.context
    }

    fn draw(&self, physics: &PhysicsContext, canvas: &mut dyn Canvas) {
        for boundary in &self.layout.boundaries {
            draw_outline(physics, self.body, boundary, Color::WHITE, canvas);
        }
        draw_outline(physics, self.body, &self.layout.start_line, Color::FINISH, canvas);
        draw_outline(physics, self.body, &self.layout.finish_line, Color::GREEN, canvas);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn draw_outline(
    physics: &PhysicsContext,
    body: RigidBodyHandle,
    vertices: &[Position],
    color: Color,
    canvas: &mut dyn Canvas,
) {
    let vertices = vertices
        .iter()
        .filter_map(|&v| physics.world_point(body, v))
        .collect::<Vec<_>>();
    canvas.polygon(&vertices, color);
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tests::context;

    #[test]
    fn test_default_maze_layout() {
        let layout = &*DEFAULT_MAZE;
        assert_eq!(layout.boundaries.len(), 6);
        assert_eq!(
            layout.boundaries[5],
            vec![
                Position::new(-105.0, -75.0),
                Position::new(-105.0, 75.0),
                Position::new(105.0, 75.0),
                Position::new(105.0, -75.0),
                Position::new(-105.0, -75.0),
            ]
        );
        assert_eq!(layout.boundaries[0][1], Position::new(76.0, -13.0));
        assert_eq!(
            layout.start_line,
            [Position::new(76.5, -37.5), Position::new(105.0, -37.5)]
        );
        assert_eq!(
            layout.finish_line,
            [Position::new(-46.0, -13.0), Position::new(-46.0, 12.5)]
        );
    }

    #[test]
    fn test_short_wall_rejected() {
        let mut physics = context();
        assert_eq!(
            Wall::new(&mut physics, &[Position::new(1.0, 1.0)]).err(),
            Some(ConfigError::ShortBoundary(1))
        );
    }

    #[test]
    fn test_arena_wall_blocks_rays() {
        let mut physics = context();
        Wall::arena(&mut physics).unwrap();
        physics.step();
        let hit = physics
            .cast_ray(Position::default(), Position::new(100.0, 0.0), None)
            .unwrap();
        assert_abs_diff_eq!(hit, Position::new(70.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_maze_lines_in_world_frame() {
        let mut physics = context();
        let maze = Maze::new(&mut physics, &DEFAULT_MAZE).unwrap();
        physics.step();
        let start = physics
            .world_point(maze.body(), maze.layout().start_line[0])
            .unwrap();
        assert_abs_diff_eq!(start, Position::new(76.5, -17.5), epsilon = 1e-9);
    }

    #[test]
    fn test_ball_is_dynamic() {
        let mut physics = context();
        let ball = Ball::new(&mut physics, Position::new(3.0, 4.0));
        physics.add_force(ball.body(), Position::new(1.0, 0.0));
        physics.step();
        assert!(ball.position(&physics).x() > 3.0);
        assert_eq!(ball.radius(), 1.0);
    }
}
