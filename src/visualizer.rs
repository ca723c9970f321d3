//! 2D visualization.
//!
//! The world draws itself through a gizmo-backed canvas every frame. World units are scaled by
//! the scene's pixels per unit, with +y pointing up on screen.

use bevy::prelude::*;
use rover_sim::domain::{self, BodyId, Canvas, Position, Rover};

use crate::{controller::scan_thirds, resource::SimulationRes};

/// Point the camera looks at, in world units.
const VIEW_CENTER: Position = Position::new(0.0, 20.0);

pub struct Visualizer;

impl Plugin for Visualizer {
    fn build(&self, app: &mut App) {
        app.init_resource::<Scene>()
            .add_systems(Startup, set_up)
            .add_systems(Update, (draw_world, update_text, handle_keyboard_input));
    }
}

#[derive(Resource)]
pub struct Scene {
    pub pixels_per_unit: f32,
    /// Rover whose sensors are shown in the text overlay.
    pub tracked: Option<BodyId>,
    pub show_text: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            pixels_per_unit: 5.0,
            tracked: None,
            show_text: true,
        }
    }
}

struct GizmoCanvas<'a, 'w, 's> {
    gizmos: &'a mut Gizmos<'w, 's>,
    pixels_per_unit: f32,
}

impl Canvas for GizmoCanvas<'_, '_, '_> {
    fn polygon(&mut self, vertices: &[Position], color: domain::Color) {
        let pixels_per_unit = self.pixels_per_unit;
        self.gizmos.linestrip_2d(
            vertices
                .iter()
                .chain(vertices.first())
                .map(|&v| to_bevy_position(v, pixels_per_unit)),
            to_bevy_color(color),
        );
    }

    fn circle(&mut self, center: Position, radius: f64, color: domain::Color) {
        self.gizmos.circle_2d(
            to_bevy_position(center, self.pixels_per_unit),
            radius as f32 * self.pixels_per_unit,
            to_bevy_color(color),
        );
    }

    fn edge(&mut self, from: Position, to: Position, color: domain::Color) {
        self.gizmos.line_2d(
            to_bevy_position(from, self.pixels_per_unit),
            to_bevy_position(to, self.pixels_per_unit),
            to_bevy_color(color),
        );
    }
}

fn set_up(mut commands: Commands, scene: Res<Scene>) {
    let center = to_bevy_position(VIEW_CENTER, scene.pixels_per_unit);
    commands.spawn(Camera2dBundle {
        transform: Transform::from_xyz(center.x, center.y, 999.9),
        ..default()
    });
    create_text(&mut commands);
}

fn create_text(commands: &mut Commands) {
    let text_style = TextStyle {
        font_size: 18.0,
        color: Color::rgb_u8(229, 153, 153),
        ..default()
    };
    commands.spawn(
        TextBundle::from_sections(vec![TextSection::new("", text_style)]).with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        }),
    );
}

fn draw_world(mut gizmos: Gizmos, simulation: Res<SimulationRes>, scene: Res<Scene>) {
    let mut canvas = GizmoCanvas {
        gizmos: &mut gizmos,
        pixels_per_unit: scene.pixels_per_unit,
    };
    simulation.world().draw(&mut canvas);
}

fn update_text(mut text: Query<&mut Text>, scene: Res<Scene>, simulation: Res<SimulationRes>) {
    let mut text = text.single_mut();
    if !scene.show_text {
        text.sections[0].value = String::new();
        return;
    }

    let world = simulation.world();
    let rover = scene.tracked.and_then(|id| world.body::<Rover>(id));
    let scan = rover
        .and_then(Rover::laser_scan)
        .and_then(|scan| scan_thirds(scan.values()))
        .map_or("---".to_string(), |[right, center, left]| {
            format!("left: {left:4.1}, center: {center:4.1}, right: {right:4.1}")
        });
    let gripper = rover
        .and_then(Rover::gripper)
        .map_or("---".to_string(), |gripper| {
            format!("{:5.1} deg", f64::from(gripper.aperture()).to_degrees())
        });
    text.sections[0].value = format!(
        "TIME: {:7.2} s   SCAN: {scan}   GRIPPER: {gripper}",
        world.time()
    );
}

fn handle_keyboard_input(keys: Res<ButtonInput<KeyCode>>, mut scene: ResMut<Scene>) {
    if keys.just_pressed(KeyCode::KeyT) {
        scene.show_text = !scene.show_text;
    }
}

fn to_bevy_color(color: domain::Color) -> Color {
    Color::rgba_u8(color.r, color.g, color.b, color.a)
}

fn to_bevy_position(position: Position, pixels_per_unit: f32) -> Vec2 {
    Vec2::new(position.x() as f32, position.y() as f32) * pixels_per_unit
}
