//! Top-down rover simulation: differential-drive vehicles with tire slip, raycast sensors and a
//! motorized gripper, stepped at a fixed timestep on a 2D rigid-body solver.

pub mod domain;
