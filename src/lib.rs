// Virtual glasses try-on: per-frame alignment and compositing over a live
// camera feed. The library half holds everything testable; main.rs wires it
// to the camera, the window, and the keyboard.

pub mod align;
pub mod camera;
pub mod catalog;
pub mod compositor;
pub mod detector;
pub mod draw;
pub mod error;
pub mod registry;
pub mod selection;
pub mod surface;
pub mod types;
