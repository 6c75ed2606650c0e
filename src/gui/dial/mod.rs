use std::f64::consts::PI;

pub mod model;
pub mod scene;
pub mod view;

pub use model::{ArcPaths, DragAction, Layout, Phase, Progress, State};
pub use scene::{Scene, Shape, compose};
pub use view::{draw, load_image};

pub const START_ANGLE: f64 = PI; // right end of the dial
pub const END_ANGLE: f64 = 2.0 * PI; // left end, where the knob rests at 0%
pub const FALLBACK_VIEWPORT: (f64, f64) = (800.0, 600.0);
