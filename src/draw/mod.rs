pub mod buffer;
pub mod input;
pub mod model;
pub mod palette;
pub mod render;
pub mod save;
pub mod state;
pub mod surface;

pub use input::{PointerEvent, StrokeCapture};
pub use model::{Color, LineCap, Point, SurfaceStyle};
pub use palette::{Palette, Swatch};
pub use save::Snapshot;
pub use surface::Surface;
