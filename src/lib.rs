pub mod draw;
pub mod gui;
pub mod logging;
pub mod session;
pub mod settings;
pub mod submit;

pub use session::{Event, Session};
